use serde::Deserialize;

use crate::palette::Palette;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// JSON file of raw records; the bundled sample when unset.
    pub data: Option<String>,
    pub bind: String,
    pub chart: ChartSettings,
    pub palette: Palette,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data: None,
            bind: DEFAULT_BIND.to_string(),
            chart: ChartSettings::default(),
            palette: Palette::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChartSettings {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub tension: f64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            title: "Traffic of APIs".to_string(),
            x_axis_title: "Dates".to_string(),
            y_axis_title: "No. of Requests".to_string(),
            tension: 0.5,
        }
    }
}

/// Defaults, then the optional TOML file, then `TRAFFICVIZ__*` variables
/// (`TRAFFICVIZ__CHART__TITLE=...`).
pub fn load_settings(path: Option<&str>) -> anyhow::Result<Settings> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path));
    }
    let settings = builder
        .add_source(config::Environment::with_prefix("TRAFFICVIZ").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
