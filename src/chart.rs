use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::ChartSettings;
use crate::error::ChartError;
use crate::palette::Palette;
use crate::record::{RawRecord, parse_time};
use crate::series::{
    DAY_FORMAT, DateRange, Series, build_series, max_date_in_data, min_date_in_data, unique_labels,
};

/// Turn whatever a date input sent into `YYYY-MM-DD`.
pub fn normalize_date_input(input: &str) -> Result<String, ChartError> {
    parse_time(input)
        .map(|t| t.format(DAY_FORMAT).to_string())
        .ok_or_else(|| ChartError::InvalidDate(input.to_string()))
}

/// The traffic chart: a shared dataset, its labels, the selected date range
/// and the series derived from them.
///
/// Cloning is cheap apart from the derived series; the records and labels are
/// behind `Arc` and never change after construction.
#[derive(Debug, Clone)]
pub struct TrafficChart {
    records: Arc<[RawRecord]>,
    labels: Arc<[String]>,
    palette: Palette,
    settings: ChartSettings,
    min_date: Option<String>,
    max_date: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    datasets: Vec<Series>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
    pub options: Value,
    pub range: RangeState,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub datasets: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeState {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl TrafficChart {
    pub fn new(records: impl Into<Arc<[RawRecord]>>, palette: Palette, settings: ChartSettings) -> Self {
        let records = records.into();
        let labels: Arc<[String]> = unique_labels(&records).into();
        let min_date = min_date_in_data(&records);
        let max_date = max_date_in_data(&records);

        let mut chart = Self {
            records,
            labels,
            palette,
            settings,
            start_date: min_date.clone(),
            end_date: max_date.clone(),
            min_date,
            max_date,
            datasets: Vec::new(),
        };
        chart.rebuild();
        chart
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn datasets(&self) -> &[Series] {
        &self.datasets
    }

    pub fn min_date(&self) -> Option<&str> {
        self.min_date.as_deref()
    }

    pub fn max_date(&self) -> Option<&str> {
        self.max_date.as_deref()
    }

    pub fn range(&self) -> RangeState {
        RangeState {
            start: self.start_date.clone(),
            end: self.end_date.clone(),
        }
    }

    pub fn set_start_date(&mut self, input: &str) -> Result<(), ChartError> {
        self.start_date = Some(normalize_date_input(input)?);
        self.rebuild();
        Ok(())
    }

    pub fn set_end_date(&mut self, input: &str) -> Result<(), ChartError> {
        self.end_date = Some(normalize_date_input(input)?);
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        // Filtering only applies once both bounds are known.
        let range = match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        };
        self.datasets = build_series(
            &self.records,
            &self.labels,
            &self.palette,
            self.settings.tension,
            range.as_ref(),
        );
        debug!(
            start = ?self.start_date,
            end = ?self.end_date,
            points = self.datasets.iter().map(|s| s.data.len()).sum::<usize>(),
            "rebuilt series"
        );
    }

    pub fn options(&self) -> Value {
        json!({
            "plugins": {
                "title": { "display": true, "text": self.settings.title },
                "legend": { "display": true },
            },
            "layout": { "padding": 20 },
            "scales": {
                "x": {
                    "type": "time",
                    "time": { "unit": "day" },
                    "grid": { "display": true },
                    "title": { "display": true, "text": self.settings.x_axis_title },
                    "min": self.min_date,
                    "max": self.max_date,
                },
                "y": {
                    "grid": { "display": true },
                    "title": { "display": true, "text": self.settings.y_axis_title },
                },
            },
        })
    }

    pub fn config(&self) -> ChartConfig {
        ChartConfig {
            kind: "line",
            data: ChartData {
                datasets: self.datasets().to_vec(),
            },
            options: self.options(),
            range: self.range(),
        }
    }
}
