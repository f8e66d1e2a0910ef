use serde::{Deserialize, Serialize};

const DEFAULT_BORDER: &[&str] = &[
    "rgb(255, 99, 132)",
    "rgb(54, 162, 235)",
    "rgb(255, 159, 64)",
    "rgb(75, 192, 192)",
    "rgb(153, 102, 255)",
    "rgb(255, 205, 86)",
    "rgb(201, 203, 207)",
    "rgb(102, 126, 234)",
];

const DEFAULT_BACKGROUND: &[&str] = &[
    "rgba(255, 99, 132, 0.5)",
    "rgba(54, 162, 235, 0.5)",
    "rgba(255, 159, 64, 0.5)",
    "rgba(75, 192, 192, 0.5)",
    "rgba(153, 102, 255, 0.5)",
    "rgba(255, 205, 86, 0.5)",
    "rgba(201, 203, 207, 0.5)",
    "rgba(102, 126, 234, 0.5)",
];

/// Parallel border/background colour lists, indexed by a label's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub border: Vec<String>,
    pub background: Vec<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            border: DEFAULT_BORDER.iter().map(|s| s.to_string()).collect(),
            background: DEFAULT_BACKGROUND.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Palette {
    /// Colours for the label at `index`. Each list wraps around independently;
    /// an empty list yields `None` for that side.
    pub fn colors_for(&self, index: usize) -> (Option<&str>, Option<&str>) {
        (pick(&self.border, index), pick(&self.background, index))
    }
}

fn pick(colors: &[String], index: usize) -> Option<&str> {
    if colors.is_empty() {
        None
    } else {
        Some(colors[index % colors.len()].as_str())
    }
}
