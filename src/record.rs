use std::fs;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChartError;

/// Traffic dataset compiled into the binary, used when no `--data` file is given.
const SAMPLE_JSON: &str = include_str!("../data/raw_data.json");

/// One row of raw traffic data: `requests` hits on `endpoint` at `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub endpoint: String,
    pub time: String,
    pub requests: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special: Option<bool>,
}

impl RawRecord {
    #[cfg(test)]
    pub fn new(endpoint: &str, time: &str, requests: impl Into<f64>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            time: time.to_string(),
            requests: requests.into(),
            special: None,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_time(&self.time)
    }
}

// Accepted shapes:
//   2024-01-02                  (midnight UTC)
//   2024-01-02T10:15:00         (naive, read as UTC)
//   2024-01-02T10:15:00.250     (naive with fraction)
//   2024-01-02 10:15:00
//   2024-01-02T10:15:00+02:00   (RFC 3339)
pub fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn records_from_json(json: &str) -> Result<Vec<RawRecord>, ChartError> {
    let records: Vec<RawRecord> = serde_json::from_str(json)?;

    // Malformed times are kept; they only drop out once a range is applied.
    for (idx, r) in records.iter().enumerate() {
        if r.timestamp().is_none() {
            warn!(row = idx + 1, endpoint = %r.endpoint, time = %r.time, "unparseable timestamp");
        }
    }

    Ok(records)
}

pub fn load_records(path: &str) -> Result<Vec<RawRecord>, ChartError> {
    let json = fs::read_to_string(path).map_err(|source| ChartError::Io {
        path: path.to_string(),
        source,
    })?;
    let records = records_from_json(&json)?;
    debug!(path, records = records.len(), "loaded records");
    Ok(records)
}

pub fn sample_records() -> Result<Vec<RawRecord>, ChartError> {
    records_from_json(SAMPLE_JSON)
}
