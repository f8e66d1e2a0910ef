use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::palette::Palette;
use crate::record::{RawRecord, parse_time};

pub const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedPair {
    pub x: String,
    pub y: f64,
}

/// One chart line, serialised as a Chart.js dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub label: String,
    pub data: Vec<OrderedPair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    pub tension: f64,
}

/// Open interval `(start, end)`, bounds parsed once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(start: &str, end: &str) -> Self {
        Self { start: parse_time(start), end: parse_time(end) }
    }

    /// Boundary timestamps are outside. Anything unparseable, on either side,
    /// is never inside.
    pub fn contains(&self, t: Option<DateTime<Utc>>) -> bool {
        match (t, self.start, self.end) {
            (Some(t), Some(start), Some(end)) => t > start && t < end,
            _ => false,
        }
    }
}

/// Distinct endpoints in order of first appearance.
pub fn unique_labels(records: &[RawRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.endpoint.as_str()))
        .map(|r| r.endpoint.clone())
        .collect()
}

/// Earliest timestamp in the data, one day earlier, as `YYYY-MM-DD`.
pub fn min_date_in_data(records: &[RawRecord]) -> Option<String> {
    let min = records.iter().filter_map(RawRecord::timestamp).min()?;
    let padded = min.checked_sub_signed(Duration::days(1))?;
    Some(padded.format(DAY_FORMAT).to_string())
}

/// Latest timestamp in the data, one day later, as `YYYY-MM-DD`.
pub fn max_date_in_data(records: &[RawRecord]) -> Option<String> {
    let max = records.iter().filter_map(RawRecord::timestamp).max()?;
    let padded = max.checked_add_signed(Duration::days(1))?;
    Some(padded.format(DAY_FORMAT).to_string())
}

pub fn build_series(
    records: &[RawRecord],
    labels: &[String],
    palette: &Palette,
    tension: f64,
    range: Option<&DateRange>,
) -> Vec<Series> {
    let visible: Vec<&RawRecord> = match range {
        Some(range) => records.iter().filter(|r| range.contains(r.timestamp())).collect(),
        None => records.iter().collect(),
    };

    labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let mut points: Vec<(Option<DateTime<Utc>>, OrderedPair)> = visible
                .iter()
                .filter(|r| &r.endpoint == label)
                .map(|r| (r.timestamp(), OrderedPair { x: r.time.clone(), y: r.requests }))
                .collect();
            // Stable; unparseable times go last.
            points.sort_by_key(|(t, _)| (t.is_none(), *t));

            let (border, background) = palette.colors_for(index);
            Series {
                label: label.clone(),
                data: points.into_iter().map(|(_, p)| p).collect(),
                border_color: border.map(str::to_string),
                background_color: background.map(str::to_string),
                tension,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(x: &str, y: impl Into<f64>) -> OrderedPair {
        OrderedPair { x: x.to_string(), y: y.into() }
    }

    fn two_day_data() -> Vec<RawRecord> {
        vec![
            RawRecord::new("a", "2024-01-02", 5),
            RawRecord::new("a", "2024-01-01", 3),
        ]
    }

    fn mixed_data() -> Vec<RawRecord> {
        vec![
            RawRecord::new("/users", "2024-01-03T12:00:00", 7),
            RawRecord::new("/orders", "2024-01-01", 2),
            RawRecord::new("/users", "2024-01-01", 4),
            RawRecord::new("/health", "2024-01-05", 1),
            RawRecord::new("/orders", "2024-01-04", 9),
            RawRecord::new("/users", "2024-01-02", 6),
        ]
    }

    #[test]
    fn test_unique_labels_first_appearance() {
        assert_eq!(unique_labels(&mixed_data()), vec!["/users", "/orders", "/health"]);
        assert!(unique_labels(&[]).is_empty());
    }

    #[test]
    fn test_series_sorted_by_time() {
        let records = two_day_data();
        let labels = unique_labels(&records);
        let series = build_series(&records, &labels, &Palette::default(), 0.5, None);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, "a");
        assert_eq!(series[0].data, vec![pair("2024-01-01", 3), pair("2024-01-02", 5)]);
    }

    #[test]
    fn test_date_bounds_padding() {
        let records = two_day_data();
        assert_eq!(min_date_in_data(&records).as_deref(), Some("2023-12-31"));
        assert_eq!(max_date_in_data(&records).as_deref(), Some("2024-01-03"));
    }

    #[test]
    fn test_date_bounds_empty() {
        assert_eq!(min_date_in_data(&[]), None);
        assert_eq!(max_date_in_data(&[RawRecord::new("a", "garbage", 1)]), None);
    }

    #[test]
    fn test_date_bounds_at_calendar_edge() {
        let latest = [RawRecord::new("a", "+262142-12-31", 1)];
        assert!(parse_time("+262142-12-31").is_some());
        assert_eq!(max_date_in_data(&latest), None);
        assert_eq!(min_date_in_data(&latest).as_deref(), Some("+262142-12-30"));
    }

    #[test]
    fn test_range_with_unparseable_bound_contains_nothing() {
        let t = parse_time("2024-01-02");
        assert!(DateRange::new("2024-01-01", "2024-01-03").contains(t));
        assert!(!DateRange::new("whenever", "2024-01-03").contains(t));
        assert!(!DateRange::new("2024-01-01", "").contains(t));
        assert!(!DateRange::new("2024-01-01", "2024-01-03").contains(None));
    }

    #[test]
    fn test_fractional_requests_plotted() {
        let records = vec![RawRecord::new("a", "2024-01-01", 2.5)];
        let labels = unique_labels(&records);
        let series = build_series(&records, &labels, &Palette::default(), 0.5, None);
        assert_eq!(series[0].data, vec![pair("2024-01-01", 2.5)]);
    }

    #[test]
    fn test_equal_bounds_exclude_everything() {
        let records = mixed_data();
        let labels = unique_labels(&records);
        let range = DateRange::new("2024-01-02", "2024-01-02");
        let series = build_series(&records, &labels, &Palette::default(), 0.5, Some(&range));

        assert_eq!(series.len(), labels.len());
        assert!(series.iter().all(|s| s.data.is_empty()));
    }

    #[test]
    fn test_boundary_rows_excluded() {
        let records = mixed_data();
        let labels = unique_labels(&records);
        let range = DateRange::new("2024-01-01", "2024-01-04");
        let series = build_series(&records, &labels, &Palette::default(), 0.5, Some(&range));

        assert_eq!(series[0].data, vec![pair("2024-01-02", 6), pair("2024-01-03T12:00:00", 7)]);
        assert!(series[1].data.is_empty());
        assert!(series[2].data.is_empty());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let records = mixed_data();
        let labels = unique_labels(&records);
        let range = DateRange::new("2024-01-05", "2024-01-01");
        let series = build_series(&records, &labels, &Palette::default(), 0.5, Some(&range));
        assert!(series.iter().all(|s| s.data.is_empty()));
    }

    #[test]
    fn test_range_never_adds_points() {
        let records = mixed_data();
        let labels = unique_labels(&records);
        let palette = Palette::default();
        let all = build_series(&records, &labels, &palette, 0.5, None);

        for (start, end) in [("2023-12-31", "2024-01-06"), ("2024-01-02", "2024-01-05"), ("2024-01-03", "2024-01-04")] {
            let range = DateRange::new(start, end);
            let some = build_series(&records, &labels, &palette, 0.5, Some(&range));
            assert_eq!(some.len(), all.len());
            for (narrow, wide) in some.iter().zip(&all) {
                assert!(narrow.data.len() <= wide.data.len());
            }
        }
    }

    #[test]
    fn test_points_non_decreasing() {
        let records = crate::record::sample_records().unwrap();
        let labels = unique_labels(&records);
        let series = build_series(&records, &labels, &Palette::default(), 0.5, None);

        assert_eq!(series.len(), labels.len());
        for s in &series {
            let times: Vec<_> = s.data.iter().map(|p| parse_time(&p.x)).collect();
            assert!(times.windows(2).all(|w| w[0] <= w[1]), "{} out of order", s.label);
        }
    }

    #[test]
    fn test_unparseable_times_sort_last_and_drop_under_range() {
        let records = vec![
            RawRecord::new("a", "??", 1),
            RawRecord::new("a", "2024-01-02", 2),
            RawRecord::new("a", "2024-01-01", 3),
        ];
        let labels = unique_labels(&records);
        let palette = Palette::default();

        let all = build_series(&records, &labels, &palette, 0.5, None);
        assert_eq!(all[0].data, vec![pair("2024-01-01", 3), pair("2024-01-02", 2), pair("??", 1)]);

        let range = DateRange::new("2023-12-31", "2024-01-03");
        let some = build_series(&records, &labels, &palette, 0.5, Some(&range));
        assert_eq!(some[0].data.len(), 2);
    }

    #[test]
    fn test_colors_follow_label_index() {
        let records = mixed_data();
        let labels = unique_labels(&records);
        let palette = Palette {
            border: vec!["b0".into(), "b1".into()],
            background: vec!["g0".into(), "g1".into()],
        };
        let series = build_series(&records, &labels, &palette, 0.5, None);

        assert_eq!(series[1].border_color.as_deref(), Some("b1"));
        assert_eq!(series[1].background_color.as_deref(), Some("g1"));
        assert_eq!(series[2].border_color.as_deref(), Some("b0"));
    }

    #[test]
    fn test_series_json_shape() {
        let records = two_day_data();
        let labels = unique_labels(&records);
        let palette = Palette { border: vec!["red".into()], background: vec![] };
        let series = build_series(&records, &labels, &palette, 0.5, None);

        let v = serde_json::to_value(&series[0]).unwrap();
        assert_eq!(v["borderColor"], "red");
        assert!(v.get("backgroundColor").is_none());
        assert_eq!(v["data"][0]["x"], "2024-01-01");
        assert_eq!(v["data"][0]["y"], 3.0);
        assert_eq!(v["tension"], 0.5);
    }
}
