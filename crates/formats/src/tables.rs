use std::collections::BTreeSet;

use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Alert statistics for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStat {
    pub region: String,
    pub duration_hours: f64,
    /// Duration scaled into `[0, 1]` across all regions.
    pub normalized_duration: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WeeklyPoint {
    pub week: u32,
    pub duration_hours: f64,
}

/// Alert activity bucketed by hour of day, independent of date.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HourlyRadialPoint {
    pub hour_of_day: u8,
    pub normalized_val: f64,
    pub count: u32,
}

/// Regions under alert during one calendar hour.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySnapshot {
    /// ISO-8601 timestamp as found in the source.
    pub timestamp: String,
    pub active_regions: BTreeSet<String>,
}

#[derive(Debug)]
pub enum TableError {
    Csv(csv::Error),
    InvalidValue { row: usize, reason: String },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::Csv(e) => write!(f, "CSV error: {e}"),
            TableError::InvalidValue { row, reason } => {
                write!(f, "invalid value in data row {row}: {reason}")
            }
        }
    }
}

impl std::error::Error for TableError {}

#[derive(Debug, Deserialize)]
struct RegionStatRow {
    region: String,
    duration_hours: f64,
    duration_normalized: f64,
}

#[derive(Debug, Deserialize)]
struct WeeklyRow {
    week: u32,
    duration_hours: f64,
}

#[derive(Debug, Deserialize)]
struct HourlyRow {
    hour: u8,
    normalized_count: f64,
    alert_count: u32,
}

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    hour: String,
    regions: Option<String>,
}

fn read_rows<T: DeserializeOwned>(payload: &str) -> Result<Vec<T>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(payload.as_bytes());
    let mut out = Vec::new();
    for row in reader.deserialize() {
        out.push(row.map_err(TableError::Csv)?);
    }
    Ok(out)
}

fn finite(row: usize, name: &str, v: f64) -> Result<f64, TableError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(TableError::InvalidValue {
            row,
            reason: format!("{name} is not a finite number"),
        })
    }
}

/// `region,duration_hours,duration_normalized`
pub fn parse_region_stats(payload: &str) -> Result<Vec<RegionStat>, TableError> {
    let rows: Vec<RegionStatRow> = read_rows(payload)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| {
            Ok(RegionStat {
                region: r.region,
                duration_hours: finite(i, "duration_hours", r.duration_hours)?,
                normalized_duration: finite(i, "duration_normalized", r.duration_normalized)?
                    .clamp(0.0, 1.0),
            })
        })
        .collect()
}

/// `week,duration_hours`, every row including the trailing partial week.
pub fn parse_weekly(payload: &str) -> Result<Vec<WeeklyPoint>, TableError> {
    let rows: Vec<WeeklyRow> = read_rows(payload)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| {
            if r.week == 0 {
                return Err(TableError::InvalidValue {
                    row: i,
                    reason: "week numbers start at 1".to_string(),
                });
            }
            Ok(WeeklyPoint {
                week: r.week,
                duration_hours: finite(i, "duration_hours", r.duration_hours)?,
            })
        })
        .collect()
}

/// The last week of the source is still in progress; drop it.
pub fn complete_weeks(raw: &[WeeklyPoint]) -> Vec<WeeklyPoint> {
    match raw.split_last() {
        Some((_, complete)) => complete.to_vec(),
        None => Vec::new(),
    }
}

/// `hour,normalized_count,alert_count`
pub fn parse_hourly_radial(payload: &str) -> Result<Vec<HourlyRadialPoint>, TableError> {
    let rows: Vec<HourlyRow> = read_rows(payload)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| {
            if r.hour > 23 {
                return Err(TableError::InvalidValue {
                    row: i,
                    reason: format!("hour {} outside 0..=23", r.hour),
                });
            }
            Ok(HourlyRadialPoint {
                hour_of_day: r.hour,
                normalized_val: finite(i, "normalized_count", r.normalized_count)?
                    .clamp(0.0, 1.0),
                count: r.alert_count,
            })
        })
        .collect()
}

/// `hour,regions` where `regions` is a `|`-separated list, possibly empty.
pub fn parse_snapshots(payload: &str) -> Result<Vec<HourlySnapshot>, TableError> {
    let rows: Vec<SnapshotRow> = read_rows(payload)?;
    Ok(rows
        .into_iter()
        .map(|r| HourlySnapshot {
            timestamp: r.hour,
            active_regions: r
                .regions
                .as_deref()
                .unwrap_or("")
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn region_stats_parse_and_clamp() {
        let csv = "region,duration_hours,duration_normalized\nKiev,100.5,0.4\nKharkiv,300,1.2\n";
        let stats = parse_region_stats(csv).expect("parse");
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].region, "Kiev");
        assert_eq!(stats[0].duration_hours, 100.5);
        assert_eq!(stats[1].normalized_duration, 1.0);
    }

    #[test]
    fn weekly_drops_only_the_trailing_row() {
        let csv = "week,duration_hours\n1,10\n2,20\n3,5\n";
        let raw = parse_weekly(csv).expect("parse");
        assert_eq!(raw.len(), 3);
        let weeks = complete_weeks(&raw);
        assert_eq!(weeks.len(), raw.len() - 1);
        assert_eq!(weeks.last().unwrap().week, 2);
        assert!(complete_weeks(&[]).is_empty());
    }

    #[test]
    fn weekly_rejects_week_zero() {
        let err = parse_weekly("week,duration_hours\n0,1\n").unwrap_err();
        assert!(matches!(err, TableError::InvalidValue { row: 0, .. }));
    }

    #[test]
    fn hourly_rejects_out_of_range_hour() {
        let ok = parse_hourly_radial("hour,normalized_count,alert_count\n0,0.5,12\n23,1,40\n");
        assert_eq!(ok.expect("parse").len(), 2);
        let err = parse_hourly_radial("hour,normalized_count,alert_count\n24,0.5,12\n");
        assert!(err.is_err());
    }

    #[test]
    fn snapshots_split_regions() {
        let csv = "hour,regions\n2024-01-01T00:00:00,Kiev|Sumy\n2024-01-01T01:00:00,\n";
        let snaps = parse_snapshots(csv).expect("parse");
        assert_eq!(snaps.len(), 2);
        let names: Vec<_> = snaps[0].active_regions.iter().cloned().collect();
        assert_eq!(names, vec!["Kiev".to_string(), "Sumy".to_string()]);
        assert!(snaps[1].active_regions.is_empty());
    }

    #[test]
    fn malformed_numbers_fail() {
        let err = parse_region_stats("region,duration_hours,duration_normalized\nKiev,abc,0.1\n");
        assert!(matches!(err, Err(TableError::Csv(_))));
    }
}
