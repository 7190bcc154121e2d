use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::boundaries::{BoundaryCollection, BoundaryError};
use crate::tables::{
    HourlyRadialPoint, HourlySnapshot, RegionStat, TableError, WeeklyPoint, parse_hourly_radial,
    parse_region_stats, parse_snapshots, parse_weekly,
};

/// File names of the five inputs, relative to the dataset directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    pub boundaries: String,
    pub region_stats: String,
    pub weekly: String,
    pub hourly: String,
    pub snapshots: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            boundaries: "regions.geojson".to_string(),
            region_stats: "alert_durations_by_region.csv".to_string(),
            weekly: "weekly_alert_durations.csv".to_string(),
            hourly: "hourly_alert_counts.csv".to_string(),
            snapshots: "hourly_alerts_by_region.csv".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DatasetInput {
    Boundaries,
    RegionStats,
    Weekly,
    Hourly,
    Snapshots,
}

impl fmt::Display for DatasetInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DatasetInput::Boundaries => "region boundaries",
            DatasetInput::RegionStats => "region statistics",
            DatasetInput::Weekly => "weekly series",
            DatasetInput::Hourly => "hour-of-day series",
            DatasetInput::Snapshots => "hourly snapshots",
        })
    }
}

/// One of the required inputs could not be loaded or parsed.
#[derive(Debug)]
pub enum DatasetError {
    Io {
        input: DatasetInput,
        path: PathBuf,
        source: std::io::Error,
    },
    Boundaries(BoundaryError),
    Table {
        input: DatasetInput,
        source: TableError,
    },
}

impl DatasetError {
    pub fn input(&self) -> DatasetInput {
        match self {
            DatasetError::Io { input, .. } | DatasetError::Table { input, .. } => *input,
            DatasetError::Boundaries(_) => DatasetInput::Boundaries,
        }
    }
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io {
                input,
                path,
                source,
            } => write!(f, "failed to read {input} from {}: {source}", path.display()),
            DatasetError::Boundaries(e) => write!(f, "failed to parse region boundaries: {e}"),
            DatasetError::Table { input, source } => write!(f, "failed to parse {input}: {source}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DatasetError::Io { source, .. } => Some(source),
            DatasetError::Boundaries(e) => Some(e),
            DatasetError::Table { source, .. } => Some(source),
        }
    }
}

/// Raw text of every input, already read into memory.
#[derive(Debug, Copy, Clone)]
pub struct DatasetSources<'a> {
    pub boundaries: &'a str,
    pub region_stats: &'a str,
    pub weekly: &'a str,
    pub hourly: &'a str,
    pub snapshots: &'a str,
}

/// Every parsed input. `weekly` still includes the trailing partial week.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetBundle {
    pub boundaries: BoundaryCollection,
    pub region_stats: Vec<RegionStat>,
    pub weekly: Vec<WeeklyPoint>,
    pub hourly: Vec<HourlyRadialPoint>,
    pub snapshots: Vec<HourlySnapshot>,
}

impl DatasetBundle {
    /// Load all inputs from `root`. The first failure aborts the whole load.
    pub fn load_dir(
        root: impl AsRef<Path>,
        files: &DataFiles,
        name_property: &str,
    ) -> Result<Self, DatasetError> {
        let root = root.as_ref();
        let read = |input: DatasetInput, name: &str| {
            let path = root.join(name);
            debug!(%input, path = %path.display(), "reading input");
            fs::read_to_string(&path).map_err(|source| DatasetError::Io {
                input,
                path,
                source,
            })
        };

        let boundaries = read(DatasetInput::Boundaries, &files.boundaries)?;
        let region_stats = read(DatasetInput::RegionStats, &files.region_stats)?;
        let weekly = read(DatasetInput::Weekly, &files.weekly)?;
        let hourly = read(DatasetInput::Hourly, &files.hourly)?;
        let snapshots = read(DatasetInput::Snapshots, &files.snapshots)?;

        Self::from_sources(
            &DatasetSources {
                boundaries: &boundaries,
                region_stats: &region_stats,
                weekly: &weekly,
                hourly: &hourly,
                snapshots: &snapshots,
            },
            name_property,
        )
    }

    pub fn from_sources(
        sources: &DatasetSources<'_>,
        name_property: &str,
    ) -> Result<Self, DatasetError> {
        let table = |input: DatasetInput| move |source: TableError| DatasetError::Table { input, source };

        let bundle = DatasetBundle {
            boundaries: BoundaryCollection::from_geojson_str(sources.boundaries, name_property)
                .map_err(DatasetError::Boundaries)?,
            region_stats: parse_region_stats(sources.region_stats)
                .map_err(table(DatasetInput::RegionStats))?,
            weekly: parse_weekly(sources.weekly).map_err(table(DatasetInput::Weekly))?,
            hourly: parse_hourly_radial(sources.hourly).map_err(table(DatasetInput::Hourly))?,
            snapshots: parse_snapshots(sources.snapshots)
                .map_err(table(DatasetInput::Snapshots))?,
        };

        info!(
            regions = bundle.boundaries.len(),
            stats = bundle.region_stats.len(),
            weeks = bundle.weekly.len(),
            hours = bundle.hourly.len(),
            snapshots = bundle.snapshots.len(),
            "dataset loaded"
        );
        Ok(bundle)
    }
}
