use std::fmt;

use formats::DatasetError;
use layers::GeometryError;

use crate::config::ConfigError;

/// Shown in place of the visualization when initialization fails.
pub const LOAD_FAILURE_MESSAGE: &str = "Не вдалося завантажити дані карти або тривог.";

#[derive(Debug)]
pub enum StoryError {
    Config(ConfigError),
    Dataset(DatasetError),
    Geometry(GeometryError),
}

impl fmt::Display for StoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryError::Config(err) => write!(f, "configuration: {err}"),
            StoryError::Dataset(err) => write!(f, "data unavailable: {err}"),
            StoryError::Geometry(err) => write!(f, "data unavailable: {err}"),
        }
    }
}

impl std::error::Error for StoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoryError::Config(err) => Some(err),
            StoryError::Dataset(err) => Some(err),
            StoryError::Geometry(err) => Some(err),
        }
    }
}
