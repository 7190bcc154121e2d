use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::format::{Item, StrftimeItems};
use formats::DataFiles;
use foundation::Rgb;
use layers::Palette;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "I/O error: {err}"),
            ConfigError::Parse(err) => write!(f, "Config parse error: {err}"),
            ConfigError::Invalid { field, reason } => write!(f, "Invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Hex colors for the map fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub neutral: String,
    pub alert: String,
    pub choropleth_low: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            neutral: "#cccccc".to_string(),
            alert: "#ff4136".to_string(),
            choropleth_low: "#fee7e6".to_string(),
        }
    }
}

impl PaletteConfig {
    pub fn resolve(&self) -> Result<Palette, ConfigError> {
        let parse = |field: &'static str, hex: &str| {
            Rgb::from_hex(hex).map_err(|e| ConfigError::Invalid {
                field,
                reason: e.to_string(),
            })
        };
        Ok(Palette {
            neutral: parse("palette.neutral", &self.neutral)?,
            alert: parse("palette.alert", &self.alert)?,
            choropleth_low: parse("palette.choropleth_low", &self.choropleth_low)?,
        })
    }
}

/// Visualization container sizes for the split and compact layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub split_width_percent: f64,
    pub split_padding_vh: f64,
    pub compact_padding_rem: f64,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            split_width_percent: 55.0,
            split_padding_vh: 10.0,
            compact_padding_rem: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Window widths at or below this use the compact layout.
    pub compact_width_threshold: f64,
    /// Default duration of every step transition track (seconds).
    pub transition_duration: f64,
    /// Geometry reset duration of the flat and choropleth map steps.
    pub dezoom_duration: f64,
    /// Seconds each hourly snapshot stays on screen during replay.
    pub replay_step_duration: f64,
    /// Inset of the final full-window map.
    pub final_padding: f64,
    /// How far the zoom view moves from the whole country towards the focus region.
    pub zoom_blend: f64,
    /// GeoJSON feature property holding the region name.
    pub region_name_property: String,
    pub palette: PaletteConfig,
    pub container: ContainerConfig,
    pub files: DataFiles,
    /// `strftime` pattern for the replay clock.
    pub timestamp_format: String,
    /// Display names for tooltips, keyed by region name.
    pub region_labels: BTreeMap<String, String>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            compact_width_threshold: 900.0,
            transition_duration: 0.8,
            dezoom_duration: 0.8,
            replay_step_duration: 0.5,
            final_padding: 120.0,
            zoom_blend: 0.5,
            region_name_property: "NAME_1".to_string(),
            palette: PaletteConfig::default(),
            container: ContainerConfig::default(),
            files: DataFiles::default(),
            timestamp_format: "%d.%m.%Y %H:%M".to_string(),
            region_labels: default_region_labels(),
        }
    }
}

impl StoryConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let payload = fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json(&payload)
    }

    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let config: StoryConfig = serde_json::from_str(payload).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| Err(ConfigError::Invalid { field, reason });

        for (field, value) in [
            ("transition_duration", self.transition_duration),
            ("dezoom_duration", self.dezoom_duration),
            ("final_padding", self.final_padding),
            ("compact_width_threshold", self.compact_width_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(field, format!("expected a non-negative number, got {value}"));
            }
        }
        if !self.replay_step_duration.is_finite() || self.replay_step_duration <= 0.0 {
            return invalid(
                "replay_step_duration",
                format!("expected a positive number, got {}", self.replay_step_duration),
            );
        }
        if !(0.0..=1.0).contains(&self.zoom_blend) {
            return invalid("zoom_blend", format!("expected 0..=1, got {}", self.zoom_blend));
        }
        if self.region_name_property.is_empty() {
            return invalid("region_name_property", "must not be empty".to_string());
        }
        if self.timestamp_format.is_empty()
            || StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error))
        {
            return invalid(
                "timestamp_format",
                format!("unsupported pattern {:?}", self.timestamp_format),
            );
        }
        self.palette.resolve()?;
        Ok(())
    }

    pub fn is_compact(&self, window_width: f64) -> bool {
        window_width <= self.compact_width_threshold
    }

    /// Display name of a region, falling back to its raw name.
    pub fn region_label<'a>(&'a self, region: &'a str) -> &'a str {
        self.region_labels
            .get(region)
            .map(String::as_str)
            .unwrap_or(region)
    }
}

fn default_region_labels() -> BTreeMap<String, String> {
    [
        ("Cherkasy", "Черкаська область"),
        ("Chernihiv", "Чернігівська область"),
        ("Chernivtsi", "Чернівецька область"),
        ("Dnipropetrovs'k", "Дніпропетровська область"),
        ("Donets'k", "Донецька область"),
        ("Ivano-Frankivs'k", "Івано-Франківська область"),
        ("Kharkiv", "Харківська область"),
        ("Kherson", "Херсонська область"),
        ("Khmel'nyts'kyy", "Хмельницька область"),
        ("Kiev", "Київська область"),
        ("Kiev City", "м. Київ"),
        ("Kirovohrad", "Кіровоградська область"),
        ("L'viv", "Львівська область"),
        ("Luhans'k", "Луганська область"),
        ("Mykolayiv", "Миколаївська область"),
        ("Odessa", "Одеська область"),
        ("Poltava", "Полтавська область"),
        ("Rivne", "Рівненська область"),
        ("Sumy", "Сумська область"),
        ("Ternopil'", "Тернопільська область"),
        ("Transcarpathia", "Закарпатська область"),
        ("Vinnytsya", "Вінницька область"),
        ("Volyn", "Волинська область"),
        ("Zaporizhzhya", "Запорізька область"),
        ("Zhytomyr", "Житомирська область"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
