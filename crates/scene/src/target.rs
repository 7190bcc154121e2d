use std::fmt;

use serde::{Deserialize, Serialize};

/// Parts of the weekly area chart that animate independently.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaPart {
    Area,
    Line,
    XAxis,
    YAxis,
}

impl AreaPart {
    pub const ALL: [AreaPart; 4] = [AreaPart::Area, AreaPart::Line, AreaPart::XAxis, AreaPart::YAxis];

    pub fn name(self) -> &'static str {
        match self {
            AreaPart::Area => "area",
            AreaPart::Line => "line",
            AreaPart::XAxis => "x-axis",
            AreaPart::YAxis => "y-axis",
        }
    }
}

/// Addressable element of the rendering surface.
///
/// Regions are keyed by their canonical name; everything else is a fixed slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The drawing surface itself (owns the view box).
    Surface,
    TextPanel,
    VisContainer,
    MapLayer,
    ChartLayer,
    AreaChart,
    AreaPart(AreaPart),
    RadialChart,
    RadialBar(u8),
    Region(String),
    TimestampOverlay,
    TimestampLabel,
    Tooltip,
    IntroHeading,
    ScrollHint,
}

impl Target {
    pub fn region(name: impl Into<String>) -> Self {
        Target::Region(name.into())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Surface => f.write_str("surface"),
            Target::TextPanel => f.write_str("text-panel"),
            Target::VisContainer => f.write_str("vis-container"),
            Target::MapLayer => f.write_str("map-layer"),
            Target::ChartLayer => f.write_str("chart-layer"),
            Target::AreaChart => f.write_str("area-chart"),
            Target::AreaPart(part) => write!(f, "area-chart/{}", part.name()),
            Target::RadialChart => f.write_str("radial-chart"),
            Target::RadialBar(hour) => write!(f, "radial-bar/{hour:02}"),
            Target::Region(name) => write!(f, "region/{name}"),
            Target::TimestampOverlay => f.write_str("timestamp-overlay"),
            Target::TimestampLabel => f.write_str("timestamp-label"),
            Target::Tooltip => f.write_str("tooltip"),
            Target::IntroHeading => f.write_str("intro-heading"),
            Target::ScrollHint => f.write_str("scroll-hint"),
        }
    }
}

/// Animatable attribute of a [`Target`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Opacity with auto-hide: an element at 0 is treated as not visible.
    Opacity,
    Fill,
    PathData,
    ViewBox,
    Width,
    Padding,
    OffsetY,
    Scale,
    ScaleY,
    Text,
}

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Property::Opacity => "opacity",
            Property::Fill => "fill",
            Property::PathData => "d",
            Property::ViewBox => "viewBox",
            Property::Width => "width",
            Property::Padding => "padding",
            Property::OffsetY => "y",
            Property::Scale => "scale",
            Property::ScaleY => "scaleY",
            Property::Text => "text",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
