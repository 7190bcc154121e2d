use std::collections::BTreeMap;
use std::fmt;

use foundation::Aabb2;
use foundation::math::Mercator;
use formats::{BoundaryCollection, RegionStat};
use scene::ViewBox;
use tracing::{debug, info, warn};

use crate::path::polygons_path;

/// Sizes the three map projections are fitted to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapLayout {
    /// Map surface size before any scrolling.
    pub width: f64,
    pub height: f64,
    /// Full window size used by the final view.
    pub window_width: f64,
    pub window_height: f64,
    /// Inset on every side of the final view.
    pub final_padding: f64,
    /// Blend from the initial projection towards the focus-only projection.
    pub zoom_blend: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegionAggregate {
    pub duration_hours: f64,
    pub normalized_duration: f64,
}

/// Which cached path a step shows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryVariant {
    Initial,
    Zoom,
    Final,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionGeometry {
    pub name: String,
    pub initial_path: String,
    pub zoom_path: String,
    pub final_path: String,
    /// `None` when the statistics table has no row for this region.
    pub aggregate: Option<RegionAggregate>,
}

impl RegionGeometry {
    pub fn path(&self, variant: GeometryVariant) -> &str {
        match variant {
            GeometryVariant::Initial => &self.initial_path,
            GeometryVariant::Zoom => &self.zoom_path,
            GeometryVariant::Final => &self.final_path,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// No boundary produced a usable projection.
    NothingToDraw,
    InvalidLayout { reason: String },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::NothingToDraw => write!(f, "no region boundary can be projected"),
            GeometryError::InvalidLayout { reason } => write!(f, "invalid map layout: {reason}"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Every region's three path variants, computed once and never touched again.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGeometryStore {
    regions: BTreeMap<String, RegionGeometry>,
    focus: Option<String>,
    initial_view_box: ViewBox,
    final_view_box: ViewBox,
    initial_projection: Mercator,
    zoom_projection: Mercator,
    final_projection: Mercator,
}

impl RegionGeometryStore {
    pub fn build(
        boundaries: &BoundaryCollection,
        stats: &[RegionStat],
        layout: &MapLayout,
    ) -> Result<Self, GeometryError> {
        if !(layout.width > 0.0 && layout.height > 0.0) {
            return Err(GeometryError::InvalidLayout {
                reason: format!("map size {}x{}", layout.width, layout.height),
            });
        }

        let all_points = || {
            boundaries
                .regions
                .iter()
                .flat_map(|r| r.points())
                .map(|p| (p.lon_deg, p.lat_deg))
        };

        let initial_projection = Mercator::fit_size(layout.width, layout.height, all_points())
            .ok_or(GeometryError::NothingToDraw)?;

        let pad = layout.final_padding;
        let final_extent = Aabb2::new(
            [pad, pad],
            [layout.window_width - pad, layout.window_height - pad],
        );
        let final_projection = match Mercator::fit_extent(final_extent, all_points()) {
            Some(p) => p,
            None => {
                warn!(
                    window_width = layout.window_width,
                    window_height = layout.window_height,
                    pad,
                    "final extent is degenerate, reusing initial projection"
                );
                initial_projection
            }
        };

        let stats_by_region: BTreeMap<&str, RegionAggregate> = stats
            .iter()
            .map(|s| {
                (
                    s.region.as_str(),
                    RegionAggregate {
                        duration_hours: s.duration_hours,
                        normalized_duration: s.normalized_duration,
                    },
                )
            })
            .collect();

        let focus = select_focus(
            boundaries
                .regions
                .iter()
                .filter_map(|r| stats_by_region.get(r.name.as_str()).map(|a| (r.name.as_str(), a))),
        );

        let zoom_projection = focus
            .as_deref()
            .and_then(|name| boundaries.get(name))
            .and_then(|region| {
                Mercator::fit_size(
                    layout.width,
                    layout.height,
                    region.points().map(|p| (p.lon_deg, p.lat_deg)),
                )
            })
            .map(|full| initial_projection.interpolate(&full, layout.zoom_blend))
            .unwrap_or(initial_projection);

        let mut regions = BTreeMap::new();
        let mut missing = 0usize;
        for boundary in &boundaries.regions {
            let aggregate = stats_by_region.get(boundary.name.as_str()).copied();
            if aggregate.is_none() {
                missing += 1;
                warn!(region = %boundary.name, "no statistics for region, rendering as no-data");
            }
            regions.insert(
                boundary.name.clone(),
                RegionGeometry {
                    name: boundary.name.clone(),
                    initial_path: polygons_path(&boundary.polygons, &initial_projection),
                    zoom_path: polygons_path(&boundary.polygons, &zoom_projection),
                    final_path: polygons_path(&boundary.polygons, &final_projection),
                    aggregate,
                },
            );
        }

        debug!(
            initial_scale = initial_projection.scale,
            zoom_scale = zoom_projection.scale,
            final_scale = final_projection.scale,
            "projections fitted"
        );
        info!(
            regions = regions.len(),
            missing_stats = missing,
            focus = focus.as_deref().unwrap_or("-"),
            "region geometry cached"
        );

        Ok(Self {
            regions,
            focus,
            initial_view_box: ViewBox::sized(layout.width, layout.height),
            final_view_box: ViewBox::sized(layout.window_width, layout.window_height),
            initial_projection,
            zoom_projection,
            final_projection,
        })
    }

    pub fn get(&self, name: &str) -> Option<&RegionGeometry> {
        self.regions.get(name)
    }

    /// Regions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionGeometry> {
        self.regions.values()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn focus(&self) -> Option<&RegionGeometry> {
        self.focus.as_deref().and_then(|name| self.regions.get(name))
    }

    pub fn focus_name(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn initial_view_box(&self) -> ViewBox {
        self.initial_view_box
    }

    pub fn final_view_box(&self) -> ViewBox {
        self.final_view_box
    }

    pub fn projection(&self, variant: GeometryVariant) -> Mercator {
        match variant {
            GeometryVariant::Initial => self.initial_projection,
            GeometryVariant::Zoom => self.zoom_projection,
            GeometryVariant::Final => self.final_projection,
        }
    }
}

/// Region with strictly the highest duration. Ties keep the smallest name.
fn select_focus<'a>(
    candidates: impl Iterator<Item = (&'a str, &'a RegionAggregate)>,
) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for (name, aggregate) in candidates {
        let hours = aggregate.duration_hours;
        if !hours.is_finite() {
            continue;
        }
        best = match best {
            Some((best_name, best_hours))
                if hours < best_hours || (hours == best_hours && name >= best_name) =>
            {
                Some((best_name, best_hours))
            }
            _ => Some((name, hours)),
        };
    }
    best.map(|(name, _)| name.to_string())
}
