use std::collections::BTreeMap;

use formats::{
    DatasetBundle, HourlyRadialPoint, HourlySnapshot, RegionStat, WeeklyPoint, complete_weeks,
};
use foundation::Rgb;
use layers::{AreaChartLayout, MapLayout, Palette, RadialChartLayout, RegionGeometryStore};
use scene::{AreaPart, Property, Scene, Target, Value};
use tracing::info;

use crate::config::StoryConfig;
use crate::error::StoryError;
use crate::step::{ContainerMode, StepDescriptor, StepId};

/// Pixel sizes the story is laid out for.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    /// Map and chart surface.
    pub surface_width: f64,
    pub surface_height: f64,
    pub window_width: f64,
    pub window_height: f64,
}

impl Viewport {
    pub fn new(surface_width: f64, surface_height: f64, window_width: f64, window_height: f64) -> Self {
        Self {
            surface_width,
            surface_height,
            window_width,
            window_height,
        }
    }
}

/// Everything the step procedures read. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct StoryContext {
    pub config: StoryConfig,
    pub palette: Palette,
    pub viewport: Viewport,
    pub geometry: RegionGeometryStore,
    pub region_stats: BTreeMap<String, RegionStat>,
    /// Complete weeks only.
    pub weekly: Vec<WeeklyPoint>,
    pub hourly: Vec<HourlyRadialPoint>,
    pub snapshots: Vec<HourlySnapshot>,
    pub area_chart: AreaChartLayout,
    pub radial_chart: RadialChartLayout,
}

impl StoryContext {
    pub fn build(
        config: StoryConfig,
        bundle: DatasetBundle,
        viewport: Viewport,
    ) -> Result<Self, StoryError> {
        config.validate().map_err(StoryError::Config)?;
        let palette = config.palette.resolve().map_err(StoryError::Config)?;

        let geometry = RegionGeometryStore::build(
            &bundle.boundaries,
            &bundle.region_stats,
            &MapLayout {
                width: viewport.surface_width,
                height: viewport.surface_height,
                window_width: viewport.window_width,
                window_height: viewport.window_height,
                final_padding: config.final_padding,
                zoom_blend: config.zoom_blend,
            },
        )
        .map_err(StoryError::Geometry)?;

        let weekly = complete_weeks(&bundle.weekly);
        let area_chart =
            AreaChartLayout::build(&weekly, viewport.surface_width, viewport.surface_height);
        let radial_chart = RadialChartLayout::build(
            &bundle.hourly,
            viewport.surface_width,
            viewport.surface_height,
        );
        let region_stats = bundle
            .region_stats
            .into_iter()
            .map(|s| (s.region.clone(), s))
            .collect();

        info!(
            regions = geometry.len(),
            weeks = weekly.len(),
            hours = bundle.hourly.len(),
            snapshots = bundle.snapshots.len(),
            "story context ready"
        );

        Ok(Self {
            config,
            palette,
            viewport,
            geometry,
            region_stats,
            weekly,
            hourly: bundle.hourly,
            snapshots: bundle.snapshots,
            area_chart,
            radial_chart,
        })
    }

    /// Choropleth fill of a region; regions without statistics stay neutral.
    pub fn choropleth_fill(&self, region: &str) -> Rgb {
        match self.geometry.get(region).and_then(|g| g.aggregate) {
            Some(aggregate) => self.palette.choropleth().color(aggregate.normalized_duration),
            None => self.palette.neutral,
        }
    }

    pub fn is_compact(&self) -> bool {
        self.config.is_compact(self.viewport.window_width)
    }

    /// Scene as it stands before the first step: intro visible, map on its initial
    /// geometry, charts and overlays hidden.
    pub fn initial_scene(&self) -> Scene {
        let mut scene = Scene::new();
        let number = Value::Number;

        scene.insert(
            Target::Surface,
            Property::ViewBox,
            Value::ViewBox(self.geometry.initial_view_box()),
        );

        scene.insert(Target::IntroHeading, Property::Scale, number(1.0));
        scene.insert(Target::IntroHeading, Property::Opacity, number(1.0));
        scene.insert(Target::ScrollHint, Property::Opacity, number(1.0));

        let mode = StepDescriptor::for_step(StepId::FLAT_MAP).container_mode(self.is_compact());
        self.seed_container(&mut scene, mode);
        scene.insert(Target::TextPanel, Property::Opacity, number(0.0));

        scene.insert(Target::MapLayer, Property::Opacity, number(1.0));
        for region in self.geometry.iter() {
            let target = Target::region(region.name.as_str());
            scene.insert(
                target.clone(),
                Property::PathData,
                Value::Path(region.initial_path.clone()),
            );
            scene.insert(target.clone(), Property::Fill, Value::Color(self.palette.neutral));
            scene.insert(target, Property::Opacity, number(1.0));
        }

        for target in [Target::ChartLayer, Target::AreaChart, Target::RadialChart] {
            scene.insert(target, Property::Opacity, number(0.0));
        }
        for part in AreaPart::ALL {
            let target = Target::AreaPart(part);
            scene.insert(target.clone(), Property::Opacity, number(1.0));
            scene.insert(target.clone(), Property::OffsetY, number(0.0));
            let path = match part {
                AreaPart::Area => Some(&self.area_chart.area_path),
                AreaPart::Line => Some(&self.area_chart.line_path),
                AreaPart::XAxis | AreaPart::YAxis => None,
            };
            if let Some(path) = path {
                scene.insert(target, Property::PathData, Value::Path(path.clone()));
            }
        }
        for bar in &self.radial_chart.bars {
            let target = Target::RadialBar(bar.hour);
            scene.insert(target.clone(), Property::PathData, Value::Path(bar.path.clone()));
            scene.insert(target.clone(), Property::Opacity, number(bar.opacity));
            scene.insert(target, Property::ScaleY, number(1.0));
        }

        scene.insert(Target::TimestampOverlay, Property::Opacity, number(0.0));
        scene.insert(Target::TimestampLabel, Property::Text, Value::Text(String::new()));
        scene.insert(Target::Tooltip, Property::Opacity, number(0.0));
        scene.insert(Target::Tooltip, Property::Text, Value::Text(String::new()));
        scene
    }

    fn seed_container(&self, scene: &mut Scene, mode: ContainerMode) {
        let container = &self.config.container;
        scene.insert(Target::VisContainer, Property::Opacity, Value::Number(0.0));
        scene.insert(
            Target::VisContainer,
            Property::Width,
            Value::Length(mode.width(container)),
        );
        scene.insert(
            Target::VisContainer,
            Property::Padding,
            Value::Length(mode.padding(container)),
        );
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use formats::{DatasetBundle, DatasetSources};

    use super::{StoryContext, Viewport};
    use crate::config::StoryConfig;

    pub const BOUNDARIES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"NAME_1":"A"},
         "geometry":{"type":"Polygon","coordinates":[[[24,48],[27,48],[27,51],[24,51],[24,48]]]}},
        {"type":"Feature","properties":{"NAME_1":"B"},
         "geometry":{"type":"Polygon","coordinates":[[[27,48],[31,48],[31,51],[27,51],[27,48]]]}},
        {"type":"Feature","properties":{"NAME_1":"C"},
         "geometry":{"type":"Polygon","coordinates":[[[31,47],[36,47],[36,50],[31,50],[31,47]]]}},
        {"type":"Feature","properties":{"NAME_1":"D"},
         "geometry":{"type":"Polygon","coordinates":[[[31,50],[35,50],[35,52],[31,52],[31,50]]]}}
    ]}"#;
    pub const REGION_STATS: &str =
        "region,duration_hours,duration_normalized\nA,100,0\nB,300,0.5\nC,500,1\n";
    pub const WEEKLY: &str = "week,duration_hours\n1,10\n2,30\n3,20\n4,50\n5,3\n";
    pub const SNAPSHOTS: &str = "hour,regions\n\
        2024-03-01T00:00:00,A|B\n\
        2024-03-01T01:00:00,B|C\n\
        2024-03-01T02:00:00,\n";

    pub fn hourly() -> String {
        let mut out = String::from("hour,normalized_count,alert_count\n");
        for h in 0..24 {
            out.push_str(&format!("{h},{},{}\n", f64::from(h) / 23.0, h * 2));
        }
        out
    }

    pub fn bundle() -> DatasetBundle {
        let hourly = hourly();
        DatasetBundle::from_sources(
            &DatasetSources {
                boundaries: BOUNDARIES,
                region_stats: REGION_STATS,
                weekly: WEEKLY,
                hourly: &hourly,
                snapshots: SNAPSHOTS,
            },
            "NAME_1",
        )
        .expect("fixture bundle")
    }

    pub fn desktop() -> Viewport {
        Viewport::new(792.0, 720.0, 1440.0, 900.0)
    }

    pub fn mobile() -> Viewport {
        Viewport::new(375.0, 500.0, 414.0, 800.0)
    }

    pub fn context(viewport: Viewport) -> StoryContext {
        StoryContext::build(StoryConfig::default(), bundle(), viewport).expect("fixture context")
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use scene::{Property, Target};

    #[test]
    fn build_drops_partial_week() {
        let ctx = fixtures::context(fixtures::desktop());
        assert_eq!(ctx.weekly.len(), 4);
        assert_eq!(ctx.area_chart.points.len(), 4);
    }

    #[test]
    fn focus_is_longest_alert_region() {
        let ctx = fixtures::context(fixtures::desktop());
        assert_eq!(ctx.geometry.focus_name(), Some("C"));
    }

    #[test]
    fn missing_stats_fall_back_to_neutral() {
        let ctx = fixtures::context(fixtures::desktop());
        assert_eq!(ctx.choropleth_fill("D"), ctx.palette.neutral);
        assert_eq!(ctx.choropleth_fill("C"), ctx.palette.alert);
        assert_eq!(ctx.choropleth_fill("A"), ctx.palette.choropleth_low);
    }

    #[test]
    fn initial_scene_shows_map_and_hides_charts() {
        let ctx = fixtures::context(fixtures::desktop());
        let scene = ctx.initial_scene();
        assert!(scene.is_visible(&Target::MapLayer));
        assert!(!scene.is_visible(&Target::ChartLayer));
        assert!(!scene.is_visible(&Target::TimestampOverlay));
        assert_eq!(scene.region_names().count(), 4);
        assert_eq!(
            scene.text(&Target::region("A"), Property::PathData),
            Some(ctx.geometry.get("A").unwrap().initial_path.as_str())
        );
        assert_eq!(scene.number(&Target::RadialBar(23), Property::ScaleY), Some(1.0));
    }

    #[test]
    fn compact_detection_uses_window_width() {
        assert!(!fixtures::context(fixtures::desktop()).is_compact());
        assert!(fixtures::context(fixtures::mobile()).is_compact());
    }
}
