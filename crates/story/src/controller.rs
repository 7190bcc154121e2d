use std::path::Path;

use formats::DatasetBundle;
use runtime::{Frame, PlaybackState};
use scene::{Property, Scene, Surface, Target, Value};
use tracing::{error, info};

use crate::config::StoryConfig;
use crate::context::{StoryContext, Viewport};
use crate::error::{LOAD_FAILURE_MESSAGE, StoryError};
use crate::hover::{HoverGate, HoverTarget};
use crate::intro::{IntroScrub, ScrollHint};
use crate::mapper::{ScrollStepMapper, ScrollTriggers, Section, SectionKind};
use crate::orchestrator::TimelineOrchestrator;
use crate::step::{Direction, StepId, StepRegistry};

/// Vertical page structure the scroll position is measured against.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub viewport_height: f64,
    /// Document offset of the intro section's bottom edge.
    pub intro_bottom: f64,
    pub sections: Vec<Section>,
}

impl PageLayout {
    /// One viewport-high intro followed by one viewport-high section per step.
    ///
    /// The terminal step gets a bare trigger, every other step a text block.
    pub fn evenly_spaced(steps: impl IntoIterator<Item = StepId>, viewport_height: f64) -> Self {
        let sections = steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| Section {
                step,
                kind: if step == StepId::REPLAY {
                    SectionKind::Trigger
                } else {
                    SectionKind::TextBlock
                },
                top: (i + 1) as f64 * viewport_height,
                bottom: (i + 2) as f64 * viewport_height,
            })
            .collect();
        Self {
            viewport_height,
            intro_bottom: viewport_height,
            sections,
        }
    }
}

/// Single owner of all mutable story state; every change goes through its methods.
#[derive(Debug)]
pub struct StoryController {
    ctx: StoryContext,
    scene: Scene,
    window_width: f64,
    mapper: ScrollStepMapper,
    triggers: ScrollTriggers,
    intro: IntroScrub,
    hint: ScrollHint,
    orchestrator: TimelineOrchestrator,
    hover: HoverGate,
}

impl StoryController {
    pub fn new(ctx: StoryContext, page: PageLayout) -> Self {
        let scene = ctx.initial_scene();
        let window_width = ctx.viewport.window_width;
        Self {
            scene,
            window_width,
            mapper: ScrollStepMapper::new(),
            triggers: ScrollTriggers::new(page.sections, page.viewport_height),
            intro: IntroScrub::new(page.intro_bottom, page.viewport_height),
            hint: ScrollHint::default(),
            orchestrator: TimelineOrchestrator::new(StepRegistry::default()),
            hover: HoverGate::default(),
            ctx,
        }
    }

    /// Load every input from `data_dir` and build the story. Any failure aborts.
    pub fn initialize(
        config: StoryConfig,
        data_dir: impl AsRef<Path>,
        viewport: Viewport,
        page: PageLayout,
    ) -> Result<Self, StoryError> {
        config.validate().map_err(StoryError::Config)?;
        let bundle = DatasetBundle::load_dir(
            data_dir.as_ref(),
            &config.files,
            &config.region_name_property,
        )
        .map_err(StoryError::Dataset)?;
        let ctx = StoryContext::build(config, bundle, viewport)?;
        info!(data = %data_dir.as_ref().display(), "story initialized");
        Ok(Self::new(ctx, page))
    }

    /// Scene shown in place of the story when [`StoryController::initialize`] fails.
    pub fn failure_scene(err: &StoryError) -> Scene {
        error!(error = %err, "story initialization failed");
        let mut scene = Scene::new();
        scene.replace_with_error(LOAD_FAILURE_MESSAGE);
        scene
    }

    pub fn context(&self) -> &StoryContext {
        &self.ctx
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn last_step(&self) -> Option<StepId> {
        self.mapper.last_step()
    }

    pub fn active_block(&self) -> Option<usize> {
        self.mapper.active_block()
    }

    pub fn orchestrator(&self) -> &TimelineOrchestrator {
        &self.orchestrator
    }

    pub fn is_compact(&self) -> bool {
        self.ctx.config.is_compact(self.window_width)
    }

    /// Scroll to a document offset. Returns the step transitions it caused, in order.
    pub fn scroll_to(&mut self, scroll: f64) -> Vec<(StepId, Direction)> {
        self.intro.update(scroll, &mut self.scene);
        self.hint.update(scroll);

        let mut started = Vec::new();
        for fired in self.triggers.update(scroll) {
            if let Some((step, direction)) = self.mapper.handle(&fired) {
                self.run_transition(step, direction);
                started.push((step, direction));
            }
        }
        started
    }

    /// Enter a step directly, as if its trigger fired. Returns whether it transitioned.
    pub fn enter_step(&mut self, step: StepId, direction: Direction) -> bool {
        match self.mapper.enter(step, direction) {
            Some((step, direction)) => {
                self.run_transition(step, direction);
                true
            }
            None => false,
        }
    }

    fn run_transition(&mut self, step: StepId, direction: Direction) {
        let compact = self.is_compact();
        self.hover = HoverGate::for_step(step);
        self.orchestrator
            .transition(&self.ctx, step, direction, compact, &mut self.scene);
    }

    /// Window resize. Affects the layout chosen by later transitions.
    pub fn resize(&mut self, window_width: f64, viewport_height: f64) {
        self.window_width = window_width;
        self.triggers.set_viewport_height(viewport_height);
    }

    pub fn tick(&mut self, frame: Frame) -> Option<PlaybackState> {
        self.hint.tick(frame.dt_s, &mut self.scene);
        self.orchestrator.tick(frame.dt_s, &mut self.scene)
    }

    /// Show the tooltip for `target` if the current step allows it.
    pub fn hover(&mut self, target: &HoverTarget) -> bool {
        let Some(text) = self.hover.tooltip(&self.ctx, target) else {
            return false;
        };
        self.scene.write(&Target::Tooltip, Property::Text, Value::Text(text));
        self.scene.write(&Target::Tooltip, Property::Opacity, Value::Number(1.0));
        true
    }

    pub fn hover_end(&mut self) {
        self.scene.write(&Target::Tooltip, Property::Opacity, Value::Number(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::{PageLayout, StoryController};
    use crate::config::StoryConfig;
    use crate::context::{StoryContext, Viewport, fixtures};
    use crate::error::{LOAD_FAILURE_MESSAGE, StoryError};
    use crate::hover::HoverTarget;
    use crate::step::{Direction, StepId};
    use formats::DataFiles;
    use runtime::Frame;
    use scene::{Property, Target, Value};
    use std::fs;
    use std::path::PathBuf;

    const VH: f64 = 900.0;

    fn controller(viewport: Viewport) -> StoryController {
        StoryController::new(
            fixtures::context(viewport),
            PageLayout::evenly_spaced((1..=6).map(StepId), VH),
        )
    }

    fn run_for(controller: &mut StoryController, seconds: f64) {
        for frame in Frame::at_rate(0, 60).span(seconds) {
            controller.tick(frame);
        }
    }

    fn path_of(controller: &StoryController, region: &str) -> Option<String> {
        controller
            .scene()
            .text(&Target::region(region), Property::PathData)
            .map(str::to_string)
    }

    #[test]
    fn duplicate_step_entries_transition_once() {
        let mut c = controller(fixtures::desktop());
        let transitions: Vec<bool> = [2, 2, 2, 3]
            .into_iter()
            .map(|n| c.enter_step(StepId(n), Direction::Forward))
            .collect();
        assert_eq!(transitions, vec![true, false, false, true]);
        assert_eq!(c.orchestrator().current().unwrap().id, 1);
    }

    #[test]
    fn scrolling_through_the_page_reaches_the_replay() {
        let mut c = controller(fixtures::desktop());
        let steps: Vec<u8> = [0.0, 600.0, 1500.0, 2400.0, 3300.0, 4200.0, 5100.0]
            .into_iter()
            .flat_map(|scroll| c.scroll_to(scroll))
            .map(|(step, _)| step.0)
            .collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(c.last_step(), Some(StepId::REPLAY));
        assert_eq!(c.active_block(), Some(4));
        assert!(c.scene().is_visible(&Target::TimestampOverlay));
    }

    #[test]
    fn compact_replay_uses_initial_geometry() {
        let mut c = controller(fixtures::mobile());
        c.enter_step(StepId::REPLAY, Direction::Forward);
        run_for(&mut c, 1.0);
        let expected = c.context().geometry.get("A").unwrap().initial_path.clone();
        assert_eq!(path_of(&c, "A"), Some(expected));
        assert_eq!(
            c.scene().get(&Target::Surface, Property::ViewBox),
            Some(&Value::ViewBox(c.context().geometry.initial_view_box()))
        );
    }

    #[test]
    fn desktop_replay_uses_final_geometry() {
        let mut c = controller(fixtures::desktop());
        c.enter_step(StepId::REPLAY, Direction::Forward);
        run_for(&mut c, 1.0);
        let expected = c.context().geometry.get("A").unwrap().final_path.clone();
        assert_eq!(path_of(&c, "A"), Some(expected));
    }

    #[test]
    fn resize_switches_to_compact_for_later_transitions() {
        let mut c = controller(fixtures::desktop());
        c.resize(800.0, VH);
        assert!(c.is_compact());
        c.enter_step(StepId::REPLAY, Direction::Forward);
        run_for(&mut c, 1.0);
        let expected = c.context().geometry.get("A").unwrap().initial_path.clone();
        assert_eq!(path_of(&c, "A"), Some(expected));
    }

    #[test]
    fn scrolling_back_into_flat_map_snaps_instantly() {
        let mut c = controller(fixtures::desktop());
        c.enter_step(StepId::FOCUS, Direction::Forward);
        run_for(&mut c, 1.0);
        c.enter_step(StepId::FLAT_MAP, Direction::Backward);
        let expected = c.context().geometry.get("C").unwrap().initial_path.clone();
        assert_eq!(path_of(&c, "C"), Some(expected));
        assert_eq!(
            c.scene().color(&Target::region("C"), Property::Fill),
            Some(c.context().palette.neutral)
        );
    }

    #[test]
    fn tooltips_follow_the_current_step() {
        let mut c = controller(fixtures::desktop());
        let region = HoverTarget::Region("B".to_string());
        c.enter_step(StepId::FLAT_MAP, Direction::Forward);
        assert!(!c.hover(&region));

        c.enter_step(StepId::CHOROPLETH, Direction::Forward);
        assert!(c.hover(&region));
        assert!(c.scene().is_visible(&Target::Tooltip));
        assert_eq!(
            c.scene().text(&Target::Tooltip, Property::Text),
            Some("B\n300 годин у тривозі")
        );

        c.enter_step(StepId::WEEKLY_CHART, Direction::Forward);
        assert!(!c.scene().is_visible(&Target::Tooltip));
        assert!(!c.hover(&region));
        c.hover_end();
        assert!(!c.scene().is_visible(&Target::Tooltip));
    }

    #[test]
    fn missing_input_fails_fast() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("alert_story_controller_missing_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let files = DataFiles::default();
        fs::write(dir.join(&files.boundaries), fixtures::BOUNDARIES).unwrap();

        let err = StoryController::initialize(
            StoryConfig::default(),
            &dir,
            fixtures::desktop(),
            PageLayout::evenly_spaced((1..=6).map(StepId), VH),
        )
        .unwrap_err();
        assert!(matches!(err, StoryError::Dataset(_)));

        let scene = StoryController::failure_scene(&err);
        assert_eq!(scene.error(), Some(LOAD_FAILURE_MESSAGE));
        assert_eq!(scene.targets().count(), 0);
    }

    #[test]
    fn initialize_loads_directory() {
        let dir: PathBuf = {
            let mut dir = std::env::temp_dir();
            dir.push(format!("alert_story_controller_load_{}", std::process::id()));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            dir
        };
        let files = DataFiles::default();
        fs::write(dir.join(&files.boundaries), fixtures::BOUNDARIES).unwrap();
        fs::write(dir.join(&files.region_stats), fixtures::REGION_STATS).unwrap();
        fs::write(dir.join(&files.weekly), fixtures::WEEKLY).unwrap();
        fs::write(dir.join(&files.hourly), fixtures::hourly()).unwrap();
        fs::write(dir.join(&files.snapshots), fixtures::SNAPSHOTS).unwrap();

        let c = StoryController::initialize(
            StoryConfig::default(),
            &dir,
            fixtures::desktop(),
            PageLayout::evenly_spaced((1..=6).map(StepId), VH),
        )
        .unwrap();
        assert_eq!(c.scene().region_names().count(), 4);
        assert_eq!(c.last_step(), None);
    }

    #[test]
    fn context_is_shared_read_only() {
        let ctx: StoryContext = fixtures::context(fixtures::desktop());
        let before = ctx.geometry.clone();
        let mut c = StoryController::new(ctx, PageLayout::evenly_spaced((1..=6).map(StepId), VH));
        for n in [1, 2, 5, 6, 1] {
            c.enter_step(StepId(n), Direction::Forward);
            run_for(&mut c, 0.5);
        }
        assert_eq!(c.context().geometry, before);
    }
}
