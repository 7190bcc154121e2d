use runtime::{Ease, Playback, PlaybackState, Timeline, TimelineDefaults, Tween};
use scene::{Property, Surface, Target, Value};
use tracing::debug;

use crate::context::StoryContext;
use crate::step::{ChartView, Direction, StepDescriptor, StepEnv, StepId, StepRegistry};

/// The one animation currently allowed to write to the surface.
#[derive(Debug)]
pub struct AnimationRun {
    pub id: u64,
    pub step: StepId,
    pub direction: Direction,
    pub compact: bool,
    playback: Playback,
}

impl AnimationRun {
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn timeline(&self) -> &Timeline {
        self.playback.timeline()
    }
}

/// Owns the single in-flight [`AnimationRun`] and replaces it on every step change.
#[derive(Debug, Default)]
pub struct TimelineOrchestrator {
    registry: StepRegistry,
    current: Option<AnimationRun>,
    next_id: u64,
}

impl TimelineOrchestrator {
    pub fn new(registry: StepRegistry) -> Self {
        Self {
            registry,
            current: None,
            next_id: 0,
        }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn current(&self) -> Option<&AnimationRun> {
        self.current.as_ref()
    }

    /// Runs that can still write: zero or one.
    pub fn live_runs(&self) -> usize {
        self.current
            .as_ref()
            .map_or(0, |run| usize::from(run.playback.is_live()))
    }

    /// Kill the current run and start the composed animation for `step`.
    ///
    /// The first frame renders immediately so `from_to` tracks take effect before the
    /// next tick.
    pub fn transition<S: Surface>(
        &mut self,
        ctx: &StoryContext,
        step: StepId,
        direction: Direction,
        compact: bool,
        surface: &mut S,
    ) -> &AnimationRun {
        if let Some(mut previous) = self.current.take() {
            previous.playback.kill();
            debug!(
                run = previous.id,
                step = %previous.step,
                at = previous.playback.time(),
                "animation cancelled"
            );
        }

        let resolved = self.registry.resolve(step);
        let mut timeline = Timeline::new(TimelineDefaults {
            duration: ctx.config.transition_duration,
            ease: Ease::Power3InOut,
        });
        add_generic_tracks(&mut timeline, ctx, &resolved.descriptor, compact);
        if let Some(procedure) = resolved.procedure {
            procedure(
                &mut timeline,
                &StepEnv {
                    ctx,
                    direction,
                    compact,
                },
            );
        }

        surface.write(&Target::Tooltip, Property::Opacity, Value::Number(0.0));

        let id = self.next_id;
        self.next_id += 1;
        let mut playback = Playback::new(timeline);
        playback.advance(0.0, surface);
        debug!(
            run = id,
            %step,
            direction = direction.sign(),
            compact,
            tweens = playback.timeline().tweens().len(),
            duration = playback.timeline().duration(),
            "animation started"
        );

        self.current.insert(AnimationRun {
            id,
            step,
            direction,
            compact,
            playback,
        })
    }

    /// Advance the current run. Completed and killed runs are left in place but no longer write.
    pub fn tick<S: Surface>(&mut self, dt: f64, surface: &mut S) -> Option<PlaybackState> {
        let run = self.current.as_mut()?;
        Some(run.playback.advance(dt, surface))
    }

    /// Kill the current run without starting another.
    pub fn cancel(&mut self) {
        if let Some(run) = self.current.as_mut() {
            run.playback.kill();
        }
    }
}

/// Cross-fade and layout tracks every transition carries, all starting at zero.
fn add_generic_tracks(
    tl: &mut Timeline,
    ctx: &StoryContext,
    descriptor: &StepDescriptor,
    compact: bool,
) {
    let opacity = |visible: bool| Value::Number(if visible { 1.0 } else { 0.0 });
    let mode = descriptor.container_mode(compact);
    let container = &ctx.config.container;

    tl.add(Tween::to(
        Target::TextPanel,
        Property::Opacity,
        opacity(descriptor.text_panel_visible()),
    ))
    .add(Tween::to(
        Target::VisContainer,
        Property::Width,
        Value::Length(mode.width(container)),
    ))
    .add(Tween::to(
        Target::VisContainer,
        Property::Padding,
        Value::Length(mode.padding(container)),
    ))
    .add(Tween::to(
        Target::MapLayer,
        Property::Opacity,
        opacity(descriptor.map_visible()),
    ))
    .add(Tween::to(
        Target::ChartLayer,
        Property::Opacity,
        opacity(descriptor.any_chart_visible()),
    ))
    .add(Tween::to(
        Target::AreaChart,
        Property::Opacity,
        opacity(descriptor.chart_visible(ChartView::Area)),
    ))
    .add(Tween::to(
        Target::RadialChart,
        Property::Opacity,
        opacity(descriptor.chart_visible(ChartView::Radial)),
    ))
    .add(Tween::set(
        Target::TimestampOverlay,
        Property::Opacity,
        opacity(descriptor.timestamp_visible()),
    ));
}

#[cfg(test)]
mod tests {
    use super::TimelineOrchestrator;
    use crate::context::fixtures;
    use crate::step::{Direction, StepId};
    use runtime::PlaybackState;
    use scene::{Length, Property, Target, Value};

    #[test]
    fn generic_tracks_start_together() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut scene = ctx.initial_scene();
        let mut orchestrator = TimelineOrchestrator::default();
        let run = orchestrator.transition(&ctx, StepId(99), Direction::Forward, false, &mut scene);
        assert_eq!(run.timeline().tweens().len(), 8);
        assert!(run.timeline().tweens().iter().all(|t| t.start == 0.0));
    }

    #[test]
    fn only_one_run_is_ever_live() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut scene = ctx.initial_scene();
        let mut orchestrator = TimelineOrchestrator::default();
        assert_eq!(orchestrator.live_runs(), 0);
        orchestrator.transition(&ctx, StepId(1), Direction::Forward, false, &mut scene);
        orchestrator.transition(&ctx, StepId(2), Direction::Forward, false, &mut scene);
        let id = orchestrator.transition(&ctx, StepId(3), Direction::Forward, false, &mut scene).id;
        assert_eq!(id, 2);
        assert_eq!(orchestrator.live_runs(), 1);
        assert_eq!(orchestrator.current().unwrap().step, StepId(3));
    }

    #[test]
    fn cancelled_run_stops_writing() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut scene = ctx.initial_scene();
        let mut orchestrator = TimelineOrchestrator::default();
        orchestrator.transition(&ctx, StepId(5), Direction::Forward, false, &mut scene);
        orchestrator.tick(0.3, &mut scene);
        let mid_path = scene.get(&Target::region("A"), Property::PathData).cloned();
        let mid_fill = scene.get(&Target::region("C"), Property::Fill).cloned();

        orchestrator.transition(&ctx, StepId(3), Direction::Forward, false, &mut scene);
        for _ in 0..60 {
            orchestrator.tick(1.0 / 60.0, &mut scene);
        }
        assert_eq!(scene.get(&Target::region("A"), Property::PathData).cloned(), mid_path);
        assert_eq!(scene.get(&Target::region("C"), Property::Fill).cloned(), mid_fill);
        assert!(!scene.is_visible(&Target::MapLayer));
        assert!(scene.is_visible(&Target::AreaChart));
    }

    #[test]
    fn terminal_step_layout() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut scene = ctx.initial_scene();
        let mut orchestrator = TimelineOrchestrator::default();
        orchestrator.transition(&ctx, StepId(6), Direction::Forward, false, &mut scene);
        assert!(scene.is_visible(&Target::TimestampOverlay));
        orchestrator.tick(1.0, &mut scene);
        assert!(!scene.is_visible(&Target::TextPanel));
        assert_eq!(
            scene.get(&Target::VisContainer, Property::Width),
            Some(&Value::Length(Length::percent(100.0)))
        );
        assert_eq!(
            scene.get(&Target::VisContainer, Property::Padding),
            Some(&Value::Length(Length::ZERO))
        );
        assert_eq!(orchestrator.tick(0.1, &mut scene), Some(PlaybackState::Running));
    }

    #[test]
    fn transition_clears_tooltip() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut scene = ctx.initial_scene();
        scene.insert(Target::Tooltip, Property::Opacity, Value::Number(1.0));
        let mut orchestrator = TimelineOrchestrator::default();
        orchestrator.transition(&ctx, StepId(2), Direction::Forward, false, &mut scene);
        assert!(!scene.is_visible(&Target::Tooltip));
    }

    #[test]
    fn unknown_step_runs_generic_tracks_only() {
        let ctx = fixtures::context(fixtures::desktop());
        let mut scene = ctx.initial_scene();
        let mut orchestrator = TimelineOrchestrator::default();
        orchestrator.transition(&ctx, StepId(0), Direction::Forward, false, &mut scene);
        orchestrator.tick(1.0, &mut scene);
        assert!(scene.is_visible(&Target::MapLayer));
        assert!(scene.is_visible(&Target::TextPanel));
        assert_eq!(orchestrator.tick(0.1, &mut scene), Some(PlaybackState::Completed));
    }
}
