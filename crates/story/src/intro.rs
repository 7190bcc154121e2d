use runtime::{Ease, Playback, Timeline, TimelineDefaults, Tween};
use scene::{Property, Surface, Target, Value};

const HEADING_END_SCALE: f64 = 0.7;
const REVEAL_OFFSET: f64 = 0.2;
const HINT_FADE_DURATION: f64 = 0.3;
/// Scroll offset past which the page counts as scrolled.
const HINT_SCROLL_THRESHOLD: f64 = 1.0;

/// Scroll-scrubbed intro: the heading shrinks and fades while the story containers appear.
///
/// Scrubbing starts when the intro's bottom meets the viewport bottom and spans one
/// viewport height.
#[derive(Debug, Clone)]
pub struct IntroScrub {
    playback: Playback,
    start: f64,
    length: f64,
    progress: Option<f64>,
}

impl IntroScrub {
    pub fn new(intro_bottom: f64, viewport_height: f64) -> Self {
        let mut tl = Timeline::new(TimelineDefaults::default());
        tl.add(
            Tween::to(
                Target::IntroHeading,
                Property::Scale,
                Value::Number(HEADING_END_SCALE),
            )
            .ease(Ease::Power2In),
        )
        .add(Tween::to(Target::IntroHeading, Property::Opacity, Value::Number(0.0)).ease(Ease::Power2In));
        for target in [Target::VisContainer, Target::TextPanel] {
            tl.add(
                Tween::to(target, Property::Opacity, Value::Number(1.0))
                    .at(REVEAL_OFFSET)
                    .ease(Ease::Power2Out),
            );
        }
        Self {
            playback: Playback::new(tl),
            start: intro_bottom - viewport_height,
            length: viewport_height,
            progress: None,
        }
    }

    pub fn progress_at(&self, scroll: f64) -> f64 {
        if self.length <= 0.0 {
            return if scroll >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll - self.start) / self.length).clamp(0.0, 1.0)
    }

    /// Scrub to `scroll`. Returns whether anything was rendered.
    pub fn update<S: Surface>(&mut self, scroll: f64, surface: &mut S) -> bool {
        let progress = self.progress_at(scroll);
        if self.progress == Some(progress) {
            return false;
        }
        self.progress = Some(progress);
        let duration = self.playback.timeline().duration();
        self.playback.seek(progress * duration, surface);
        true
    }
}

/// Scroll-down hint that fades out once the page leaves the top and back in on return.
#[derive(Debug, Clone, Default)]
pub struct ScrollHint {
    scrolled: bool,
    fade: Option<Playback>,
}

impl ScrollHint {
    pub fn update(&mut self, scroll: f64) {
        let scrolled = scroll >= HINT_SCROLL_THRESHOLD;
        if scrolled == self.scrolled {
            return;
        }
        self.scrolled = scrolled;
        let mut tl = Timeline::new(TimelineDefaults::default());
        tl.add(
            Tween::to(
                Target::ScrollHint,
                Property::Opacity,
                Value::Number(if scrolled { 0.0 } else { 1.0 }),
            )
            .duration(HINT_FADE_DURATION),
        );
        if let Some(previous) = self.fade.as_mut() {
            previous.kill();
        }
        self.fade = Some(Playback::new(tl));
    }

    pub fn tick<S: Surface>(&mut self, dt: f64, surface: &mut S) {
        if let Some(fade) = self.fade.as_mut() {
            fade.advance(dt, surface);
        }
    }
}
