use foundation::time::{Time, TimeSpan};
use scene::{Property, Target, Value};

use crate::ease::Ease;

/// Tolerance for comparing accumulated frame time against scheduled positions.
pub const TIME_EPSILON: f64 = 1e-9;

/// A property change to place on a [`Timeline`].
///
/// Unset duration and ease fall back to the timeline defaults when added.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub target: Target,
    pub property: Property,
    pub from: Option<Value>,
    pub to: Value,
    pub at: f64,
    pub duration: Option<f64>,
    pub ease: Option<Ease>,
    /// Apply `from` as soon as the timeline first renders, before `at`.
    pub immediate_render: bool,
}

impl Tween {
    pub fn to(target: Target, property: Property, to: Value) -> Self {
        Self {
            target,
            property,
            from: None,
            to,
            at: 0.0,
            duration: None,
            ease: None,
            immediate_render: false,
        }
    }

    pub fn from_to(target: Target, property: Property, from: Value, to: Value) -> Self {
        Self {
            from: Some(from),
            immediate_render: true,
            ..Self::to(target, property, to)
        }
    }

    /// Zero-duration change.
    pub fn set(target: Target, property: Property, value: Value) -> Self {
        Self::to(target, property, value).duration(0.0)
    }

    pub fn at(mut self, at: f64) -> Self {
        self.at = at.max(0.0);
        self
    }

    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration.max(0.0));
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimelineDefaults {
    pub duration: f64,
    pub ease: Ease,
}

impl Default for TimelineDefaults {
    fn default() -> Self {
        Self {
            duration: 0.5,
            ease: Ease::Power3InOut,
        }
    }
}

/// A tween with defaults resolved and its absolute position fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTween {
    pub target: Target,
    pub property: Property,
    pub from: Option<Value>,
    pub to: Value,
    pub start: f64,
    pub duration: f64,
    pub ease: Ease,
    pub immediate_render: bool,
}

impl ScheduledTween {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn has_started(&self, t: f64) -> bool {
        t + TIME_EPSILON >= self.start
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(Time(self.start), Time(self.end()))
    }

    /// Eased progress at absolute timeline time `t`.
    pub fn progress(&self, t: f64) -> f64 {
        if self.duration <= 0.0 {
            return if self.has_started(t) { 1.0 } else { 0.0 };
        }
        self.ease.apply(self.span().progress(Time(t)))
    }

    pub fn value_at(&self, from: &Value, t: f64) -> Value {
        Value::interpolate(from, &self.to, self.progress(t))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    Once,
    Infinite,
}

/// A composed set of tweens on a shared clock.
///
/// Tweens are placed at absolute positions, so tracks added at the same position run
/// in parallel. When several tweens drive one `(target, property)`, the most recently
/// started one owns it; ties go to the one added last.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timeline {
    defaults: TimelineDefaults,
    tweens: Vec<ScheduledTween>,
    min_duration: f64,
    repeat: Repeat,
}

impl Timeline {
    pub fn new(defaults: TimelineDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn defaults(&self) -> TimelineDefaults {
        self.defaults
    }

    pub fn add(&mut self, tween: Tween) -> &mut Self {
        self.tweens.push(ScheduledTween {
            target: tween.target,
            property: tween.property,
            from: tween.from,
            to: tween.to,
            start: tween.at,
            duration: tween.duration.unwrap_or(self.defaults.duration),
            ease: tween.ease.unwrap_or(self.defaults.ease),
            immediate_render: tween.immediate_render,
        });
        self
    }

    /// Add `tweens`, delaying the i-th by `i * each` seconds.
    pub fn stagger(&mut self, tweens: impl IntoIterator<Item = Tween>, each: f64) -> &mut Self {
        for (i, tween) in tweens.into_iter().enumerate() {
            let at = tween.at + i as f64 * each;
            self.add(tween.at(at));
        }
        self
    }

    /// Make the timeline last at least until `t`, even if no tween ends there.
    pub fn extend_to(&mut self, t: f64) -> &mut Self {
        self.min_duration = self.min_duration.max(t);
        self
    }

    pub fn set_repeat(&mut self, repeat: Repeat) -> &mut Self {
        self.repeat = repeat;
        self
    }

    pub fn repeat(&self) -> Repeat {
        self.repeat
    }

    pub fn duration(&self) -> f64 {
        self.tweens
            .iter()
            .map(ScheduledTween::end)
            .fold(self.min_duration, f64::max)
    }

    pub fn tweens(&self) -> &[ScheduledTween] {
        &self.tweens
    }
}
