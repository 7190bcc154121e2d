/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct Time(pub f64); // seconds

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn new(start: Time, end: Time) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end.0 - self.start.0).max(0.0)
    }

    /// Fraction of the span covered at `t`, clamped to `[0, 1]`.
    ///
    /// Zero-length spans jump straight from 0 to 1 at their start.
    pub fn progress(&self, t: Time) -> f64 {
        let d = self.duration();
        if d <= 0.0 {
            return if t.0 >= self.start.0 { 1.0 } else { 0.0 };
        }
        ((t.0 - self.start.0) / d).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Time, TimeSpan};

    #[test]
    fn progress_is_clamped() {
        let span = TimeSpan::new(Time(1.0), Time(3.0));
        assert_eq!(span.progress(Time(0.0)), 0.0);
        assert_eq!(span.progress(Time(2.0)), 0.5);
        assert_eq!(span.progress(Time(9.0)), 1.0);
    }

    #[test]
    fn zero_length_span_steps_at_start() {
        let span = TimeSpan::new(Time(0.5), Time(0.5));
        assert_eq!(span.progress(Time(0.49)), 0.0);
        assert_eq!(span.progress(Time(0.5)), 1.0);
    }
}
