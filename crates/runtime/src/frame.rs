use foundation::time::Time;

/// Deterministic frame metadata.
///
/// This is the timebase that drives every animation. It is intentionally small and
/// pure so a session can be recorded and replayed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (seconds).
    pub dt_s: f64,
    /// Time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// Frame `index` of a clock ticking `fps` times per second.
    pub fn at_rate(index: u64, fps: u32) -> Self {
        Self::new(index, 1.0 / f64::from(fps.max(1)))
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }

    /// Frames covering `seconds` at this frame's rate, starting with `self`.
    pub fn span(self, seconds: f64) -> impl Iterator<Item = Frame> {
        let count = if self.dt_s > 0.0 {
            (seconds.max(0.0) / self.dt_s).round() as u64
        } else {
            0
        };
        (0..count).map(move |i| Frame::new(self.index + i, self.dt_s))
    }
}
