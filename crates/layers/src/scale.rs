/// Continuous linear map from a numeric domain onto a numeric range.
///
/// A collapsed domain maps everything to the middle of the range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return (r0 + r1) / 2.0;
        }
        r0 + (v - d0) / span * (r1 - r0)
    }

    /// Widen the domain outward to round tick steps (about `count` ticks).
    pub fn nice(mut self, count: usize) -> Self {
        let [mut start, mut stop] = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut previous: Option<f64> = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if previous == Some(step) || step == 0.0 || !step.is_finite() {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            }
            previous = Some(step);
        }

        self.domain = if reversed { [stop, start] } else { [start, stop] };
        self
    }
}

/// Round tick step for `count` ticks over `[start, stop]`.
///
/// Positive values are the step itself; negative values `-k` mean a step of `1 / k`.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

#[cfg(test)]
mod tests {
    use super::LinearScale;

    #[test]
    fn maps_linearly_and_inverts_range() {
        let s = LinearScale::new([0.0, 10.0], [100.0, 0.0]);
        assert_eq!(s.apply(0.0), 100.0);
        assert_eq!(s.apply(2.5), 75.0);
        assert_eq!(s.apply(10.0), 0.0);
    }

    #[test]
    fn collapsed_domain_maps_to_midpoint() {
        let s = LinearScale::new([3.0, 3.0], [0.5, 1.0]);
        assert_eq!(s.apply(3.0), 0.75);
    }

    #[test]
    fn nice_rounds_upper_bound() {
        assert_eq!(LinearScale::new([0.0, 387.0], [0.0, 1.0]).nice(10).domain, [0.0, 400.0]);
        assert_eq!(LinearScale::new([0.0, 93.2], [0.0, 1.0]).nice(10).domain, [0.0, 100.0]);
        assert_eq!(LinearScale::new([0.0, 0.87], [0.0, 1.0]).nice(10).domain, [0.0, 0.9]);
    }

    #[test]
    fn nice_keeps_empty_domain() {
        assert_eq!(LinearScale::new([0.0, 0.0], [0.0, 1.0]).nice(10).domain, [0.0, 0.0]);
    }
}
