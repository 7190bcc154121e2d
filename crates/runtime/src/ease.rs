/// Easing curves in the `powerN` family (`power2` = cubic, `power3` = quartic).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    Power2In,
    Power2Out,
    Power3Out,
    #[default]
    Power3InOut,
}

impl Ease {
    /// Map linear progress `p` in `[0, 1]` to eased progress.
    pub fn apply(self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        match self {
            Ease::Linear => p,
            Ease::Power2In => p.powi(3),
            Ease::Power2Out => 1.0 - (1.0 - p).powi(3),
            Ease::Power3Out => 1.0 - (1.0 - p).powi(4),
            Ease::Power3InOut => {
                if p < 0.5 {
                    (2.0 * p).powi(4) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - p)).powi(4) / 2.0
                }
            }
        }
    }
}
