use super::Vec2;
use crate::bounds::Aabb2;

/// Latitude limit of the spherical Mercator plane (degrees).
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_59;

/// Scale used while measuring geometry before fitting.
const FIT_REFERENCE_SCALE: f64 = 150.0;

/// Spherical Mercator projection with a uniform scale and a planar translation.
///
/// Conventions match the usual SVG map setup:
/// - `x` grows eastward, `y` grows southward (screen space).
/// - `scale` is in pixels per radian.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mercator {
    pub scale: f64,
    pub translate: Vec2,
}

impl Mercator {
    pub fn new(scale: f64, translate: Vec2) -> Self {
        Self { scale, translate }
    }

    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Vec2 {
        let lat = lat_deg.clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG);
        let lambda = lon_deg.to_radians();
        let phi = lat.to_radians();
        let y = (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln();
        Vec2::new(
            lambda * self.scale + self.translate.x,
            -y * self.scale + self.translate.y,
        )
    }

    /// Fit `points` (lon/lat degrees) into the planar `extent`, preserving aspect ratio and
    /// centering the leftover space.
    ///
    /// Returns `None` if there is nothing to fit or every point projects to the same spot.
    pub fn fit_extent(extent: Aabb2, points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let reference = Mercator::new(FIT_REFERENCE_SCALE, Vec2::ZERO);
        let b = Aabb2::from_points(points.into_iter().map(|(lon, lat)| {
            let p = reference.project(lon, lat);
            [p.x, p.y]
        }));
        if b.is_empty() {
            return None;
        }

        let w = extent.width();
        let h = extent.height();
        let kx = if b.width() > 0.0 { w / b.width() } else { f64::INFINITY };
        let ky = if b.height() > 0.0 { h / b.height() } else { f64::INFINITY };
        let k = kx.min(ky);
        if !k.is_finite() || k <= 0.0 {
            return None;
        }

        let x = extent.min[0] + (w - k * (b.max[0] + b.min[0])) / 2.0;
        let y = extent.min[1] + (h - k * (b.max[1] + b.min[1])) / 2.0;
        Some(Mercator::new(FIT_REFERENCE_SCALE * k, Vec2::new(x, y)))
    }

    pub fn fit_size(
        width: f64,
        height: f64,
        points: impl IntoIterator<Item = (f64, f64)>,
    ) -> Option<Self> {
        Self::fit_extent(Aabb2::new([0.0, 0.0], [width, height]), points)
    }

    /// Blend scale and translation towards `other`.
    pub fn interpolate(&self, other: &Mercator, t: f64) -> Mercator {
        Mercator::new(
            self.scale + (other.scale - self.scale) * t,
            self.translate.lerp(other.translate, t),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Mercator;
    use crate::bounds::Aabb2;
    use crate::math::Vec2;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn origin_maps_to_translate() {
        let m = Mercator::new(100.0, Vec2::new(5.0, 7.0));
        let p = m.project(0.0, 0.0);
        assert_close(p.x, 5.0, 1e-9);
        assert_close(p.y, 7.0, 1e-9);
    }

    #[test]
    fn north_is_up() {
        let m = Mercator::new(100.0, Vec2::ZERO);
        assert!(m.project(0.0, 10.0).y < m.project(0.0, -10.0).y);
        assert!(m.project(10.0, 0.0).x > m.project(-10.0, 0.0).x);
    }

    #[test]
    fn poles_stay_finite() {
        let m = Mercator::new(100.0, Vec2::ZERO);
        assert!(m.project(0.0, 90.0).y.is_finite());
        assert!(m.project(0.0, -90.0).y.is_finite());
    }

    #[test]
    fn fit_extent_fills_limiting_axis() {
        let pts = [(22.0, 44.0), (40.0, 44.0), (40.0, 52.5), (22.0, 52.5)];
        let extent = Aabb2::new([10.0, 20.0], [410.0, 320.0]);
        let m = Mercator::fit_extent(extent, pts).expect("fit");

        let projected = Aabb2::from_points(pts.iter().map(|&(lon, lat)| {
            let p = m.project(lon, lat);
            [p.x, p.y]
        }));
        // One axis touches both edges, the other is centered inside.
        let fills_x = (projected.width() - 400.0).abs() < 1e-6;
        let fills_y = (projected.height() - 300.0).abs() < 1e-6;
        assert!(fills_x || fills_y);
        assert_close(
            (projected.min[0] + projected.max[0]) / 2.0,
            210.0,
            1e-6,
        );
        assert_close(
            (projected.min[1] + projected.max[1]) / 2.0,
            170.0,
            1e-6,
        );
    }

    #[test]
    fn fit_rejects_empty_and_degenerate_input() {
        assert!(Mercator::fit_size(100.0, 100.0, Vec::<(f64, f64)>::new()).is_none());
        assert!(Mercator::fit_size(100.0, 100.0, [(1.0, 1.0), (1.0, 1.0)]).is_none());
    }

    #[test]
    fn interpolate_halfway() {
        let a = Mercator::new(100.0, Vec2::new(0.0, 0.0));
        let b = Mercator::new(300.0, Vec2::new(10.0, -20.0));
        let m = a.interpolate(&b, 0.5);
        assert_close(m.scale, 200.0, 1e-12);
        assert_eq!(m.translate, Vec2::new(5.0, -10.0));
    }
}
