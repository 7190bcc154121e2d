use foundation::format_number;
use foundation::math::{Mercator, Vec2};
use formats::{GeoPoint, Polygon};

/// Decimal digits kept in emitted path coordinates.
pub const PATH_DIGITS: usize = 3;

/// Incremental SVG path `d` builder with compact number formatting.
#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    d: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn point(&mut self, p: Vec2) {
        self.d.push_str(&format_number(p.x, PATH_DIGITS));
        self.d.push(',');
        self.d.push_str(&format_number(p.y, PATH_DIGITS));
    }

    pub fn move_to(&mut self, p: Vec2) -> &mut Self {
        self.d.push('M');
        self.point(p);
        self
    }

    pub fn line_to(&mut self, p: Vec2) -> &mut Self {
        self.d.push('L');
        self.point(p);
        self
    }

    pub fn cubic_to(&mut self, c1: Vec2, c2: Vec2, p: Vec2) -> &mut Self {
        self.d.push('C');
        self.point(c1);
        self.d.push(',');
        self.point(c2);
        self.d.push(',');
        self.point(p);
        self
    }

    /// Circular arc of radius `r` ending at `p`.
    pub fn arc_to(&mut self, r: f64, large_arc: bool, sweep: bool, p: Vec2) -> &mut Self {
        let r = format_number(r, PATH_DIGITS);
        self.d.push_str(&format!(
            "A{r},{r},0,{},{},",
            u8::from(large_arc),
            u8::from(sweep)
        ));
        self.point(p);
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.d.push('Z');
        self
    }

    pub fn is_empty(&self) -> bool {
        self.d.is_empty()
    }

    pub fn finish(self) -> String {
        self.d
    }
}

/// Project every ring of `polygons` and emit one closed subpath per ring.
///
/// The explicit closing vertex of GeoJSON rings is dropped since `Z` closes the ring.
pub fn polygons_path(polygons: &[Polygon], projection: &Mercator) -> String {
    let mut path = PathBuilder::new();
    for ring in polygons.iter().flatten() {
        ring_path(&mut path, ring, projection);
    }
    path.finish()
}

fn ring_path(path: &mut PathBuilder, ring: &[GeoPoint], projection: &Mercator) {
    let ring = match ring {
        [first, .., last] if first == last => &ring[..ring.len() - 1],
        _ => ring,
    };
    let mut points = ring.iter().map(|p| projection.project(p.lon_deg, p.lat_deg));
    let Some(first) = points.next() else {
        return;
    };
    path.move_to(first);
    for p in points {
        path.line_to(p);
    }
    path.close();
}
