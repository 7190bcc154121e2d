use foundation::Rgb;

/// Fill colors shared by the map steps.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Palette {
    /// No data, or not highlighted.
    pub neutral: Rgb,
    pub alert: Rgb,
    /// Choropleth color for a normalized value of zero.
    pub choropleth_low: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            neutral: Rgb::new(0xcc, 0xcc, 0xcc),
            alert: Rgb::new(0xff, 0x41, 0x36),
            choropleth_low: Rgb::new(0xfe, 0xe7, 0xe6),
        }
    }
}

impl Palette {
    pub fn choropleth(&self) -> ColorScale {
        ColorScale::new([0.0, 1.0], self.choropleth_low, self.alert)
    }
}

/// Sequential color scale interpolating in RGB between two stops.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorScale {
    pub domain: [f64; 2],
    pub low: Rgb,
    pub high: Rgb,
}

impl ColorScale {
    pub fn new(domain: [f64; 2], low: Rgb, high: Rgb) -> Self {
        Self { domain, low, high }
    }

    pub fn color(&self, v: f64) -> Rgb {
        let [d0, d1] = self.domain;
        let t = if d1 == d0 { 0.5 } else { (v - d0) / (d1 - d0) };
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        self.low.lerp(self.high, t)
    }
}
