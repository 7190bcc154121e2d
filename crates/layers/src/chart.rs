use std::f64::consts::{FRAC_PI_2, PI, TAU};

use foundation::math::Vec2;
use formats::{HourlyRadialPoint, WeeklyPoint};

use crate::path::PathBuilder;
use crate::scale::LinearScale;

const MONTH_NAMES: [&str; 12] = [
    "Січень",
    "Лютий",
    "Березень",
    "Квітень",
    "Травень",
    "Червень",
    "Липень",
    "Серпень",
    "Вересень",
    "Жовтень",
    "Листопад",
    "Грудень",
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

pub const AREA_MARGIN: Margin = Margin {
    top: 40.0,
    right: 30.0,
    bottom: 40.0,
    left: 50.0,
};

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

/// Weekly alert hours as a filled area with an outline, in surface coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaChartLayout {
    pub origin: Vec2,
    pub width: f64,
    pub height: f64,
    pub x: LinearScale,
    pub y: LinearScale,
    /// Plotted points relative to `origin`.
    pub points: Vec<Vec2>,
    pub area_path: String,
    pub line_path: String,
    /// Every fourth week, labelled by month.
    pub x_ticks: Vec<AxisTick>,
    /// Every 40 hours.
    pub y_ticks: Vec<AxisTick>,
}

impl AreaChartLayout {
    /// Lay out `weeks` (already without the trailing partial week) in a `width` x `height`
    /// surface.
    pub fn build(weeks: &[WeeklyPoint], width: f64, height: f64) -> Self {
        let chart_w = width * 0.8;
        let chart_h = height * 0.48;
        let origin = Vec2::new(AREA_MARGIN.left, (height - chart_h) / 2.0);

        let (min_week, max_week) = weeks.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), w| {
            let week = f64::from(w.week);
            (lo.min(week), hi.max(week))
        });
        let max_hours = weeks.iter().map(|w| w.duration_hours).fold(0.0, f64::max);

        let x = if weeks.is_empty() {
            LinearScale::new([0.0, 0.0], [0.0, chart_w])
        } else {
            LinearScale::new([min_week, max_week], [0.0, chart_w])
        };
        let y = LinearScale::new([0.0, max_hours], [chart_h, 0.0]).nice(10);

        let points: Vec<Vec2> = weeks
            .iter()
            .map(|w| Vec2::new(x.apply(f64::from(w.week)), y.apply(w.duration_hours)))
            .collect();
        let absolute: Vec<Vec2> = points.iter().map(|p| *p + origin).collect();

        let mut line = PathBuilder::new();
        monotone_x(&mut line, &absolute);

        let mut area = PathBuilder::new();
        monotone_x(&mut area, &absolute);
        if let (Some(first), Some(last)) = (absolute.first(), absolute.last()) {
            let base = origin.y + chart_h;
            area.line_to(Vec2::new(last.x, base))
                .line_to(Vec2::new(first.x, base))
                .close();
        }

        let x_ticks = if weeks.is_empty() {
            Vec::new()
        } else {
            (1..=max_week as u32)
                .step_by(4)
                .filter_map(|week| {
                    let label = MONTH_NAMES.get(((week - 1) / 4) as usize)?;
                    Some(AxisTick {
                        position: origin.x + x.apply(f64::from(week)),
                        label: label.to_string(),
                    })
                })
                .collect()
        };

        let y_max = y.domain[1];
        let y_ticks = (1..)
            .map(|i| f64::from(i) * 40.0)
            .take_while(|v| *v < y_max + 1.0)
            .map(|v| AxisTick {
                position: origin.y + y.apply(v),
                label: format!("{v} год"),
            })
            .collect();

        Self {
            origin,
            width: chart_w,
            height: chart_h,
            x,
            y,
            points,
            area_path: area.finish(),
            line_path: line.finish(),
            x_ticks,
            y_ticks,
        }
    }
}

/// Monotone cubic interpolation in x (Steffen), so the curve never overshoots the data.
fn monotone_x(path: &mut PathBuilder, points: &[Vec2]) {
    let Some(first) = points.first() else {
        return;
    };
    path.move_to(*first);
    if points.len() == 2 {
        path.line_to(points[1]);
        return;
    }
    if points.len() < 2 {
        return;
    }

    let secant = |i: usize| {
        let h = points[i + 1].x - points[i].x;
        if h == 0.0 { 0.0 } else { (points[i + 1].y - points[i].y) / h }
    };

    let n = points.len();
    let mut tangents = vec![0.0; n];
    for i in 1..n - 1 {
        let h0 = points[i].x - points[i - 1].x;
        let h1 = points[i + 1].x - points[i].x;
        let s0 = secant(i - 1);
        let s1 = secant(i);
        let p = (s0 * h1 + s1 * h0) / (h0 + h1);
        let m = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
        tangents[i] = if m.is_finite() { m } else { 0.0 };
    }
    tangents[0] = end_tangent(points[0], points[1], tangents[1]);
    tangents[n - 1] = end_tangent(points[n - 2], points[n - 1], tangents[n - 2]);

    for i in 0..n - 1 {
        let (p0, p1) = (points[i], points[i + 1]);
        let dx = (p1.x - p0.x) / 3.0;
        path.cubic_to(
            Vec2::new(p0.x + dx, p0.y + dx * tangents[i]),
            Vec2::new(p1.x - dx, p1.y - dx * tangents[i + 1]),
            p1,
        );
    }
}

fn sign(v: f64) -> f64 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

fn end_tangent(a: Vec2, b: Vec2, neighbour: f64) -> f64 {
    let h = b.x - a.x;
    if h == 0.0 {
        neighbour
    } else {
        (3.0 * (b.y - a.y) / h - neighbour) / 2.0
    }
}

pub const RADIAL_INNER_RADIUS: f64 = 120.0;
const RADIAL_MARGIN: f64 = 20.0;
const RADIAL_PAD_ANGLE: f64 = 0.01;
const RADIAL_LABEL_INSET: f64 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RadialBar {
    pub hour: u8,
    pub count: u32,
    pub value: f64,
    pub path: String,
    /// Resting opacity, linear in the value extent onto `[0.5, 1]`.
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourLabel {
    pub hour: u8,
    pub text: String,
    pub position: Vec2,
}

/// One annular bar per hour-of-day band, clockwise from 12 o'clock, centered on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialChartLayout {
    pub center: Vec2,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub bars: Vec<RadialBar>,
    pub labels: Vec<HourLabel>,
}

impl RadialChartLayout {
    pub fn build(hours: &[HourlyRadialPoint], width: f64, height: f64) -> Self {
        let center = Vec2::new(width / 2.0, height / 2.0);
        let inner = RADIAL_INNER_RADIUS;
        let outer = width.min(height) / 2.0 - RADIAL_MARGIN;

        let band = if hours.is_empty() {
            0.0
        } else {
            TAU / hours.len() as f64
        };
        let max_val = hours.iter().map(|h| h.normalized_val).fold(0.0, f64::max);
        let (min_val, top_val) = hours.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| {
            (lo.min(h.normalized_val), hi.max(h.normalized_val))
        });
        let radius = LinearScale::new([0.0, max_val], [inner, outer]);
        let opacity = LinearScale::new([min_val, top_val], [0.5, 1.0]);

        let mut bars = Vec::with_capacity(hours.len());
        let mut labels = Vec::with_capacity(hours.len());
        for (i, h) in hours.iter().enumerate() {
            let start = i as f64 * band;
            let end = start + band;
            bars.push(RadialBar {
                hour: h.hour_of_day,
                count: h.count,
                value: h.normalized_val,
                path: annular_sector(center, inner, radius.apply(h.normalized_val), start, end),
                opacity: opacity.apply(h.normalized_val),
            });

            let mid = start + band / 2.0;
            labels.push(HourLabel {
                hour: h.hour_of_day,
                text: format!("{:02}", h.hour_of_day),
                position: center + polar(inner - RADIAL_LABEL_INSET, mid),
            });
        }

        Self {
            center,
            inner_radius: inner,
            outer_radius: outer,
            bars,
            labels,
        }
    }
}

/// Point at `radius` and `angle` radians clockwise from 12 o'clock.
fn polar(radius: f64, angle: f64) -> Vec2 {
    let a = angle - FRAC_PI_2;
    Vec2::new(radius * a.cos(), radius * a.sin())
}

/// Annular sector with the band padded by a constant arc length at the inner radius.
fn annular_sector(center: Vec2, r0: f64, r1: f64, a0: f64, a1: f64) -> String {
    let (r0, r1) = if r1 < r0 { (r1, r0) } else { (r0, r1) };
    let half_pad = RADIAL_PAD_ANGLE / 2.0;
    let pad_radius = r0;

    let padded = |r: f64| {
        if r <= 0.0 {
            return ((a0 + a1) / 2.0, (a0 + a1) / 2.0);
        }
        let p = (pad_radius / r * half_pad.sin()).clamp(-1.0, 1.0).asin();
        if a1 - a0 - 2.0 * p > 1e-12 {
            (a0 + p, a1 - p)
        } else {
            ((a0 + a1) / 2.0, (a0 + a1) / 2.0)
        }
    };
    let (outer_start, outer_end) = padded(r1);
    let (inner_start, inner_end) = padded(r0);

    let mut path = PathBuilder::new();
    path.move_to(center + polar(r1, outer_start)).arc_to(
        r1,
        outer_end - outer_start > PI,
        true,
        center + polar(r1, outer_end),
    );
    if r0 > 0.0 {
        path.line_to(center + polar(r0, inner_end)).arc_to(
            r0,
            inner_end - inner_start > PI,
            false,
            center + polar(r0, inner_start),
        );
    }
    path.close();
    path.finish()
}
