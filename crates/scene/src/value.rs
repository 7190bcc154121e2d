use std::fmt;

use foundation::{Rgb, format_number};
use serde::{Deserialize, Serialize};

/// Decimal places kept when tweening numbers embedded in strings.
const STRING_TWEEN_DIGITS: usize = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Px,
    Percent,
    Vh,
    Rem,
}

impl LengthUnit {
    fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Px => "px",
            LengthUnit::Percent => "%",
            LengthUnit::Vh => "vh",
            LengthUnit::Rem => "rem",
        }
    }
}

/// CSS-style length used for container sizing.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub const ZERO: Length = Length {
        value: 0.0,
        unit: LengthUnit::Px,
    };

    pub const fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub const fn percent(value: f64) -> Self {
        Self::new(value, LengthUnit::Percent)
    }

    pub const fn vh(value: f64) -> Self {
        Self::new(value, LengthUnit::Vh)
    }

    pub const fn rem(value: f64) -> Self {
        Self::new(value, LengthUnit::Rem)
    }

    /// Interpolate when both ends share a unit (zero adopts the other side's unit);
    /// otherwise jump to `other` on completion.
    pub fn interpolate(self, other: Length, t: f64) -> Length {
        let (from, to) = match (self.value == 0.0, other.value == 0.0) {
            (true, false) => (Length::new(0.0, other.unit), other),
            (false, true) => (self, Length::new(0.0, self.unit)),
            _ => (self, other),
        };
        if from.unit != to.unit {
            return if t >= 1.0 { other } else { self };
        }
        if t >= 1.0 {
            return other;
        }
        Length::new(from.value + (to.value - from.value) * t, from.unit)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value == 0.0 {
            return f.write_str("0");
        }
        write!(f, "{}{}", format_number(self.value, 3), self.unit.suffix())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn interpolate(self, other: ViewBox, t: f64) -> ViewBox {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        ViewBox::new(
            mix(self.x, other.x),
            mix(self.y, other.y),
            mix(self.width, other.width),
            mix(self.height, other.height),
        )
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            format_number(self.x, 3),
            format_number(self.y, 3),
            format_number(self.width, 3),
            format_number(self.height, 3)
        )
    }
}

/// A value held by a scene property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Number(f64),
    Color(#[serde(with = "hex_color")] Rgb),
    Length(Length),
    ViewBox(ViewBox),
    /// SVG path data.
    Path(String),
    Text(String),
}

impl Value {
    /// Value at progress `t` (already eased) between `from` and `to`.
    ///
    /// Discrete values (text, mismatched kinds, structurally different paths) hold
    /// `from` until the tween completes.
    pub fn interpolate(from: &Value, to: &Value, t: f64) -> Value {
        if t >= 1.0 {
            return to.clone();
        }
        if t <= 0.0 {
            return from.clone();
        }
        match (from, to) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + (b - a) * t),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(*b, t)),
            (Value::Length(a), Value::Length(b)) => Value::Length(a.interpolate(*b, t)),
            (Value::ViewBox(a), Value::ViewBox(b)) => Value::ViewBox(a.interpolate(*b, t)),
            (Value::Path(a), Value::Path(b)) => match interpolate_numeric_string(a, b, t) {
                Some(s) => Value::Path(s),
                None => from.clone(),
            },
            _ => from.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Path(s) | Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Text(&'a str),
    Number(f64),
}

fn tokenize(s: &str) -> Vec<Token<'_>> {
    let bytes = s.as_bytes();
    let mut out = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if let Some(end) = scan_number(bytes, i) {
            if text_start < i {
                out.push(Token::Text(&s[text_start..i]));
            }
            match s[i..end].parse::<f64>() {
                Ok(v) => out.push(Token::Number(v)),
                Err(_) => out.push(Token::Text(&s[i..end])),
            }
            i = end;
            text_start = end;
        } else {
            i += 1;
        }
    }
    if text_start < bytes.len() {
        out.push(Token::Text(&s[text_start..]));
    }
    out
}

// Returns the end offset of a number starting at `i`, if one starts there.
fn scan_number(bytes: &[u8], i: usize) -> Option<usize> {
    let digits = |mut j: usize| {
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        j
    };
    let mut j = i;
    if j < bytes.len() && (bytes[j] == b'-' || bytes[j] == b'+') {
        j += 1;
    }
    let int_end = digits(j);
    let mut end = int_end;
    let mut has_digits = int_end > j;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_end = digits(end + 1);
        if frac_end > end + 1 {
            has_digits = true;
            end = frac_end;
        } else if has_digits {
            end += 1;
        }
    }
    if !has_digits {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut k = end + 1;
        if k < bytes.len() && (bytes[k] == b'-' || bytes[k] == b'+') {
            k += 1;
        }
        let exp_end = digits(k);
        if exp_end > k {
            end = exp_end;
        }
    }
    Some(end)
}

/// Tween every number embedded in two strings that share the same non-numeric skeleton.
///
/// Returns `None` when the skeletons differ.
pub fn interpolate_numeric_string(from: &str, to: &str, t: f64) -> Option<String> {
    let a = tokenize(from);
    let b = tokenize(to);
    if a.len() != b.len() {
        return None;
    }
    let mut out = String::with_capacity(to.len());
    for (x, y) in a.iter().zip(b.iter()) {
        match (x, y) {
            (Token::Text(p), Token::Text(q)) if p == q => out.push_str(p),
            (Token::Number(p), Token::Number(q)) => {
                out.push_str(&format_number(p + (q - p) * t, STRING_TWEEN_DIGITS))
            }
            _ => return None,
        }
    }
    Some(out)
}

mod hex_color {
    use foundation::Rgb;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Rgb, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgb, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
