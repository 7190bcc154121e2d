/// Format a float with at most `digits` fractional digits, trimming trailing zeros.
///
/// Used for SVG path data so equal geometry always produces equal strings.
pub fn format_number(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let mut s = format!("{value:.digits$}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}
