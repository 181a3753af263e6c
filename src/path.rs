//! SVG path-data assembly for chromosome tracks and ribbons.

use std::fmt::Write;

/// Formats a pixel coordinate: integers print bare, anything else with at
/// most three decimals and no trailing zeros.
pub fn fmt_num(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{:.3}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[derive(Debug, Default, Clone)]
pub struct PathBuilder {
    d: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        PathBuilder::default()
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.d, "M{},{}", fmt_num(x), fmt_num(y));
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        let _ = write!(self.d, "L{},{}", fmt_num(x), fmt_num(y));
        self
    }

    /// Cubic Bezier to `(x, y)` with control points `c1` and `c2`.
    pub fn curve_to(mut self, c1: (f64, f64), c2: (f64, f64), x: f64, y: f64) -> Self {
        let _ = write!(
            self.d,
            "C{},{} {},{} {},{}",
            fmt_num(c1.0),
            fmt_num(c1.1),
            fmt_num(c2.0),
            fmt_num(c2.1),
            fmt_num(x),
            fmt_num(y)
        );
        self
    }

    pub fn horizontal(mut self, dx: f64) -> Self {
        let _ = write!(self.d, "h{}", fmt_num(dx));
        self
    }

    /// Relative clockwise quarter arc of radius `r` ending at `(dx, dy)`.
    pub fn arc(mut self, r: f64, dx: f64, dy: f64) -> Self {
        let _ = write!(
            self.d,
            "a{},{} 0 0 1 {},{}",
            fmt_num(r),
            fmt_num(r),
            fmt_num(dx),
            fmt_num(dy)
        );
        self
    }

    pub fn close(mut self) -> String {
        self.d.push('Z');
        self.d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(fmt_num(50.0), "50");
        assert_eq!(fmt_num(-5.0), "-5");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(1.0 / 3.0), "0.333");
        assert_eq!(fmt_num(-0.0001), "0");
    }

    #[test]
    fn builder_emits_commands_in_order() {
        let d = PathBuilder::new()
            .move_to(1.0, 2.0)
            .curve_to((1.0, 5.0), (3.0, 5.0), 3.0, 8.0)
            .line_to(4.0, 8.0)
            .horizontal(-2.0)
            .arc(5.0, 5.0, 5.0)
            .close();
        assert_eq!(d, "M1,2C1,5 3,5 3,8L4,8h-2a5,5 0 0 1 5,5Z");
    }
}
