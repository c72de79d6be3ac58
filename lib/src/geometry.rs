use serde::Serialize;

use crate::{Error, Result};

/// A sample paired with its position in the input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `self` relative to `origin`.
    pub fn offset_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

impl From<(usize, f64)> for Point {
    fn from((i, v): (usize, f64)) -> Self {
        Self::new(i as f64, v)
    }
}

/// Implicit line `a·x + b·y + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// Line through two points. Fails when they coincide, since no direction
/// can be derived from a single point.
pub fn line_through(p1: Point, p2: Point) -> Result<Line> {
    let a = p2.y - p1.y;
    let b = p1.x - p2.x;
    if a == 0.0 && b == 0.0 {
        return Err(Error::DegenerateSegment { x: p1.x, y: p1.y });
    }
    let c = -(a * p1.x + b * p1.y);
    Ok(Line { a, b, c })
}

/// Distance from `p` to `line`.
///
/// Coefficients are divided by the larger of `|a|` and `|b|` first, so a line
/// with huge but finite coefficients still yields a finite distance. Fails on
/// a non-finite point, and with [`Error::DegenerateLine`] when the line has no
/// direction or the distance cannot be represented.
pub fn perpendicular_distance(p: Point, line: &Line) -> Result<f64> {
    if !p.x.is_finite() || !p.y.is_finite() {
        return Err(Error::invalid(format!(
            "point ({}, {}) is not finite",
            p.x, p.y
        )));
    }
    if !line.a.is_finite() || !line.b.is_finite() || !line.c.is_finite() {
        return Err(Error::DegenerateLine);
    }
    let scale = line.a.abs().max(line.b.abs());
    if scale == 0.0 {
        return Err(Error::DegenerateLine);
    }

    let (a, b, c) = (line.a / scale, line.b / scale, line.c / scale);
    let d = (a * p.x + b * p.y + c).abs() / a.hypot(b);
    if !d.is_finite() {
        return Err(Error::DegenerateLine);
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_coefficients() {
        let line = line_through(Point::new(1.0, 2.0), Point::new(4.0, 6.0)).unwrap();
        assert_eq!(line, Line { a: 4.0, b: -3.0, c: 2.0 });
    }

    #[test]
    fn endpoints_lie_on_line() {
        let (p1, p2) = (Point::new(0.0, 3.5), Point::new(7.0, -2.0));
        let line = line_through(p1, p2).unwrap();
        assert!(perpendicular_distance(p1, &line).unwrap() < 1e-12);
        assert!(perpendicular_distance(p2, &line).unwrap() < 1e-12);
    }

    #[test]
    fn distance_to_horizontal_line() {
        let line = line_through(Point::new(0.0, 0.0), Point::new(5.0, 0.0)).unwrap();
        assert_eq!(perpendicular_distance(Point::new(2.0, 10.0), &line).unwrap(), 10.0);
        assert_eq!(perpendicular_distance(Point::new(3.0, -4.0), &line).unwrap(), 4.0);
    }

    #[test]
    fn distance_to_diagonal_line() {
        let line = line_through(Point::new(0.0, 0.0), Point::new(1.0, 1.0)).unwrap();
        let d = perpendicular_distance(Point::new(0.0, 2.0), &line).unwrap();
        assert!((d - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn vertical_line_is_valid() {
        let line = line_through(Point::new(2.0, 0.0), Point::new(2.0, 9.0)).unwrap();
        assert_eq!(perpendicular_distance(Point::new(5.0, 4.0), &line).unwrap(), 3.0);
    }

    #[test]
    fn coincident_points_fail() {
        let p = Point::new(3.0, 1.5);
        assert_eq!(
            line_through(p, p),
            Err(Error::DegenerateSegment { x: 3.0, y: 1.5 })
        );
    }

    #[test]
    fn zero_direction_fails() {
        let line = Line { a: 0.0, b: 0.0, c: 1.0 };
        assert_eq!(
            perpendicular_distance(Point::new(1.0, 1.0), &line),
            Err(Error::DegenerateLine)
        );
    }

    #[test]
    fn non_finite_point_fails() {
        let line = line_through(Point::new(0.0, 0.0), Point::new(4.0, 1.0)).unwrap();
        assert!(matches!(
            perpendicular_distance(Point::new(2.0, f64::NAN), &line),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            perpendicular_distance(Point::new(f64::INFINITY, 0.0), &line),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn overflowed_line_fails() {
        let line = Line { a: f64::INFINITY, b: -1.0, c: 0.0 };
        assert_eq!(
            perpendicular_distance(Point::new(1.0, 1.0), &line),
            Err(Error::DegenerateLine)
        );
    }

    #[test]
    fn huge_coefficients_stay_finite() {
        // a·x alone would overflow without scaling.
        let line = Line { a: 1.5e308, b: -2.0, c: 0.0 };
        let d = perpendicular_distance(Point::new(3.0, 1.0e308), &line).unwrap();
        assert!(d.is_finite());
        assert!((d - 5.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn offset_from_origin() {
        let p = Point::new(5.0, 2.5).offset_from(Point::new(2.0, -1.0));
        assert_eq!(p, Point::new(3.0, 3.5));
    }

    #[test]
    fn point_from_indexed_sample() {
        assert_eq!(Point::from((7, -1.25)), Point::new(7.0, -1.25));
    }
}
