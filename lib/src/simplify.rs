//! Maximum-deviation point elimination over a single owned buffer.
//!
//! Segments are `(first, last)` index ranges pushed onto an explicit work
//! stack, so stack depth stays constant no matter how jagged the input is.

use serde::{Deserialize, Serialize};

use crate::geometry::{line_through, perpendicular_distance, Point};
use crate::{Error, Result};

/// Segment boundary handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// Every interior point is scanned and the final point is always kept.
    #[default]
    Exact,
    /// Historical output, quirks included: the scan skips each segment's
    /// second-to-last point, the left part stops short of the split point and
    /// the right part stops short of the segment's last point. The global final
    /// point may be dropped, and a single-point part is emitted twice.
    Legacy,
}

impl std::str::FromStr for Boundary {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(Boundary::Exact),
            "legacy" => Ok(Boundary::Legacy),
            other => Err(Error::invalid(format!("unknown boundary mode: {other}"))),
        }
    }
}

/// Simplify `points`, returning the retained points in input order.
pub fn simplify(points: &[Point], epsilon: f64, boundary: Boundary) -> Result<Vec<Point>> {
    let kept = simplify_indices(points, epsilon, boundary)?;
    Ok(kept.into_iter().map(|i| points[i]).collect())
}

/// Simplify `points`, returning the positions of retained points in input order.
pub fn simplify_indices(points: &[Point], epsilon: f64, boundary: Boundary) -> Result<Vec<usize>> {
    if points.len() < 2 {
        return Err(Error::invalid(format!(
            "need at least 2 points to simplify, got {}",
            points.len()
        )));
    }
    if epsilon.is_nan() || epsilon < 0.0 {
        return Err(Error::invalid(format!(
            "epsilon must be non-negative, got {epsilon}"
        )));
    }

    check_span(points)?;

    match boundary {
        Boundary::Exact => exact(points, epsilon),
        Boundary::Legacy => legacy(points, epsilon),
    }
}

// Coordinates must be finite and their spread representable, so that every
// offset taken in `farthest` stays finite.
fn check_span(points: &[Point]) -> Result<()> {
    let mut lo = Point::new(f64::INFINITY, f64::INFINITY);
    let mut hi = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (i, p) in points.iter().enumerate() {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(Error::invalid(format!(
                "point {i} is not finite: ({}, {})",
                p.x, p.y
            )));
        }
        lo = Point::new(lo.x.min(p.x), lo.y.min(p.y));
        hi = Point::new(hi.x.max(p.x), hi.y.max(p.y));
    }
    if !(hi.x - lo.x).is_finite() || !(hi.y - lo.y).is_finite() {
        return Err(Error::invalid(format!(
            "value range [{}, {}] overflows",
            lo.y, hi.y
        )));
    }
    Ok(())
}

/// Farthest point from the chord `points[first]..points[last]` among
/// `points[from..to]`. Ties go to the earliest index; an all-zero scan
/// reports distance 0.
fn farthest(
    points: &[Point],
    first: usize,
    last: usize,
    from: usize,
    to: usize,
) -> Result<(usize, f64)> {
    let mut best = (first, 0.0);
    if from >= to {
        return Ok(best);
    }
    // Measured relative to the chord's first point to keep magnitudes small.
    let origin = points[first];
    let line = line_through(Point::new(0.0, 0.0), points[last].offset_from(origin))?;
    for (i, p) in points.iter().enumerate().take(to).skip(from) {
        let d = perpendicular_distance(p.offset_from(origin), &line)?;
        if d > best.1 {
            best = (i, d);
        }
    }
    Ok(best)
}

fn exact(points: &[Point], epsilon: f64) -> Result<Vec<usize>> {
    let n = points.len();
    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut stack = vec![(0, n - 1)];
    while let Some((first, last)) = stack.pop() {
        if last - first < 2 {
            continue;
        }
        let (idx, dmax) = farthest(points, first, last, first + 1, last)?;
        if dmax > epsilon {
            keep[idx] = true;
            stack.push((idx, last));
            stack.push((first, idx));
        }
    }

    Ok(keep
        .iter()
        .enumerate()
        .filter_map(|(i, &k)| if k { Some(i) } else { None })
        .collect())
}

// Ranges here are half-open `[start, end)`. Left parts are pushed last so they
// are emitted first, which keeps the output in input order.
fn legacy(points: &[Point], epsilon: f64) -> Result<Vec<usize>> {
    let mut out = Vec::new();
    let mut stack = vec![(0, points.len())];
    while let Some((start, end)) = stack.pop() {
        let last = end - 1;
        let (idx, dmax) = farthest(points, start, last, start + 1, last.saturating_sub(1))?;
        if dmax > epsilon {
            stack.push((idx, last));
            stack.push((start, idx));
        } else {
            out.push(start);
            out.push(last);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[f64]) -> Vec<Point> {
        values.iter().copied().enumerate().map(Point::from).collect()
    }

    fn values(points: &[Point]) -> Vec<f64> {
        points.iter().map(|p| p.y).collect()
    }

    fn wobble(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64 * 0.07;
                40.0 * t.sin() + 15.0 * (3.1 * t).cos() + 4.0 * (11.3 * t).sin()
            })
            .collect()
    }

    #[test]
    fn collinear_input_collapses_at_zero_epsilon() {
        let data: Vec<f64> = (0..10).map(|i| i as f64).collect();
        for boundary in [Boundary::Exact, Boundary::Legacy] {
            let out = simplify(&points(&data), 0.0, boundary).unwrap();
            assert_eq!(values(&out), vec![0.0, 9.0]);
        }
    }

    #[test]
    fn keeps_endpoints() {
        let data = wobble(500);
        let pts = points(&data);
        for epsilon in [0.0, 0.5, 2.0, 10.0, 1000.0] {
            let out = simplify(&pts, epsilon, Boundary::Exact).unwrap();
            assert_eq!(out.first(), pts.first());
            assert_eq!(out.last(), pts.last());
        }
    }

    #[test]
    fn larger_epsilon_never_keeps_more() {
        let pts = points(&wobble(800));
        let mut prev = usize::MAX;
        for step in 0..60 {
            let epsilon = step as f64 * 0.25;
            let len = simplify_indices(&pts, epsilon, Boundary::Exact).unwrap().len();
            assert!(len <= prev, "epsilon {epsilon}: {len} > {prev}");
            prev = len;
        }
    }

    #[test]
    fn huge_epsilon_leaves_endpoints() {
        let pts = points(&wobble(300));
        let out = simplify_indices(&pts, 1e9, Boundary::Exact).unwrap();
        assert_eq!(out, vec![0, 299]);
    }

    #[test]
    fn exact_retains_tail_corner() {
        let pts = points(&[0.0, 0.0, 10.0, 0.0, 0.0, 0.0]);
        let out = simplify_indices(&pts, 1.0, Boundary::Exact).unwrap();
        assert_eq!(out, vec![0, 2, 3, 5]);
    }

    #[test]
    fn legacy_drops_final_sample() {
        // Index 5 is lost and the flat index 1 survives.
        let pts = points(&[0.0, 0.0, 10.0, 0.0, 0.0, 0.0]);
        let out = simplify_indices(&pts, 1.0, Boundary::Legacy).unwrap();
        assert_eq!(out, vec![0, 1, 2, 4]);
    }

    #[test]
    fn legacy_skips_second_to_last_in_scan() {
        // Only index 3 deviates, and it sits just before the end.
        let pts = points(&[0.0, 0.0, 0.0, 50.0, 0.0]);
        assert_eq!(
            simplify_indices(&pts, 1.0, Boundary::Legacy).unwrap(),
            vec![0, 4]
        );
        assert_eq!(
            simplify_indices(&pts, 1.0, Boundary::Exact).unwrap(),
            vec![0, 2, 3, 4]
        );
    }

    #[test]
    fn two_points_returned_as_is() {
        let pts = points(&[3.0, -3.0]);
        assert_eq!(simplify(&pts, 0.0, Boundary::Exact).unwrap(), pts);
        assert_eq!(simplify(&pts, 0.0, Boundary::Legacy).unwrap(), pts);
    }

    #[test]
    fn alternating_input_does_not_recurse() {
        let data: Vec<f64> = (0..10_000).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }).collect();
        let out = simplify_indices(&points(&data), 0.0, Boundary::Exact).unwrap();
        assert_eq!(out.len(), data.len());
    }

    #[test]
    fn rejects_short_input() {
        assert!(matches!(
            simplify(&points(&[1.0]), 0.0, Boundary::Exact),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_negative_epsilon() {
        assert!(matches!(
            simplify(&points(&[1.0, 2.0, 3.0]), -0.1, Boundary::Exact),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            simplify(&points(&[1.0, 2.0, 3.0]), f64::NAN, Boundary::Exact),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_non_finite_points() {
        assert!(matches!(
            simplify(&points(&[1.0, f64::NAN, 3.0, 4.0]), 0.0, Boundary::Exact),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_overflowing_range() {
        assert!(matches!(
            simplify(&points(&[-1e308, 0.0, 5.0, 1e308]), 0.0, Boundary::Exact),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn large_finite_values() {
        let data = [0.0, 1.5e308, 5.0, 1.6e308, 1e308];
        let out = simplify_indices(&points(&data), 1.0, Boundary::Exact).unwrap();
        assert_eq!(out, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn parses_boundary_names() {
        assert_eq!("exact".parse::<Boundary>().unwrap(), Boundary::Exact);
        assert_eq!("legacy".parse::<Boundary>().unwrap(), Boundary::Legacy);
        assert!("fast".parse::<Boundary>().is_err());
    }
}
