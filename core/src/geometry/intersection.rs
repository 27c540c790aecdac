//! 2D circle intersection used to place joints from two known neighbours.

use super::Point2;

/// Calculate the intersection points of two circles.
/// Returns None if the circles are too far apart, nested, or identical.
///
/// The points come back in a fixed order: with `u = (c2 - c1) / d` and the
/// base point `p3 = c1 + a * u`, the first point is `p3 + h * (u.y, -u.x)`
/// and the second `p3 - h * (u.y, -u.x)`. Tangent circles yield the same
/// point twice.
pub fn circle_circle_intersection(
    c1: &Point2, r1: f64,
    c2: &Point2, r2: f64
) -> Option<(Point2, Point2)> {
    let dx = c2.x - c1.x;
    let dy = c2.y - c1.y;
    let d = (dx * dx + dy * dy).sqrt();

    // Too far apart
    if d > r1 + r2 {
        return None;
    }
    // One circle strictly inside the other
    if d < (r1 - r2).abs() {
        return None;
    }
    // Coincident circles have infinitely many intersections
    if d == 0.0 && r1 == r2 {
        return None;
    }

    // Distance from c1 to the chord through both intersection points
    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h_sq = r1 * r1 - a * a;
    if h_sq < 0.0 {
        return None;
    }
    let h = h_sq.sqrt();
    if !(a.is_finite() && h.is_finite()) {
        return None;
    }

    let x3 = c1.x + a * dx / d;
    let y3 = c1.y + a * dy / d;

    Some((
        Point2::new(x3 + h * dy / d, y3 - h * dx / d),
        Point2::new(x3 - h * dy / d, y3 + h * dx / d),
    ))
}
