//! Segment and polygon geometry queries
//!
//! The track is flat polygons and line segments; racers are circles.
//! Everything the collision and progression code needs reduces to
//! closest-point-on-segment and ray-casting parity tests. All queries
//! fail closed: degenerate polygons contain nothing and non-finite
//! points are nowhere.

use glam::Vec2;

/// Closest point on segment `[a, b]` to `p`, with the clamped parametric
/// position `t` in [0, 1]
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> (Vec2, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-9 {
        // Degenerate segment collapses to its first endpoint
        return (a, 0.0);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Distance from `p` to segment `[a, b]`
#[inline]
pub fn point_segment_distance(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let (closest, _) = closest_point_on_segment(a, b, p);
    (p - closest).length()
}

/// Does the circle at `center` overlap segment `[a, b]`?
#[inline]
pub fn segment_circle_intersects(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    point_segment_distance(a, b, center) < radius
}

/// Ray-casting point-in-polygon parity test
///
/// Horizontal edges (`yi == yj`) are skipped; they contribute no
/// crossings and would divide by zero. Polygons with fewer than three
/// vertices and non-finite query points contain nothing.
pub fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 || !p.is_finite() {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];
        if pi.y != pj.y {
            let crosses = (pi.y > p.y) != (pj.y > p.y);
            if crosses {
                let x_at_y = pi.x + (p.y - pi.y) / (pj.y - pi.y) * (pj.x - pi.x);
                if p.x < x_at_y {
                    inside = !inside;
                }
            }
        }
        j = i;
    }
    inside
}
