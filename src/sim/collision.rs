//! Collision detection and impulse resolution
//!
//! Racers are circles; track boundaries are segment lists. Detection
//! returns `Option<CollisionResult>` so a miss can never be mistaken for
//! a hit, and resolution reports the impact speed along the normal so
//! the caller can turn it into damage.

use glam::Vec2;

use super::body::RigidBody;
use super::geometry::closest_point_on_segment;

/// A detected overlap, computed per query and never persisted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Unit normal. For circle-circle: from `a` toward `b`. For
    /// circle-segment: from the segment toward the circle center.
    pub normal: Vec2,
    /// Penetration depth, always >= 0
    pub overlap: f32,
    pub contact: Vec2,
}

/// Circle-vs-circle overlap test
///
/// Colliding iff the center distance is under the radius sum. Exactly
/// coincident centers fall back to an arbitrary fixed normal rather
/// than dividing by zero.
pub fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<CollisionResult> {
    if !pa.is_finite() || !pb.is_finite() {
        return None;
    }
    let delta = pb - pa;
    let dist_sq = delta.length_squared();
    let min_dist = ra + rb;
    if dist_sq >= min_dist * min_dist {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::X };
    Some(CollisionResult {
        normal,
        overlap: min_dist - dist,
        contact: pa + normal * ra,
    })
}

/// Circle-vs-segment overlap test via closest-point projection
pub fn circle_segment(center: Vec2, radius: f32, a: Vec2, b: Vec2) -> Option<CollisionResult> {
    if !center.is_finite() {
        return None;
    }
    let (closest, _) = closest_point_on_segment(a, b, center);
    let delta = center - closest;
    let dist = delta.length();
    if dist >= radius {
        return None;
    }
    let normal = if dist > 1e-6 {
        delta / dist
    } else {
        // Center sits on the segment; push out perpendicular to it
        let along = b - a;
        if along.length_squared() > 1e-9 {
            along.perp().normalize()
        } else {
            Vec2::X
        }
    };
    Some(CollisionResult {
        normal,
        overlap: radius - dist,
        contact: closest,
    })
}

/// Reflect a velocity about a surface normal: `v' = v - 2(v·n)n`
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Impulse resolution for two dynamic bodies
///
/// `result.normal` must point from `a` toward `b`. Skips resolution when
/// the bodies are already separating. Returns the closing speed along
/// the normal (0.0 when skipped) for damage accounting.
pub fn resolve_pair(
    a: &mut RigidBody,
    b: &mut RigidBody,
    result: &CollisionResult,
    restitution: f32,
    position_correction: f32,
) -> f32 {
    let n = result.normal;
    let rel = (b.velocity - a.velocity).dot(n);
    if rel >= 0.0 {
        return 0.0;
    }

    let inv_ma = 1.0 / a.mass.max(1e-3);
    let inv_mb = 1.0 / b.mass.max(1e-3);
    let j = -(1.0 + restitution) * rel / (inv_ma + inv_mb);
    a.velocity -= n * (j * inv_ma);
    b.velocity += n * (j * inv_mb);

    // Push the pair apart proportionally to inverse mass; damped so
    // resting contacts don't jitter
    let correction = n * (result.overlap * position_correction) / (inv_ma + inv_mb);
    a.position -= correction * inv_ma;
    b.position += correction * inv_mb;

    -rel
}

/// Resolution against an infinite-mass boundary
///
/// Only the body moves: velocity reflects about the normal scaled by the
/// bounce factor, loses energy, and the body is pushed clear of the
/// penetration. Returns the impact speed along the normal.
pub fn resolve_boundary(
    body: &mut RigidBody,
    result: &CollisionResult,
    bounce: f32,
    energy_retention: f32,
) -> f32 {
    let n = result.normal;
    let approach = -body.velocity.dot(n);

    if approach > 0.0 {
        body.velocity = reflect(body.velocity, n) * bounce * energy_retention;
    }
    body.position += n * (result.overlap + 0.5);

    approach.max(0.0)
}
