//! Spud Circuit - a top-down potato racing engine
//!
//! Core modules:
//! - `sim`: Deterministic race simulation (motion, collisions, track
//!   geometry, lap/power-up progression)
//! - `tuning`: Data-driven physics and balance tables
//!
//! The simulation is pure and frame-driven: no rendering, no clock, no
//! platform dependencies. The surrounding scene/UI layer feeds a
//! normalized [`sim::ControlInput`] per racer plus a delta time in
//! seconds to each [`sim::tick`] call, and consumes the returned
//! [`sim::RaceEvent`] list.

pub mod sim;
pub mod tuning;

pub use sim::{ControlInput, RaceEvent, RaceState, Racer, Track, TrackDef, tick};
pub use tuning::Tuning;

use glam::Vec2;

/// Engine constants that are structural rather than tunable
pub mod consts {
    /// Recommended fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Hard cap on a single tick's delta time. Callers are expected to
    /// clamp frame hitches upstream; the engine clamps again so a stall
    /// can never tunnel a racer through a wall.
    pub const MAX_TICK_DT: f32 = 0.1;
    /// Collection radius for power-up pickups on the track
    pub const PICKUP_RADIUS: f32 = 18.0;
    /// Start grid layout: slot spacing in both axes
    pub const GRID_SLOT_SPACING: f32 = 56.0;
    /// Maximum racers placed on the start grid
    pub const GRID_SLOTS: usize = 4;
}

/// Normalize an angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit heading vector for an angle
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
