//! Deterministic race simulation
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Frame-driven `tick` only, no internal clock
//! - Stable iteration order (racers advance by index)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod events;
pub mod geometry;
pub mod powerup;
pub mod progress;
pub mod racer;
pub mod tick;
pub mod track;

pub use body::RigidBody;
pub use collision::{CollisionResult, circle_circle, circle_segment};
pub use events::RaceEvent;
pub use powerup::{ActiveEffect, PowerupKind};
pub use racer::{ControlInput, Racer, RacerPhase};
pub use tick::{RacePhase, RaceState, tick};
pub use track::{Track, TrackDef, TrackError};
