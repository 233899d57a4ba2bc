//! Progression events emitted by the tick loop
//!
//! Racers are identified by their index into `RaceState::racers`. The
//! rendering/UI layer subscribes to these; the simulation never reads
//! them back.

use serde::{Deserialize, Serialize};

use super::powerup::PowerupKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    CheckpointPassed {
        racer: usize,
        index: usize,
    },
    LapCompleted {
        racer: usize,
        lap: u32,
        lap_time_ms: f32,
    },
    RaceFinished {
        racer: usize,
        finish_time_ms: f32,
    },
    PowerupCollected {
        racer: usize,
        kind: PowerupKind,
    },
    PowerupExpired {
        racer: usize,
        kind: PowerupKind,
    },
    /// `b` is `None` for boundary hits
    CollisionOccurred {
        a: usize,
        b: Option<usize>,
        damage: f32,
    },
}
