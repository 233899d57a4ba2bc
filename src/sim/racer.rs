//! Racer state: physical body plus race-progress and power-up state

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::RigidBody;
use super::powerup::{self, ActiveEffect, PowerupKind};
use crate::tuning::{PowerupTable, RacerTuning};

/// Normalized per-tick control signal, produced by an external
/// input-mapping collaborator (keyboard, gamepad, or AI) and consumed
/// read-only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInput {
    pub throttle: bool,
    pub brake: bool,
    pub steer_left: bool,
    pub steer_right: bool,
    pub use_item: bool,
}

/// Per-racer progression state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacerPhase {
    /// Frozen on the grid; motion integrates but control input is ignored
    Idle,
    Racing,
    /// Keeps coasting, no longer affects race-completion logic
    Finished,
}

/// A vehicle entity with physical and race-progress state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Racer {
    pub body: RigidBody,
    pub top_speed: f32,
    pub accel_rate: f32,
    /// Turn-rate multiplier
    pub handling: f32,
    /// Clamped to [0, 100]
    pub health: f32,
    pub phase: RacerPhase,
    /// Last validated gate. Starts at 0: the grid sits on the finish
    /// line, so gate 0 counts as crossed at race start.
    pub checkpoint_index: usize,
    /// Completed laps, starts at 0
    pub lap_count: u32,
    /// Race-clock timestamp when the current lap started (ms)
    pub lap_start_ms: f32,
    pub best_lap_ms: Option<f32>,
    pub finish_time_ms: Option<f32>,
    pub active_effects: Vec<ActiveEffect>,
    /// Deployable inventory slot (oil slick)
    pub held_item: Option<PowerupKind>,
}

pub const MAX_HEALTH: f32 = 100.0;

impl Racer {
    pub fn new(position: Vec2, rotation: f32, tuning: &RacerTuning) -> Self {
        Self {
            body: RigidBody::new(
                position,
                rotation,
                tuning.mass,
                tuning.friction,
                tuning.collider_radius,
            ),
            top_speed: tuning.top_speed,
            accel_rate: tuning.accel_rate,
            handling: tuning.handling,
            health: MAX_HEALTH,
            phase: RacerPhase::Idle,
            checkpoint_index: 0,
            lap_count: 0,
            lap_start_ms: 0.0,
            best_lap_ms: None,
            finish_time_ms: None,
            active_effects: Vec::new(),
            held_item: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RacerPhase::Finished
    }

    /// Any active shield effect blocks collision damage
    pub fn is_shielded(&self) -> bool {
        self.has_effect(PowerupKind::Shield)
    }

    /// Ghost racers skip racer-racer collision entirely
    pub fn is_ghost(&self) -> bool {
        self.has_effect(PowerupKind::Ghost)
    }

    fn has_effect(&self, kind: PowerupKind) -> bool {
        self.active_effects.iter().any(|e| e.kind == kind)
    }

    fn effect_strength(&self, kind: PowerupKind) -> Option<f32> {
        self.active_effects
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.strength)
    }

    /// Top-speed and engine-force multiplier from an active speed boost
    pub fn boost_multiplier(&self) -> f32 {
        self.effect_strength(PowerupKind::SpeedBoost).unwrap_or(1.0)
    }

    /// Collider radius after any size-reduction effect
    pub fn effective_radius(&self) -> f32 {
        let scale = self.effect_strength(PowerupKind::SizeReduction).unwrap_or(1.0);
        self.body.collider_radius * scale
    }

    /// Inflict collision damage unless shielded
    pub fn apply_damage(&mut self, amount: f32) {
        if self.is_shielded() || !amount.is_finite() {
            return;
        }
        self.health = (self.health - amount.max(0.0)).clamp(0.0, MAX_HEALTH);
    }

    pub fn heal(&mut self, amount: f32) {
        if amount.is_finite() {
            self.health = (self.health + amount.max(0.0)).clamp(0.0, MAX_HEALTH);
        }
    }

    /// Apply a collected power-up: instant kinds fire now, held kinds go
    /// to the inventory slot, timed kinds refresh-or-insert
    pub fn collect(&mut self, kind: PowerupKind, table: &PowerupTable) {
        let spec = table.spec(kind);
        if kind.is_instant() {
            match kind {
                PowerupKind::Repair => self.heal(spec.strength),
                _ => {}
            }
        } else if kind.is_held() {
            self.held_item = Some(kind);
        } else {
            powerup::refresh_or_insert(&mut self.active_effects, kind, spec);
        }
    }

    /// Count down timed effects, returning the kinds that expired
    pub fn tick_effects(&mut self, dt_ms: f32) -> Vec<PowerupKind> {
        powerup::tick_effects(&mut self.active_effects, dt_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn racer() -> Racer {
        Racer::new(Vec2::ZERO, 0.0, &Tuning::default().racer)
    }

    #[test]
    fn test_shield_blocks_damage() {
        let tuning = Tuning::default();
        let mut r = racer();
        r.apply_damage(30.0);
        assert_eq!(r.health, 70.0);

        r.collect(PowerupKind::Shield, &tuning.powerups);
        r.apply_damage(30.0);
        assert_eq!(r.health, 70.0);
    }

    #[test]
    fn test_health_clamped() {
        let mut r = racer();
        r.apply_damage(500.0);
        assert_eq!(r.health, 0.0);
        r.heal(500.0);
        assert_eq!(r.health, MAX_HEALTH);
        r.apply_damage(f32::NAN);
        assert_eq!(r.health, MAX_HEALTH);
    }

    #[test]
    fn test_repair_is_instant_and_not_retained() {
        let tuning = Tuning::default();
        let mut r = racer();
        r.apply_damage(40.0);
        r.collect(PowerupKind::Repair, &tuning.powerups);
        assert_eq!(r.health, 85.0);
        assert!(r.active_effects.is_empty());
        assert!(r.held_item.is_none());
    }

    #[test]
    fn test_oil_slick_is_held() {
        let tuning = Tuning::default();
        let mut r = racer();
        r.collect(PowerupKind::OilSlick, &tuning.powerups);
        assert_eq!(r.held_item, Some(PowerupKind::OilSlick));
        assert!(r.active_effects.is_empty());
    }

    #[test]
    fn test_size_reduction_shrinks_collider() {
        let tuning = Tuning::default();
        let mut r = racer();
        let full = r.effective_radius();
        r.collect(PowerupKind::SizeReduction, &tuning.powerups);
        assert!((r.effective_radius() - full * 0.5).abs() < 1e-5);

        // Expiry restores the full radius
        r.tick_effects(10_000.0);
        assert_eq!(r.effective_radius(), full);
    }

    #[test]
    fn test_ghost_flag() {
        let tuning = Tuning::default();
        let mut r = racer();
        assert!(!r.is_ghost());
        r.collect(PowerupKind::Ghost, &tuning.powerups);
        assert!(r.is_ghost());
    }
}
