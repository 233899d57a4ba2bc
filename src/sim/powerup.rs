//! Power-up kinds and timed-effect lifecycle
//!
//! Timed effects are unique per kind on a racer: re-collecting refreshes
//! the remaining duration instead of stacking. Instant kinds apply on
//! pickup and are never retained. The oil slick is held as an inventory
//! item until the driver triggers it.

use serde::{Deserialize, Serialize};

use crate::tuning::PowerupSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerupKind {
    SpeedBoost,
    Shield,
    /// Collision-immune: passes through other racers
    Ghost,
    /// Deployable hazard, held until the action button fires it
    OilSlick,
    SizeReduction,
    /// Instant heal on pickup
    Repair,
}

impl PowerupKind {
    /// Applied immediately on pickup, never enters the active list
    pub fn is_instant(self) -> bool {
        matches!(self, PowerupKind::Repair)
    }

    /// Stored in the held-item slot instead of the active list
    pub fn is_held(self) -> bool {
        matches!(self, PowerupKind::OilSlick)
    }
}

/// One running timed effect on a racer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerupKind,
    pub remaining_ms: f32,
    pub strength: f32,
}

/// Add a timed effect, or refresh the existing one of the same kind.
///
/// Refreshing resets `remaining_ms` to the spec duration; durations
/// never accumulate.
pub fn refresh_or_insert(effects: &mut Vec<ActiveEffect>, kind: PowerupKind, spec: PowerupSpec) {
    if let Some(existing) = effects.iter_mut().find(|e| e.kind == kind) {
        existing.remaining_ms = spec.duration_ms;
        existing.strength = spec.strength;
    } else {
        effects.push(ActiveEffect {
            kind,
            remaining_ms: spec.duration_ms,
            strength: spec.strength,
        });
    }
}

/// Count down every effect and drop the expired ones, returning their
/// kinds in list order
pub fn tick_effects(effects: &mut Vec<ActiveEffect>, dt_ms: f32) -> Vec<PowerupKind> {
    let mut expired = Vec::new();
    for effect in effects.iter_mut() {
        effect.remaining_ms -= dt_ms;
    }
    effects.retain(|e| {
        if e.remaining_ms <= 0.0 {
            expired.push(e.kind);
            false
        } else {
            true
        }
    });
    expired
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(duration_ms: f32) -> PowerupSpec {
        PowerupSpec {
            duration_ms,
            strength: 1.5,
            respawn_ms: 5000.0,
        }
    }

    #[test]
    fn test_recollect_refreshes_instead_of_stacking() {
        let mut effects = Vec::new();
        refresh_or_insert(&mut effects, PowerupKind::SpeedBoost, spec(3000.0));
        // One second passes
        tick_effects(&mut effects, 1000.0);
        assert!((effects[0].remaining_ms - 2000.0).abs() < 1e-3);

        // Collected again: back to 3000, not 4000 or 6000
        refresh_or_insert(&mut effects, PowerupKind::SpeedBoost, spec(3000.0));
        assert_eq!(effects.len(), 1);
        assert!((effects[0].remaining_ms - 3000.0).abs() < 1e-3);
    }

    #[test]
    fn test_unique_per_kind() {
        let mut effects = Vec::new();
        refresh_or_insert(&mut effects, PowerupKind::Shield, spec(4000.0));
        refresh_or_insert(&mut effects, PowerupKind::Ghost, spec(3000.0));
        refresh_or_insert(&mut effects, PowerupKind::Shield, spec(4000.0));
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn test_expiry_order() {
        let mut effects = Vec::new();
        refresh_or_insert(&mut effects, PowerupKind::Shield, spec(500.0));
        refresh_or_insert(&mut effects, PowerupKind::Ghost, spec(2000.0));

        let expired = tick_effects(&mut effects, 600.0);
        assert_eq!(expired, vec![PowerupKind::Shield]);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind, PowerupKind::Ghost);

        let expired = tick_effects(&mut effects, 2000.0);
        assert_eq!(expired, vec![PowerupKind::Ghost]);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_kind_categories() {
        assert!(PowerupKind::Repair.is_instant());
        assert!(PowerupKind::OilSlick.is_held());
        assert!(!PowerupKind::SpeedBoost.is_instant());
        assert!(!PowerupKind::SpeedBoost.is_held());
    }
}
