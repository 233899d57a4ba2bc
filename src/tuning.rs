//! Data-driven physics and balance tables
//!
//! One immutable [`Tuning`] value is handed to the engine at
//! construction. It replaces scattered per-call configuration lookups:
//! every constant the simulation consults lives here, deserializable
//! from JSON so balance can be tweaked without a rebuild.

use serde::{Deserialize, Serialize};

use crate::sim::powerup::PowerupKind;

/// Fallback effect duration when a table entry is invalid (ms)
pub const FALLBACK_DURATION_MS: f32 = 3000.0;

/// Terrain kinds the track can be painted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Asphalt,
    Grass,
    Dirt,
    Sand,
    Ice,
    Oil,
}

/// Friction/grip sample for a point on the track
///
/// `color_hint` is consumed only by rendering layers; the simulation
/// itself ignores it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TerrainSample {
    /// Rolling friction coefficient in [0, 1); applied as exponential
    /// decay `(1 - friction)^dt`
    pub friction: f32,
    /// Turn-rate and lateral-grip multiplier (1.0 = full grip)
    pub grip: f32,
    /// Packed RGB rendering hint
    pub color_hint: u32,
}

/// Per-terrain samples, indexed by [`Terrain`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainTable {
    pub asphalt: TerrainSample,
    pub grass: TerrainSample,
    pub dirt: TerrainSample,
    pub sand: TerrainSample,
    pub ice: TerrainSample,
    pub oil: TerrainSample,
}

impl TerrainTable {
    pub fn sample(&self, terrain: Terrain) -> TerrainSample {
        match terrain {
            Terrain::Asphalt => self.asphalt,
            Terrain::Grass => self.grass,
            Terrain::Dirt => self.dirt,
            Terrain::Sand => self.sand,
            Terrain::Ice => self.ice,
            Terrain::Oil => self.oil,
        }
    }
}

impl Default for TerrainTable {
    fn default() -> Self {
        Self {
            asphalt: TerrainSample { friction: 0.0, grip: 1.0, color_hint: 0x3a3a3a },
            grass: TerrainSample { friction: 0.65, grip: 0.7, color_hint: 0x3f9b42 },
            dirt: TerrainSample { friction: 0.35, grip: 0.8, color_hint: 0x8a6a3b },
            sand: TerrainSample { friction: 0.75, grip: 0.6, color_hint: 0xd9c27e },
            ice: TerrainSample { friction: 0.05, grip: 0.25, color_hint: 0xbfe8ff },
            oil: TerrainSample { friction: 0.02, grip: 0.1, color_hint: 0x1a1a22 },
        }
    }
}

/// Static definition of one power-up kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerupSpec {
    /// Effect duration in ms (ignored for instant and held kinds)
    pub duration_ms: f32,
    /// Kind-specific strength: speed/size multiplier, heal amount, or
    /// deployed patch radius
    pub strength: f32,
    /// Spawn-point respawn delay after collection (ms)
    pub respawn_ms: f32,
}

/// Per-kind power-up specs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupTable {
    pub speed_boost: PowerupSpec,
    pub shield: PowerupSpec,
    pub ghost: PowerupSpec,
    pub oil_slick: PowerupSpec,
    pub size_reduction: PowerupSpec,
    pub repair: PowerupSpec,
}

impl PowerupTable {
    pub fn spec(&self, kind: PowerupKind) -> PowerupSpec {
        let spec = match kind {
            PowerupKind::SpeedBoost => self.speed_boost,
            PowerupKind::Shield => self.shield,
            PowerupKind::Ghost => self.ghost,
            PowerupKind::OilSlick => self.oil_slick,
            PowerupKind::SizeReduction => self.size_reduction,
            PowerupKind::Repair => self.repair,
        };
        if !spec.duration_ms.is_finite() || spec.duration_ms < 0.0 {
            log::warn!("invalid duration for {kind:?}, using fallback");
            return PowerupSpec {
                duration_ms: FALLBACK_DURATION_MS,
                ..spec
            };
        }
        spec
    }
}

impl Default for PowerupTable {
    fn default() -> Self {
        Self {
            speed_boost: PowerupSpec { duration_ms: 3000.0, strength: 1.5, respawn_ms: 5000.0 },
            shield: PowerupSpec { duration_ms: 4000.0, strength: 1.0, respawn_ms: 8000.0 },
            ghost: PowerupSpec { duration_ms: 3000.0, strength: 1.0, respawn_ms: 10000.0 },
            oil_slick: PowerupSpec { duration_ms: 0.0, strength: 40.0, respawn_ms: 7000.0 },
            size_reduction: PowerupSpec { duration_ms: 5000.0, strength: 0.5, respawn_ms: 9000.0 },
            repair: PowerupSpec { duration_ms: 0.0, strength: 25.0, respawn_ms: 12000.0 },
        }
    }
}

/// Physics constants shared by every racer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Base turn rate at full grip and speed factor 1.0 (radians/sec)
    pub base_turn_rate: f32,
    /// Steering effectiveness floor at low speed
    pub min_speed_factor: f32,
    /// Exponential decay rate for lateral (sideways) velocity at grip 1.0
    pub lateral_grip_rate: f32,
    /// Exponential decay rate applied to velocity while braking
    pub brake_rate: f32,
    /// Restitution for racer-racer impulse resolution
    pub restitution: f32,
    /// Velocity reflection scale on wall contact
    pub wall_bounce: f32,
    /// Energy retained after a wall hit
    pub wall_energy_retention: f32,
    /// Fraction of penetration removed per resolution, damped to avoid
    /// jitter
    pub position_correction: f32,
    /// Damage per unit of relative collision speed
    pub damage_scale: f32,
    /// Health restored on lap completion
    pub lap_health_bonus: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            base_turn_rate: 3.0,
            min_speed_factor: 0.3,
            lateral_grip_rate: 8.0,
            brake_rate: 2.5,
            restitution: 0.5,
            wall_bounce: 1.0,
            wall_energy_retention: 0.8,
            position_correction: 0.2,
            damage_scale: 0.02,
            lap_health_bonus: 15.0,
        }
    }
}

/// Stats stamped onto each racer at race start
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RacerTuning {
    pub mass: f32,
    pub collider_radius: f32,
    /// Baseline rolling friction in [0, 1), combined with the terrain's
    pub friction: f32,
    pub top_speed: f32,
    pub accel_rate: f32,
    /// Turn-rate multiplier
    pub handling: f32,
}

impl Default for RacerTuning {
    fn default() -> Self {
        Self {
            mass: 100.0,
            collider_radius: 24.0,
            friction: 0.4,
            top_speed: 400.0,
            accel_rate: 600.0,
            handling: 1.0,
        }
    }
}

/// Complete balance configuration for a race
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub racer: RacerTuning,
    pub terrain: TerrainTable,
    pub powerups: PowerupTable,
}

impl Tuning {
    /// Parse a tuning table from JSON, falling back to defaults for any
    /// omitted section
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Clamp out-of-range values to safe ones, logging each repair.
    /// Invalid configuration never reaches the tick loop.
    pub fn sanitized(mut self) -> Self {
        if !(self.racer.mass > 0.0) || !self.racer.mass.is_finite() {
            log::warn!("non-positive racer mass {}, using 1.0", self.racer.mass);
            self.racer.mass = 1.0;
        }
        if !(self.racer.collider_radius > 0.0) || !self.racer.collider_radius.is_finite() {
            log::warn!("invalid collider radius, using 1.0");
            self.racer.collider_radius = 1.0;
        }
        if !(0.0..1.0).contains(&self.racer.friction) {
            log::warn!("friction {} outside [0,1), clamping", self.racer.friction);
            self.racer.friction = self.racer.friction.clamp(0.0, 0.99);
        }
        self
    }
}
