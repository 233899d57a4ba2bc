//! Track geometry: boundaries, checkpoints, terrain patches, pickups
//!
//! A track is the annular region between a closed outer and a closed
//! inner polygon. Both are converted to segment lists once at
//! construction; checkpoints become gate segments; terrain patches are
//! tested in authoring order, first match wins. The authoring format is
//! plain JSON via serde.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, CollisionResult};
use super::geometry::{point_in_polygon, point_segment_distance};
use super::powerup::PowerupKind;
use crate::consts::{GRID_SLOT_SPACING, GRID_SLOTS};
use crate::heading;
use crate::tuning::{Terrain, TerrainSample, TerrainTable};

/// One precomputed boundary or gate segment
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

/// Authored checkpoint: a gate centered at `pos`, facing `angle`
/// (direction of travel), spanning `width` across the track
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CheckpointDef {
    pub pos: Vec2,
    pub angle: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Checkpoint {
    pub pos: Vec2,
    pub hitbox: Segment,
}

/// Shape of a terrain patch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PatchShape {
    Circle { center: Vec2, radius: f32 },
    Rect { min: Vec2, max: Vec2 },
    Polygon { points: Vec<Vec2> },
}

/// A localized friction/grip override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainPatch {
    pub terrain: Terrain,
    #[serde(flatten)]
    pub shape: PatchShape,
}

impl TerrainPatch {
    pub fn contains(&self, p: Vec2) -> bool {
        if !p.is_finite() {
            return false;
        }
        match &self.shape {
            PatchShape::Circle { center, radius } => (p - *center).length() < *radius,
            PatchShape::Rect { min, max } => {
                p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
            }
            PatchShape::Polygon { points } => point_in_polygon(p, points),
        }
    }
}

/// Authored power-up spawn point
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerupSpawnDef {
    pub pos: Vec2,
    pub kind: PowerupKind,
}

/// Runtime spawn point with its respawn countdown
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerupSpawn {
    pub pos: Vec2,
    pub kind: PowerupKind,
    /// 0 when the pickup is available
    pub respawn_remaining_ms: f32,
}

impl PowerupSpawn {
    pub fn is_available(&self) -> bool {
        self.respawn_remaining_ms <= 0.0
    }
}

/// Track authoring format (consumed, not produced, by the engine)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackDef {
    #[serde(default)]
    pub name: String,
    pub outer_boundary: Vec<Vec2>,
    pub inner_boundary: Vec<Vec2>,
    pub checkpoints: Vec<CheckpointDef>,
    pub start_position: Vec2,
    pub start_angle: f32,
    #[serde(default)]
    pub terrain_patches: Vec<TerrainPatch>,
    #[serde(default)]
    pub powerup_spawns: Vec<PowerupSpawnDef>,
}

impl TrackDef {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Construction-time validation failures. Malformed authoring data fails
/// fast here so the tick loop never sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    DegenerateBoundary { which: &'static str, points: usize },
    NonFiniteBoundary { which: &'static str },
    NoCheckpoints,
    InvalidCheckpoint(usize),
    NonFiniteStart,
}

impl std::fmt::Display for TrackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackError::DegenerateBoundary { which, points } => {
                write!(f, "{which} boundary has {points} points, need at least 3")
            }
            TrackError::NonFiniteBoundary { which } => {
                write!(f, "{which} boundary contains non-finite coordinates")
            }
            TrackError::NoCheckpoints => write!(f, "track has no checkpoints"),
            TrackError::InvalidCheckpoint(i) => {
                write!(f, "checkpoint {i} has a non-positive or non-finite width")
            }
            TrackError::NonFiniteStart => write!(f, "start position/angle is non-finite"),
        }
    }
}

impl std::error::Error for TrackError {}

/// Validated, query-ready track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    outer_boundary: Vec<Vec2>,
    inner_boundary: Vec<Vec2>,
    /// Inner + outer boundary segments, precomputed once
    segments: Vec<Segment>,
    checkpoints: Vec<Checkpoint>,
    terrain_patches: Vec<TerrainPatch>,
    pub powerup_spawns: Vec<PowerupSpawn>,
    start_position: Vec2,
    start_angle: f32,
}

fn polygon_segments(polygon: &[Vec2], out: &mut Vec<Segment>) {
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        out.push(Segment { a, b });
    }
}

fn validate_boundary(which: &'static str, polygon: &[Vec2]) -> Result<(), TrackError> {
    if polygon.len() < 3 {
        return Err(TrackError::DegenerateBoundary {
            which,
            points: polygon.len(),
        });
    }
    if polygon.iter().any(|p| !p.is_finite()) {
        return Err(TrackError::NonFiniteBoundary { which });
    }
    Ok(())
}

impl Track {
    pub fn new(def: TrackDef) -> Result<Self, TrackError> {
        validate_boundary("outer", &def.outer_boundary)?;
        validate_boundary("inner", &def.inner_boundary)?;
        if def.checkpoints.is_empty() {
            return Err(TrackError::NoCheckpoints);
        }
        for (i, cp) in def.checkpoints.iter().enumerate() {
            let ok = cp.pos.is_finite() && cp.angle.is_finite() && cp.width > 0.0 && cp.width.is_finite();
            if !ok {
                return Err(TrackError::InvalidCheckpoint(i));
            }
        }
        if !def.start_position.is_finite() || !def.start_angle.is_finite() {
            return Err(TrackError::NonFiniteStart);
        }

        let mut segments = Vec::with_capacity(def.outer_boundary.len() + def.inner_boundary.len());
        polygon_segments(&def.outer_boundary, &mut segments);
        polygon_segments(&def.inner_boundary, &mut segments);

        // Gate line runs across the track, perpendicular to travel
        let checkpoints = def
            .checkpoints
            .iter()
            .map(|cp| {
                let across = heading(cp.angle).perp();
                Checkpoint {
                    pos: cp.pos,
                    hitbox: Segment {
                        a: cp.pos - across * (cp.width / 2.0),
                        b: cp.pos + across * (cp.width / 2.0),
                    },
                }
            })
            .collect();

        let powerup_spawns = def
            .powerup_spawns
            .iter()
            .map(|s| PowerupSpawn {
                pos: s.pos,
                kind: s.kind,
                respawn_remaining_ms: 0.0,
            })
            .collect();

        Ok(Self {
            name: def.name,
            outer_boundary: def.outer_boundary,
            inner_boundary: def.inner_boundary,
            segments,
            checkpoints,
            terrain_patches: def.terrain_patches,
            powerup_spawns,
            start_position: def.start_position,
            start_angle: def.start_angle,
        })
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// The drivable surface is the annulus between the boundaries.
    /// Non-finite points are out of bounds; a malformed outer boundary
    /// fails closed to "inside" so one bad polygon can't wall off the
    /// whole race.
    pub fn is_point_outside(&self, p: Vec2) -> bool {
        if !p.is_finite() {
            return true;
        }
        if self.outer_boundary.len() < 3 {
            log::warn!("degenerate outer boundary, treating track as unbounded");
            return false;
        }
        !point_in_polygon(p, &self.outer_boundary) || point_in_polygon(p, &self.inner_boundary)
    }

    /// Terrain kind under a point: grass off the annulus, otherwise the
    /// first matching patch in authoring order, otherwise asphalt
    pub fn terrain_kind_at(&self, p: Vec2) -> Terrain {
        if self.is_point_outside(p) {
            return Terrain::Grass;
        }
        self.terrain_patches
            .iter()
            .find(|patch| patch.contains(p))
            .map(|patch| patch.terrain)
            .unwrap_or(Terrain::Asphalt)
    }

    pub fn terrain_at(&self, p: Vec2, table: &TerrainTable) -> TerrainSample {
        table.sample(self.terrain_kind_at(p))
    }

    /// Deepest-penetration collision against all boundary segments.
    /// First found wins ties.
    pub fn boundary_collision(&self, center: Vec2, radius: f32) -> Option<CollisionResult> {
        let mut deepest: Option<CollisionResult> = None;
        for seg in &self.segments {
            if let Some(hit) = collision::circle_segment(center, radius, seg.a, seg.b) {
                let deeper = deepest.map(|d| hit.overlap > d.overlap).unwrap_or(true);
                if deeper {
                    deepest = Some(hit);
                }
            }
        }
        deepest
    }

    /// Checkpoint whose gate line is within `radius` of the point,
    /// with whether it is the finish line (index 0)
    pub fn checkpoint_hit(&self, p: Vec2, radius: f32) -> Option<(usize, bool)> {
        if !p.is_finite() {
            return None;
        }
        self.checkpoints.iter().enumerate().find_map(|(i, cp)| {
            (point_segment_distance(cp.hitbox.a, cp.hitbox.b, p) < radius).then_some((i, i == 0))
        })
    }

    /// Append a runtime terrain patch (oil-slick deploy). Later patches
    /// never shadow authored ones: first match in list order wins.
    pub fn deploy_patch(&mut self, patch: TerrainPatch) {
        self.terrain_patches.push(patch);
    }

    pub fn terrain_patch_count(&self) -> usize {
        self.terrain_patches.len()
    }

    /// Start grid: two columns behind the start position, facing the
    /// start angle
    pub fn start_slots(&self, count: usize) -> Vec<(Vec2, f32)> {
        let forward = heading(self.start_angle);
        let right = forward.perp();
        (0..count.min(GRID_SLOTS))
            .map(|i| {
                let row = (i / 2) as f32;
                let col = (i % 2) as f32;
                let pos = self.start_position + right * ((col - 0.5) * GRID_SLOT_SPACING)
                    - forward * (row * GRID_SLOT_SPACING);
                (pos, self.start_angle)
            })
            .collect()
    }
}
