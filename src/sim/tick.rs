//! Per-frame race orchestration
//!
//! One `tick` call advances every racer in a strict order: control and
//! motion integration first, then boundary collisions, then racer-racer
//! collisions against the integrated positions, then pickups and item
//! deploys, effect timers, and finally checkpoint/lap progression
//! against the post-resolution positions. Nothing in here can fail: a
//! degraded result for one racer never blocks the others.

use serde::{Deserialize, Serialize};

use super::collision::{circle_circle, resolve_boundary, resolve_pair};
use super::events::RaceEvent;
use super::powerup::PowerupKind;
use super::progress;
use super::racer::{ControlInput, Racer, RacerPhase};
use super::track::{PatchShape, TerrainPatch, Track};
use crate::consts::{MAX_TICK_DT, PICKUP_RADIUS};
use crate::tuning::{Terrain, Tuning};

/// Global race phase, driven by the external scene controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Grid is frozen: bodies integrate but control input is ignored
    Countdown,
    Racing,
}

/// Complete race state (serializable so renderers can snapshot it)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceState {
    pub track: Track,
    pub tuning: Tuning,
    pub racers: Vec<Racer>,
    pub phase: RacePhase,
    pub total_laps: u32,
    /// Race clock; accrues only while racing
    pub elapsed_ms: f32,
}

impl RaceState {
    /// Place up to four racers on the start grid. The tuning table is
    /// sanitized here so invalid configuration never reaches the tick
    /// loop.
    pub fn new(track: Track, tuning: Tuning, racer_count: usize, total_laps: u32) -> Self {
        let tuning = tuning.sanitized();
        let racers = track
            .start_slots(racer_count)
            .into_iter()
            .map(|(pos, angle)| Racer::new(pos, angle, &tuning.racer))
            .collect();
        Self {
            track,
            tuning,
            racers,
            phase: RacePhase::Countdown,
            total_laps: total_laps.max(1),
            elapsed_ms: 0.0,
        }
    }

    /// Race-start signal: the countdown elapsed
    pub fn start(&mut self) {
        self.phase = RacePhase::Racing;
        for racer in &mut self.racers {
            if racer.phase == RacerPhase::Idle {
                racer.phase = RacerPhase::Racing;
            }
        }
    }

    pub fn all_finished(&self) -> bool {
        self.racers.iter().all(|r| r.is_finished())
    }

    /// Racer indices ordered by race position: finishers by finish time,
    /// then everyone else by laps and gates completed
    pub fn standings(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.racers.len()).collect();
        order.sort_by(|&a, &b| {
            let ra = &self.racers[a];
            let rb = &self.racers[b];
            match (ra.finish_time_ms, rb.finish_time_ms) {
                (Some(ta), Some(tb)) => ta.total_cmp(&tb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => rb
                    .lap_count
                    .cmp(&ra.lap_count)
                    .then(rb.checkpoint_index.cmp(&ra.checkpoint_index)),
            }
        });
        order
    }
}

/// Advance the race by `dt` seconds of simulated time
///
/// `inputs` is indexed by racer; missing entries read as no input.
/// Returns the progression events of this tick in occurrence order.
pub fn tick(state: &mut RaceState, inputs: &[ControlInput], dt: f32) -> Vec<RaceEvent> {
    // Callers clamp frame hitches upstream; clamp again so a stall can
    // never tunnel a racer through a wall
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_TICK_DT)
    } else {
        0.0
    };
    let mut events = Vec::new();
    if dt <= 0.0 {
        return events;
    }
    let dt_ms = dt * 1000.0;
    let racing = state.phase == RacePhase::Racing;
    if racing {
        state.elapsed_ms += dt_ms;
    }

    let physics = state.tuning.physics.clone();

    // 1. Control and motion integration
    for (i, racer) in state.racers.iter_mut().enumerate() {
        let input = inputs.get(i).copied().unwrap_or_default();
        let terrain = state
            .track
            .terrain_at(racer.body.position, &state.tuning.terrain);
        let boost = racer.boost_multiplier();
        let driving = racing && racer.phase == RacerPhase::Racing;

        if driving {
            let steer = match (input.steer_left, input.steer_right) {
                (true, false) => 1.0,
                (false, true) => -1.0,
                _ => 0.0,
            };
            racer.body.angular_velocity = steer
                * racer.body.turn_rate(
                    physics.base_turn_rate,
                    racer.handling,
                    terrain.grip,
                    racer.top_speed,
                    physics.min_speed_factor,
                );
            if input.throttle {
                let force = racer.body.heading() * (racer.accel_rate * boost * racer.body.mass);
                racer.body.apply_force(force);
            }
        } else {
            racer.body.angular_velocity = 0.0;
        }

        racer.body.integrate(dt, terrain.friction);
        if driving && input.brake {
            racer.body.velocity *= (-physics.brake_rate * dt).exp();
        }
        racer
            .body
            .apply_lateral_grip(physics.lateral_grip_rate, terrain.grip, dt);
        racer.body.limit_speed(racer.top_speed * boost);
    }

    // 2. Boundary collisions: walls are infinite mass, only the racer
    // moves
    for (i, racer) in state.racers.iter_mut().enumerate() {
        let Some(hit) = state
            .track
            .boundary_collision(racer.body.position, racer.effective_radius())
        else {
            continue;
        };
        let impact = resolve_boundary(
            &mut racer.body,
            &hit,
            physics.wall_bounce,
            physics.wall_energy_retention,
        );
        if impact > 0.0 {
            let damage = impact * physics.damage_scale;
            racer.apply_damage(damage);
            events.push(RaceEvent::CollisionOccurred {
                a: i,
                b: None,
                damage,
            });
        }
    }

    // 3. Racer-racer collisions on the integrated positions. Ghosts
    // pass through.
    for a in 0..state.racers.len() {
        for b in (a + 1)..state.racers.len() {
            if state.racers[a].is_ghost() || state.racers[b].is_ghost() {
                continue;
            }
            let (left, right) = state.racers.split_at_mut(b);
            let ra = &mut left[a];
            let rb = &mut right[0];
            let Some(hit) = circle_circle(
                ra.body.position,
                ra.effective_radius(),
                rb.body.position,
                rb.effective_radius(),
            ) else {
                continue;
            };
            let impact = resolve_pair(
                &mut ra.body,
                &mut rb.body,
                &hit,
                physics.restitution,
                physics.position_correction,
            );
            if impact > 0.0 {
                let damage = impact * physics.damage_scale;
                ra.apply_damage(damage);
                rb.apply_damage(damage);
                events.push(RaceEvent::CollisionOccurred {
                    a,
                    b: Some(b),
                    damage,
                });
            }
        }
    }

    if racing {
        // 4. Pickups and held-item deploys
        for (i, racer) in state.racers.iter_mut().enumerate() {
            for spawn in state.track.powerup_spawns.iter_mut() {
                if !spawn.is_available() {
                    continue;
                }
                let reach = PICKUP_RADIUS + racer.effective_radius();
                if (racer.body.position - spawn.pos).length() < reach {
                    racer.collect(spawn.kind, &state.tuning.powerups);
                    spawn.respawn_remaining_ms = state.tuning.powerups.spec(spawn.kind).respawn_ms;
                    events.push(RaceEvent::PowerupCollected {
                        racer: i,
                        kind: spawn.kind,
                    });
                }
            }
        }
        for i in 0..state.racers.len() {
            let input = inputs.get(i).copied().unwrap_or_default();
            let racer = &state.racers[i];
            if input.use_item
                && racer.phase == RacerPhase::Racing
                && racer.held_item == Some(PowerupKind::OilSlick)
            {
                let radius = state.tuning.powerups.spec(PowerupKind::OilSlick).strength;
                let behind = racer.body.position
                    - racer.body.heading() * (racer.effective_radius() + radius);
                state.track.deploy_patch(TerrainPatch {
                    terrain: Terrain::Oil,
                    shape: PatchShape::Circle {
                        center: behind,
                        radius,
                    },
                });
                state.racers[i].held_item = None;
                log::debug!("racer {i} deployed an oil slick");
            }
        }

        // 5. Effect timers
        for (i, racer) in state.racers.iter_mut().enumerate() {
            for kind in racer.tick_effects(dt_ms) {
                events.push(RaceEvent::PowerupExpired { racer: i, kind });
            }
        }

        // 6. Progression on post-resolution positions
        for (i, racer) in state.racers.iter_mut().enumerate() {
            progress::advance(
                i,
                racer,
                &state.track,
                state.total_laps,
                state.elapsed_ms,
                &physics,
                &mut events,
            );
        }

        // 7. Pickup respawn countdowns
        for spawn in state.track.powerup_spawns.iter_mut() {
            if spawn.respawn_remaining_ms > 0.0 {
                spawn.respawn_remaining_ms = (spawn.respawn_remaining_ms - dt_ms).max(0.0);
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::track::{CheckpointDef, PowerupSpawnDef, TrackDef};
    use glam::Vec2;

    fn square(half: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ]
    }

    fn ring_def() -> TrackDef {
        TrackDef {
            name: "ring".into(),
            outer_boundary: square(400.0),
            inner_boundary: square(200.0),
            checkpoints: vec![
                CheckpointDef { pos: Vec2::new(300.0, 0.0), angle: std::f32::consts::FRAC_PI_2, width: 200.0 },
                CheckpointDef { pos: Vec2::new(0.0, 300.0), angle: std::f32::consts::PI, width: 200.0 },
                CheckpointDef { pos: Vec2::new(-300.0, 0.0), angle: -std::f32::consts::FRAC_PI_2, width: 200.0 },
                CheckpointDef { pos: Vec2::new(0.0, -300.0), angle: 0.0, width: 200.0 },
            ],
            start_position: Vec2::new(300.0, -40.0),
            start_angle: std::f32::consts::FRAC_PI_2,
            terrain_patches: Vec::new(),
            powerup_spawns: Vec::new(),
        }
    }

    fn race(racers: usize) -> RaceState {
        let track = Track::new(ring_def()).unwrap();
        RaceState::new(track, Tuning::default(), racers, 3)
    }

    fn throttle() -> ControlInput {
        ControlInput {
            throttle: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_grid_is_frozen_until_start() {
        let mut state = race(1);
        let start_pos = state.racers[0].body.position;

        for _ in 0..30 {
            tick(&mut state, &[throttle()], SIM_DT);
        }
        assert_eq!(state.racers[0].body.position, start_pos);
        assert_eq!(state.elapsed_ms, 0.0);

        state.start();
        for _ in 0..30 {
            tick(&mut state, &[throttle()], SIM_DT);
        }
        assert!(state.racers[0].body.position.y > start_pos.y);
        assert!(state.elapsed_ms > 0.0);
    }

    #[test]
    fn test_nonfinite_and_oversized_dt() {
        let mut state = race(1);
        state.start();

        assert!(tick(&mut state, &[throttle()], f32::NAN).is_empty());
        assert_eq!(state.elapsed_ms, 0.0);

        tick(&mut state, &[throttle()], 10.0);
        // Clamped to MAX_TICK_DT
        assert!((state.elapsed_ms - MAX_TICK_DT * 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_wall_hit_reflects_and_damages() {
        let mut state = race(1);
        state.start();
        let racer = &mut state.racers[0];
        racer.body.position = Vec2::new(370.0, 100.0);
        racer.body.velocity = Vec2::new(300.0, 0.0);
        racer.body.rotation = 0.0;

        let mut hit_wall = false;
        for _ in 0..30 {
            let events = tick(&mut state, &[ControlInput::default()], SIM_DT);
            if let Some(RaceEvent::CollisionOccurred { a: 0, b: None, damage }) =
                events.first().copied()
            {
                assert!(damage > 0.0);
                hit_wall = true;
                break;
            }
        }
        assert!(hit_wall);
        let racer = &state.racers[0];
        assert!(racer.body.velocity.x < 0.0, "velocity should reflect");
        assert!(racer.health < 100.0);
        assert!(racer.body.position.x < 400.0 - racer.body.collider_radius + 1.0);
    }

    #[test]
    fn test_head_on_collision_emits_event_and_separates() {
        let mut state = race(2);
        state.start();
        state.racers[0].body.position = Vec2::new(280.0, 100.0);
        state.racers[0].body.velocity = Vec2::new(0.0, 120.0);
        state.racers[1].body.position = Vec2::new(280.0, 140.0);
        state.racers[1].body.velocity = Vec2::new(0.0, -120.0);

        let events = tick(&mut state, &[ControlInput::default(); 2], SIM_DT);
        assert!(events.iter().any(|e| matches!(
            e,
            RaceEvent::CollisionOccurred { a: 0, b: Some(1), .. }
        )));
        // Separating after resolution
        let rel = state.racers[1].body.velocity.y - state.racers[0].body.velocity.y;
        assert!(rel > 0.0);
        assert!(state.racers[0].health < 100.0);
        assert!(state.racers[1].health < 100.0);
    }

    #[test]
    fn test_ghost_passes_through() {
        let mut state = race(2);
        state.start();
        state.racers[0].collect(PowerupKind::Ghost, &Tuning::default().powerups);
        state.racers[0].body.position = Vec2::new(280.0, 100.0);
        state.racers[0].body.velocity = Vec2::new(0.0, 120.0);
        state.racers[1].body.position = Vec2::new(280.0, 140.0);
        state.racers[1].body.velocity = Vec2::new(0.0, -120.0);

        let events = tick(&mut state, &[ControlInput::default(); 2], SIM_DT);
        assert!(!events.iter().any(|e| matches!(
            e,
            RaceEvent::CollisionOccurred { b: Some(_), .. }
        )));
    }

    #[test]
    fn test_pickup_collect_refresh_and_respawn() {
        let mut def = ring_def();
        def.powerup_spawns = vec![PowerupSpawnDef {
            pos: Vec2::new(300.0, -40.0),
            kind: PowerupKind::SpeedBoost,
        }];
        let track = Track::new(def).unwrap();
        let mut state = RaceState::new(track, Tuning::default(), 1, 3);
        state.start();
        // Park the racer on the spawn point
        state.racers[0].body.position = Vec2::new(300.0, -40.0);

        let events = tick(&mut state, &[ControlInput::default()], SIM_DT);
        assert!(events.contains(&RaceEvent::PowerupCollected {
            racer: 0,
            kind: PowerupKind::SpeedBoost
        }));
        assert_eq!(state.racers[0].active_effects.len(), 1);
        assert!(!state.track.powerup_spawns[0].is_available());

        // Unavailable until the respawn delay elapses
        let events = tick(&mut state, &[ControlInput::default()], SIM_DT);
        assert!(!events.iter().any(|e| matches!(e, RaceEvent::PowerupCollected { .. })));

        // 5s respawn at default tuning; effect expires first and the
        // racer picks the respawned one up again
        let mut collected_again = false;
        let mut expired = false;
        for _ in 0..400 {
            let events = tick(&mut state, &[ControlInput::default()], SIM_DT);
            expired |= events.contains(&RaceEvent::PowerupExpired {
                racer: 0,
                kind: PowerupKind::SpeedBoost,
            });
            if events.contains(&RaceEvent::PowerupCollected {
                racer: 0,
                kind: PowerupKind::SpeedBoost,
            }) {
                collected_again = true;
                break;
            }
        }
        assert!(expired);
        assert!(collected_again);
    }

    #[test]
    fn test_oil_slick_deploy() {
        let mut state = race(1);
        state.start();
        state.racers[0].collect(PowerupKind::OilSlick, &Tuning::default().powerups);
        assert_eq!(state.racers[0].held_item, Some(PowerupKind::OilSlick));
        let before = state.track.terrain_patch_count();

        let input = ControlInput {
            use_item: true,
            ..Default::default()
        };
        tick(&mut state, &[input], SIM_DT);

        assert_eq!(state.racers[0].held_item, None);
        assert_eq!(state.track.terrain_patch_count(), before + 1);

        // The slick lands behind the racer
        let racer = &state.racers[0];
        let behind = racer.body.position - racer.body.heading() * 50.0;
        assert_eq!(state.track.terrain_kind_at(behind), Terrain::Oil);
    }

    #[test]
    fn test_boost_raises_speed_cap() {
        let mut state = race(1);
        state.start();
        let top = state.racers[0].top_speed;

        for _ in 0..600 {
            tick(&mut state, &[throttle()], SIM_DT);
            // Keep it on the straight so we only measure the cap
            state.racers[0].body.position = Vec2::new(300.0, 0.0);
        }
        let plain_speed = state.racers[0].body.speed();
        assert!(plain_speed <= top + 1e-3);

        state.racers[0].collect(PowerupKind::SpeedBoost, &Tuning::default().powerups);
        for _ in 0..120 {
            tick(&mut state, &[throttle()], SIM_DT);
            state.racers[0].body.position = Vec2::new(300.0, 0.0);
        }
        assert!(state.racers[0].body.speed() > top);
    }

    #[test]
    fn test_standings_order() {
        let mut state = race(3);
        state.start();
        state.racers[0].lap_count = 1;
        state.racers[0].checkpoint_index = 2;
        state.racers[1].finish_time_ms = Some(90_000.0);
        state.racers[2].lap_count = 2;

        assert_eq!(state.standings(), vec![1, 2, 0]);
    }
}
