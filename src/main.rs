//! Headless demo race
//!
//! Plays the role of the engine's external collaborators: builds (or
//! loads) a track, scripts four waypoint-following drivers, clamps the
//! frame delta, and logs the progression events the engine emits.
//!
//! Usage: `spud-circuit [track.json] [tuning.json]`

use std::error::Error;

use glam::Vec2;

use spud_circuit::consts::SIM_DT;
use spud_circuit::sim::track::{CheckpointDef, PowerupSpawnDef, TerrainPatch, PatchShape};
use spud_circuit::sim::{ControlInput, PowerupKind, RaceState, Racer, Track, TrackDef, tick};
use spud_circuit::tuning::{Terrain, Tuning};
use spud_circuit::normalize_angle;

/// Square ring track with an ice patch on the top straight and a few
/// item boxes
fn demo_track() -> TrackDef {
    let square = |half: f32| {
        vec![
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ]
    };
    TrackDef {
        name: "demo ring".into(),
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
        terrain_patches: vec![TerrainPatch {
            terrain: Terrain::Ice,
            shape: PatchShape::Rect {
                min: Vec2::new(-120.0, 200.0),
                max: Vec2::new(120.0, 400.0),
            },
        }],
        powerup_spawns: vec![
            PowerupSpawnDef { pos: Vec2::new(300.0, 150.0), kind: PowerupKind::SpeedBoost },
            PowerupSpawnDef { pos: Vec2::new(-300.0, 150.0), kind: PowerupKind::Shield },
            PowerupSpawnDef { pos: Vec2::new(-150.0, -300.0), kind: PowerupKind::OilSlick },
            PowerupSpawnDef { pos: Vec2::new(150.0, -300.0), kind: PowerupKind::Repair },
        ],
    }
}

/// Waypoint loop hugging the ring: gates plus the corner pockets
fn waypoints() -> Vec<Vec2> {
    vec![
        Vec2::new(300.0, 0.0),
        Vec2::new(300.0, 300.0),
        Vec2::new(0.0, 300.0),
        Vec2::new(-300.0, 300.0),
        Vec2::new(-300.0, 0.0),
        Vec2::new(-300.0, -300.0),
        Vec2::new(0.0, -300.0),
        Vec2::new(300.0, -300.0),
    ]
}

/// Steer toward the target, full throttle, deploy anything we hold
fn drive(racer: &Racer, target: Vec2) -> ControlInput {
    let to_target = target - racer.body.position;
    let delta = normalize_angle(to_target.to_angle() - racer.body.rotation);
    ControlInput {
        throttle: true,
        brake: false,
        steer_left: delta > 0.05,
        steer_right: delta < -0.05,
        use_item: racer.held_item.is_some(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let def = match args.next() {
        Some(path) => TrackDef::from_json(&std::fs::read_to_string(path)?)?,
        None => demo_track(),
    };
    let tuning = match args.next() {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };

    let track = Track::new(def)?;
    let mut state = RaceState::new(track, tuning, 4, 2);
    let points = waypoints();
    let mut next_waypoint = vec![0usize; state.racers.len()];

    log::info!("{}: {} racers, {} laps", state.track.name, state.racers.len(), state.total_laps);
    state.start();

    // Ten simulated minutes is more than any finisher needs
    let max_ticks = (600.0 / SIM_DT) as u32;
    for _ in 0..max_ticks {
        let inputs: Vec<ControlInput> = state
            .racers
            .iter()
            .enumerate()
            .map(|(i, racer)| drive(racer, points[next_waypoint[i]]))
            .collect();

        for event in tick(&mut state, &inputs, SIM_DT) {
            log::info!("{event:?}");
        }

        for (i, racer) in state.racers.iter().enumerate() {
            if (racer.body.position - points[next_waypoint[i]]).length() < 90.0 {
                next_waypoint[i] = (next_waypoint[i] + 1) % points.len();
            }
        }

        if state.all_finished() {
            break;
        }
    }

    println!("--- standings ---");
    for (place, idx) in state.standings().into_iter().enumerate() {
        let racer = &state.racers[idx];
        match racer.finish_time_ms {
            Some(ms) => println!(
                "{}. racer {idx}  {:.1}s  (best lap {:.1}s)",
                place + 1,
                ms / 1000.0,
                racer.best_lap_ms.unwrap_or(ms) / 1000.0,
            ),
            None => println!(
                "{}. racer {idx}  DNF (lap {}, gate {})",
                place + 1,
                racer.lap_count + 1,
                racer.checkpoint_index,
            ),
        }
    }
    Ok(())
}
