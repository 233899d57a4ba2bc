//! Checkpoint, lap, and finish progression
//!
//! Gates must be crossed strictly in sequence; out-of-order hits are
//! no-ops so cutting across the infield or driving backwards never
//! advances the race. Gate 0 doubles as the finish line: re-validating
//! it after a full cycle completes a lap.

use super::events::RaceEvent;
use super::racer::{Racer, RacerPhase};
use super::track::Track;
use crate::tuning::PhysicsTuning;

/// Advance one racer's progression from its post-resolution position
pub fn advance(
    idx: usize,
    racer: &mut Racer,
    track: &Track,
    total_laps: u32,
    elapsed_ms: f32,
    physics: &PhysicsTuning,
    events: &mut Vec<RaceEvent>,
) {
    if racer.phase != RacerPhase::Racing {
        return;
    }

    let Some((index, _is_finish)) =
        track.checkpoint_hit(racer.body.position, racer.effective_radius())
    else {
        return;
    };

    let gates = track.checkpoint_count();
    let expected = (racer.checkpoint_index + 1) % gates;
    if index != expected {
        // Out of sequence: ignored (anti-shortcut rule)
        return;
    }

    racer.checkpoint_index = index;
    events.push(RaceEvent::CheckpointPassed { racer: idx, index });
    log::debug!("racer {idx} passed gate {index}");

    if index == 0 {
        racer.lap_count += 1;
        let lap_time_ms = elapsed_ms - racer.lap_start_ms;
        racer.lap_start_ms = elapsed_ms;
        let best = racer.best_lap_ms.map(|b| lap_time_ms < b).unwrap_or(true);
        if best {
            racer.best_lap_ms = Some(lap_time_ms);
        }
        racer.heal(physics.lap_health_bonus);
        events.push(RaceEvent::LapCompleted {
            racer: idx,
            lap: racer.lap_count,
            lap_time_ms,
        });
        log::debug!("racer {idx} completed lap {}", racer.lap_count);

        if racer.lap_count >= total_laps {
            racer.phase = RacerPhase::Finished;
            racer.finish_time_ms = Some(elapsed_ms);
            events.push(RaceEvent::RaceFinished {
                racer: idx,
                finish_time_ms: elapsed_ms,
            });
        }
    }
}
