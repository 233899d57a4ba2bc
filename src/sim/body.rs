//! Rigid-body motion model
//!
//! Per-entity integration of acceleration into velocity into position.
//! Forces are impulses-per-tick: acceleration is zeroed after each
//! integration step. Friction uses the exponential form
//! `v *= (1 - f)^dt` so deceleration is frame-rate independent.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::heading;

/// Physical state shared by every racer and obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Facing angle in radians
    pub rotation: f32,
    pub angular_velocity: f32,
    pub mass: f32,
    /// Baseline rolling friction in [0, 1)
    pub friction: f32,
    pub collider_radius: f32,
}

impl RigidBody {
    pub fn new(position: Vec2, rotation: f32, mass: f32, friction: f32, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            rotation,
            angular_velocity: 0.0,
            mass: if mass > 0.0 { mass } else { 1.0 },
            friction: friction.clamp(0.0, 0.99),
            collider_radius: radius,
        }
    }

    /// Advance the body by `dt` seconds, then apply friction and clear
    /// the per-tick acceleration.
    ///
    /// `extra_friction` is the terrain's contribution; both decays are
    /// applied as one combined exponential.
    pub fn integrate(&mut self, dt: f32, extra_friction: f32) {
        if !(dt > 0.0) {
            return;
        }
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
        self.rotation = crate::normalize_angle(self.rotation + self.angular_velocity * dt);

        let retention = (1.0 - self.friction) * (1.0 - extra_friction.clamp(0.0, 0.99));
        self.velocity *= retention.max(0.0).powf(dt);

        self.acceleration = Vec2::ZERO;
    }

    /// Accumulate a force for the next integration step
    pub fn apply_force(&mut self, force: Vec2) {
        let mass = if self.mass > 0.0 { self.mass } else { 1.0 };
        self.acceleration += force / mass;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Scale velocity down to exactly `max` if it exceeds it, preserving
    /// direction. Idempotent.
    pub fn limit_speed(&mut self, max: f32) {
        let speed = self.speed();
        if speed > max && speed > 0.0 {
            self.velocity *= max / speed;
        }
    }

    /// Unit vector the body is facing
    #[inline]
    pub fn heading(&self) -> Vec2 {
        heading(self.rotation)
    }

    /// Effective turn rate for the current speed and surface
    ///
    /// Racers steer sluggishly at low speed (floored at
    /// `min_speed_factor`) and lose steering authority on low-grip
    /// terrain.
    pub fn turn_rate(
        &self,
        base_turn_rate: f32,
        handling: f32,
        grip: f32,
        top_speed: f32,
        min_speed_factor: f32,
    ) -> f32 {
        let speed_factor = if top_speed > 0.0 {
            (self.speed() / top_speed).clamp(min_speed_factor, 1.0)
        } else {
            min_speed_factor
        };
        base_turn_rate * handling * grip * speed_factor
    }

    /// Damp the sideways component of velocity so the body tracks its
    /// heading. Grip scales the decay rate: on oil or ice the body keeps
    /// sliding.
    pub fn apply_lateral_grip(&mut self, grip_rate: f32, grip: f32, dt: f32) {
        if self.velocity.length_squared() < 1e-6 {
            return;
        }
        let forward = self.heading();
        let right = forward.perp();
        let forward_speed = self.velocity.dot(forward);
        let lateral_speed = self.velocity.dot(right);
        let damped = lateral_speed * (-grip_rate * grip * dt).exp();
        self.velocity = forward * forward_speed + right * damped;
    }
}
