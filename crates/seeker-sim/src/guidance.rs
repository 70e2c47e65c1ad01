//! Steering math for seeking missiles.
//!
//! Pure functions over plain kinematic state. The heading turns at a bounded
//! rate toward the line of sight, and the velocity eases toward the pursuit
//! velocity with a first-order lag that does not depend on frame length.

use std::f64::consts::{PI, TAU};

use glam::DVec2;

use seeker_core::constants::{MIN_STEER_DISTANCE, VELOCITY_SMOOTHING_RATE};

/// Kinematic state owned by one guidance unit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringState {
    pub position: DVec2,
    pub velocity: DVec2,
    /// Radians, 0 = +x, counter-clockwise.
    pub heading: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringParams {
    /// Cruise speed (units/s).
    pub speed: f64,
    /// Maximum heading change (rad/s).
    pub turn_rate: f64,
}

/// Advance `state` by `dt` while pursuing a target at `target`.
pub fn steer_toward(state: &mut SteeringState, target: DVec2, params: &SteeringParams, dt: f64) {
    let to_target = target - state.position;
    let distance = to_target.length();

    if distance > MIN_STEER_DISTANCE {
        let direction = to_target / distance;
        let desired_velocity = direction * params.speed;
        let desired_heading = direction.y.atan2(direction.x);

        state.heading = turn_toward(state.heading, desired_heading, params.turn_rate * dt);
        state.velocity = state.velocity.lerp(desired_velocity, smoothing_factor(dt));
    }

    state.position += state.velocity * dt;
}

/// Advance `state` by `dt` with no target: keep flying on the current velocity.
pub fn coast(state: &mut SteeringState, dt: f64) {
    state.position += state.velocity * dt;
}

/// Rotate `current` toward `desired` by at most `max_step` radians, taking
/// the shorter way round. Result is wrapped into (-PI, PI].
pub fn turn_toward(current: f64, desired: f64, max_step: f64) -> f64 {
    let delta = wrap_angle(desired - current);
    let step = delta.clamp(-max_step.abs(), max_step.abs());
    wrap_angle(current + step)
}

/// Wrap an angle into (-PI, PI].
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Blend factor for one step of the velocity lag: `1 - exp(-rate * dt)`.
/// Two steps of `dt / 2` compose to exactly one step of `dt`.
pub fn smoothing_factor(dt: f64) -> f64 {
    1.0 - (-VELOCITY_SMOOTHING_RATE * dt.max(0.0)).exp()
}
