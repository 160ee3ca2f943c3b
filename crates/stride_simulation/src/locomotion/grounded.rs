//! Grounded locomotion: turn-rate limited facing, speed ramp, turnaround, jump/crouch
//!
//! Facing считается до speed ramp: turnaround, включённый в этом tick'е,
//! уже обнуляет desired speed. Edge события (stance toggle xor jump)
//! зависят только от snapshot и input.

use bevy::prelude::*;

use super::angle::{angle_delta, facing_of, planar_direction, wrap_angle};
use super::input::WorldSpaceInput;
use super::settings::LocomotionSettings;
use super::snapshot::PhysicsSnapshot;
use super::state::{GroundedState, MovementState};

/// Результат grounded шага
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroundedStep {
    /// speed·(sin, 0, cos) facing'а
    pub planar_velocity: Vec3,
    /// jump_speed·up при прыжке, иначе ноль
    pub jump_impulse: Vec3,
    /// Some(crouched) если стойку нужно переключить
    pub stance_request: Option<bool>,
}

/// Поворот facing к направлению desired velocity
///
/// Turnaround sticky: пока включён, facing заморожен. Снимает его только
/// quick-turn контекст (низкая скорость) или airborne модель.
pub fn apply_facing(
    grounded: &mut GroundedState,
    settings: &LocomotionSettings,
    desired_velocity: Vec3,
    dt: f32,
) {
    let desired_facing = facing_of(desired_velocity);
    let delta = angle_delta(grounded.facing_angle, desired_facing);

    let turn_speed = settings.grounded_turn_speed(grounded.speed);
    let is_quick_turn = turn_speed > settings.tuning.quick_turn_threshold;
    if is_quick_turn {
        grounded.turnaround_enabled = false;
    }

    let turnaround = grounded.turnaround_enabled
        || (!is_quick_turn && delta.abs() > settings.tuning.turnaround_trigger_angle());
    if turnaround {
        grounded.turnaround_enabled = true;
        return;
    }

    let max_turn = turn_speed * dt;
    let step = if delta.abs() > max_turn { max_turn * delta.signum() } else { delta };
    grounded.facing_angle = wrap_angle(grounded.facing_angle + step);
}

/// Разгон/торможение speed к |desired velocity| без overshoot
pub fn apply_linear_speed(
    grounded: &mut GroundedState,
    settings: &LocomotionSettings,
    desired_velocity: Vec3,
    dt: f32,
) {
    let desired_speed = if grounded.turnaround_enabled {
        0.0
    } else {
        Vec2::new(desired_velocity.x, desired_velocity.z).length()
    };

    let delta = desired_speed - grounded.speed;
    let max_change = if delta < 0.0 {
        settings.grounded_deceleration * dt
    } else {
        settings.grounded_acceleration * dt
    };
    let step = if delta.abs() > max_change { max_change * delta.signum() } else { delta };
    grounded.speed = (grounded.speed + step).max(0.0);
}

/// Полный grounded шаг
///
/// `desired_velocity` = input · скорость текущей стойки (до переключения стойки).
pub fn step(
    state: &mut MovementState,
    settings: &LocomotionSettings,
    input: &WorldSpaceInput,
    desired_velocity: Vec3,
    snapshot: &PhysicsSnapshot,
    dt: f32,
) -> GroundedStep {
    let mut out = GroundedStep::default();

    // Edge события: crouch press или jump в присяде переключают стойку,
    // прыжок только из положения стоя
    let crouched = snapshot.is_crouched;
    if input.on_crouch_press() || (crouched && input.on_jump_press()) {
        out.stance_request = Some(!crouched);
    } else if !crouched && input.on_jump_press() {
        out.jump_impulse = settings.jump_speed * snapshot.up_direction;
    }

    let grounded = &mut state.grounded;
    if input.has_direction(settings.tuning.input_epsilon) {
        apply_facing(grounded, settings, desired_velocity, dt);
    }
    apply_linear_speed(grounded, settings, desired_velocity, dt);

    out.planar_velocity = planar_direction(grounded.facing_angle) * grounded.speed;

    // Airborne стартует с того же heading
    state.airborne.input_facing_angle = grounded.facing_angle;

    out
}
