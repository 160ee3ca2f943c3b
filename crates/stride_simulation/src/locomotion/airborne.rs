//! Airborne locomotion: blending к desired velocity + свободный поворот input facing

use bevy::prelude::*;

use super::angle::{facing_of, step_toward};
use super::input::WorldSpaceInput;
use super::settings::LocomotionSettings;
use super::snapshot::PhysicsSnapshot;
use super::state::MovementState;

/// Горизонтальная скорость после blending'а (delta ограничен по модулю)
pub fn blend_flat_velocity(current_flat: Vec3, desired: Vec3, max_delta: f32) -> Vec3 {
    let mut delta = desired - current_flat;
    if delta.length_squared() > max_delta * max_delta {
        delta = delta.normalize_or_zero() * max_delta;
    }
    current_flat + delta
}

/// Airborne шаг. Возвращает effective горизонтальную скорость.
///
/// `suppress_lateral` — ledge climb уже переставил персонажа в этом tick'е:
/// горизонтальный вклад обнуляется, но facing всё равно следует за input.
pub fn step(
    state: &mut MovementState,
    settings: &LocomotionSettings,
    input: &WorldSpaceInput,
    desired_velocity: Vec3,
    snapshot: &PhysicsSnapshot,
    dt: f32,
    suppress_lateral: bool,
) -> Vec3 {
    let epsilon = settings.tuning.input_epsilon;

    let effective = if suppress_lateral {
        Vec3::ZERO
    } else {
        blend_flat_velocity(
            snapshot.flat_linear_velocity(),
            desired_velocity,
            settings.airborne_acceleration * dt,
        )
    };

    let airborne = &mut state.airborne;
    if input.has_direction(epsilon) {
        airborne.input_facing_angle = step_toward(
            airborne.input_facing_angle,
            facing_of(input.flat_direction),
            settings.airborne_turn_speed * dt,
        );
    }

    // Grounded state следует за полётом, чтобы приземление не дёргало heading.
    // Около нуля atan2 вырожден → держим input facing.
    let grounded = &mut state.grounded;
    grounded.speed = effective.length();
    grounded.facing_angle = if effective.length_squared() <= epsilon * epsilon {
        airborne.input_facing_angle
    } else {
        facing_of(effective)
    };
    grounded.turnaround_enabled = false;

    effective
}
