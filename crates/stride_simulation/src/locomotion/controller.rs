//! Locomotion tick: (state, settings, snapshot, input) → TickOutput
//!
//! Classifier → (grounded xor airborne, airborne может вызвать пробы на jump edge)
//! → composer. Единственная реализация алгоритма; ECS слой только собирает
//! параметры и применяет результат (см. physics::movement).

use bevy::prelude::*;

use super::airborne;
use super::classifier::is_grounded;
use super::composer::{compose, LocomotionSignals, TickOutput, VelocityContributions};
use super::grounded;
use super::input::WorldSpaceInput;
use super::ledge_climb::{probe_ledge, ClimbQuery};
use super::settings::LocomotionSettings;
use super::snapshot::PhysicsSnapshot;
use super::state::MovementState;
use super::wall_jump::{probe_wall, wall_jump_velocity};
use crate::logger;
use crate::physics::Raycast;

/// Окружение tick'а, общее для всех персонажей
pub struct TickContext<'a, R: Raycast + ?Sized> {
    pub settings: &'a LocomotionSettings,
    pub world_gravity: Vec3,
    pub dt: f32,
    pub raycast: &'a R,
}

/// Один fixed tick одного персонажа. Единственный side effect — raycast запросы.
pub fn step_locomotion<R: Raycast + ?Sized>(
    state: &MovementState,
    input: &WorldSpaceInput,
    snapshot: &PhysicsSnapshot,
    ctx: &TickContext<'_, R>,
) -> TickOutput {
    let settings = ctx.settings;
    let dt = ctx.dt;
    let mut next = *state;
    next.prev_jump_pressed = input.jump_pressed;
    next.prev_crouch_pressed = input.crouch_pressed;

    let grounded_now = is_grounded(snapshot, &settings.tuning);
    let desired_velocity = input.flat_direction * settings.stance_speed(snapshot.is_crouched);

    let mut signals = LocomotionSignals {
        is_moving: input.magnitude() > settings.tuning.moving_input_threshold,
        is_grounded: grounded_now,
        ..Default::default()
    };
    let mut contributions = VelocityContributions::default();
    let mut stance_request = None;
    let mut relocate_to = None;

    let display_facing_angle = if grounded_now {
        let step = grounded::step(&mut next, settings, input, desired_velocity, snapshot, dt);

        contributions.base = snapshot.ground_velocity;
        contributions.lateral = step.planar_velocity;
        contributions.impulse = step.jump_impulse;
        stance_request = step.stance_request;

        signals.on_jump = step.jump_impulse != Vec3::ZERO;
        signals.on_turnaround = next.grounded.turnaround_enabled;

        next.grounded.facing_angle
    } else {
        // Продолжаем текущую вертикаль, присед в воздухе сбрасывается
        contributions.base = snapshot.vertical_velocity();
        if snapshot.is_crouched {
            stance_request = Some(false);
        }

        if input.on_jump_press() {
            let query = ClimbQuery {
                position: snapshot.position,
                up: snapshot.up_direction,
                facing_angle: next.airborne.input_facing_angle,
                radius: snapshot.capsule.radius,
                height: snapshot.capsule.height,
            };
            let probes = &settings.tuning.probes;

            if let Some(climb) = probe_ledge(ctx.raycast, &query, probes) {
                logger::log(&format!(
                    "ledge climb: {:?} → {:?} (reach +{})",
                    snapshot.position, climb.target, climb.reach_extra_height
                ));
                contributions.base = Vec3::ZERO;
                relocate_to = Some(climb.target);
                signals.on_ledge_climb = true;
            } else if contributions.base.y <= 0.0 {
                if let Some(wall) = probe_wall(
                    ctx.raycast,
                    snapshot.position,
                    query.facing_angle,
                    query.radius,
                    probes,
                ) {
                    logger::log(&format!(
                        "wall jump: ray {} hit at {:?}",
                        wall.ray_index, wall.hit.point
                    ));
                    contributions.base =
                        wall_jump_velocity(contributions.base, snapshot.up_direction, settings.jump_speed);
                    signals.on_jump = true;
                }
            }
            // Ни уступа, ни стены: персонаж просто продолжает падать
        }

        contributions.lateral = airborne::step(
            &mut next,
            settings,
            input,
            desired_velocity,
            snapshot,
            dt,
            relocate_to.is_some(),
        );

        next.airborne.input_facing_angle
    };

    let velocity = compose(&contributions, snapshot.up_rotation, ctx.world_gravity, dt);
    let allow_sliding = grounded_now && next.grounded.speed > settings.tuning.sliding_speed_epsilon;

    TickOutput {
        state: next,
        contributions,
        velocity,
        stance_request,
        relocate_to,
        allow_sliding,
        is_grounded: grounded_now,
        display_facing_angle,
        signals,
    }
}
