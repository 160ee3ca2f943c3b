//! Rapier backend: KinematicCharacterController как physics primitive
//!
//! Порядок в FixedUpdate:
//! 1. sync_rapier_bodies: output прошлого шага Rapier → KinematicBody
//! 2. locomotion (physics::movement)
//! 3. push_rapier_motion: KinematicBody.velocity · dt → controller.translation
//!
//! Rapier step должен идти в fixed schedule
//! (`RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule()`).

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use std::f32::consts::FRAC_PI_2;

use super::body::KinematicBody;
use super::raycast::{cast_static, Raycast, RaycastHit};
use crate::locomotion::{CapsuleGeometry, GroundState};

/// Глубина луча, которым уточняется нормаль опоры под ногами
const GROUND_NORMAL_PROBE: f32 = 0.3;

/// Raycast по fixed телам Rapier world (персонажи и динамика невидимы)
pub struct RapierStaticRaycast<'c, 'w> {
    pub context: &'c RapierContext<'w>,
}

impl Raycast for RapierStaticRaycast<'_, '_> {
    fn raycast(&self, origin: Vec3, direction_and_length: Vec3) -> Option<RaycastHit> {
        let length = direction_and_length.length();
        let direction = direction_and_length / length;

        self.context
            .cast_ray_and_get_normal(origin, direction, length, true, QueryFilter::only_fixed())
            .map(|(_, intersection)| RaycastHit {
                distance: intersection.time_of_impact,
                point: intersection.point,
                normal: intersection.normal,
            })
    }
}

/// Стойка, под которую сейчас собран collider
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct AppliedStance {
    pub crouched: bool,
}

/// Капсула с ногами в origin entity
pub fn capsule_collider(capsule: &CapsuleGeometry, crouched: bool) -> Collider {
    let height = capsule.current_height(crouched);
    let radius = capsule.radius;
    let half_segment = (height * 0.5 - radius).max(0.0);

    Collider::compound(vec![(
        Vec3::Y * (half_segment + radius),
        Quat::IDENTITY,
        Collider::capsule_y(half_segment, radius),
    )])
}

/// Реально пройденное за шаг → скорость
pub fn realized_velocity(effective_translation: Vec3, dt: f32) -> Vec3 {
    if dt > 0.0 {
        effective_translation / dt
    } else {
        Vec3::ZERO
    }
}

/// Классификация контакта по output'у контроллера и нормали опоры
///
/// `is_sliding_down_slope` Rapier выставляет и на ровном полу (gravity push),
/// поэтому крутизну решает только нормаль.
pub fn classify_ground(
    body: &KinematicBody,
    grounded: bool,
    ground_normal: Option<Vec3>,
) -> (GroundState, Vec3) {
    if !grounded {
        return (GroundState::InAir, body.up);
    }

    let normal = ground_normal.unwrap_or(body.up);
    let state = if body.is_slope_too_steep(normal) {
        GroundState::TooSteep
    } else {
        GroundState::OnGround
    };
    (state, normal)
}

/// Minimum slide angle: без sliding персонаж не съезжает ни с какого склона
pub fn slide_angle(body: &KinematicBody) -> f32 {
    if body.allow_sliding {
        body.max_slope_angle
    } else {
        FRAC_PI_2
    }
}

/// Система: output Rapier контроллера → KinematicBody
pub fn sync_rapier_bodies(
    read_rapier_context: ReadRapierContext,
    time: Res<Time<Fixed>>,
    mut query: Query<(&mut KinematicBody, &KinematicCharacterControllerOutput, &Transform)>,
) -> Result {
    let rapier_context = read_rapier_context.single()?;
    let raycast = RapierStaticRaycast {
        context: &rapier_context,
    };
    let dt = time.timestep().as_secs_f32();

    for (mut body, output, transform) in query.iter_mut() {
        let up = body.up;
        let ground_normal = cast_static(
            &raycast,
            transform.translation + up * (GROUND_NORMAL_PROBE * 0.5),
            -up * GROUND_NORMAL_PROBE,
        )
        .map(|hit| hit.normal);

        let (state, normal) = classify_ground(&body, output.grounded, ground_normal);

        body.velocity = realized_velocity(output.effective_translation, dt);
        body.ground_velocity = Vec3::ZERO;
        body.ground_state = state;
        body.ground_normal = normal;
    }

    Ok(())
}

/// Система: решения locomotion → KinematicCharacterController + collider
pub fn push_rapier_motion(
    time: Res<Time<Fixed>>,
    mut query: Query<(
        &KinematicBody,
        &mut KinematicCharacterController,
        &mut Collider,
        &mut AppliedStance,
    )>,
) {
    let dt = time.timestep().as_secs_f32();

    for (body, mut controller, mut collider, mut stance) in query.iter_mut() {
        controller.translation = Some(body.velocity * dt);
        controller.up = body.up;
        controller.max_slope_climb_angle = body.max_slope_angle;
        controller.min_slope_slide_angle = slide_angle(body);

        if stance.crouched != body.crouched {
            *collider = capsule_collider(&body.capsule, body.crouched);
            stance.crouched = body.crouched;
        }
    }
}
