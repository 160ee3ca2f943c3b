//! Physics primitive: swept-capsule character body
//!
//! Locomotion не знает, кто резолвит коллизии: headless integrator (тесты, bin)
//! или Rapier KinematicCharacterController. Оба backend'а держат состояние
//! primitive'а в `KinematicBody` и отдают его через trait `CharacterBody`.

use bevy::prelude::*;

use super::raycast::{cast_static, Raycast};
use crate::locomotion::{CapsuleGeometry, GroundState, PhysicsSnapshot};

/// Контракт physics primitive для locomotion
pub trait CharacterBody {
    /// Обновить ground velocity и вернуть snapshot на этот tick
    fn fetch_status(&mut self) -> PhysicsSnapshot;

    fn is_slope_too_steep(&self, normal: Vec3) -> bool;

    fn set_allow_sliding(&mut self, allow: bool);

    fn set_velocity(&mut self, velocity: Vec3);

    /// Переключить стойку; false если новая форма не помещается
    fn set_stance(&mut self, crouched: bool) -> bool;

    fn move_kinematic(&mut self, target: Transform);

    fn radius(&self) -> f32;

    fn height(&self) -> f32;

    fn read_transform(&self) -> Transform;
}

/// ECS состояние character body (общее для headless и Rapier backend'ов)
///
/// Transform персонажа = позиция ног, капсула растёт вверх по `up`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct KinematicBody {
    pub capsule: CapsuleGeometry,
    /// Максимальный угол склона, на котором можно стоять (rad)
    pub max_slope_angle: f32,
    pub up: Vec3,
    /// Скорость, выставленная locomotion'ом на этот tick
    pub velocity: Vec3,
    /// Скорость опоры (движущиеся платформы); static world → ноль
    pub ground_velocity: Vec3,
    pub ground_state: GroundState,
    pub ground_normal: Vec3,
    pub crouched: bool,
    pub allow_sliding: bool,
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self::new(CapsuleGeometry::default())
    }
}

impl KinematicBody {
    pub fn new(capsule: CapsuleGeometry) -> Self {
        Self {
            capsule,
            max_slope_angle: 46f32.to_radians(),
            up: Vec3::Y,
            velocity: Vec3::ZERO,
            ground_velocity: Vec3::ZERO,
            ground_state: GroundState::InAir,
            ground_normal: Vec3::Y,
            crouched: false,
            allow_sliding: false,
        }
    }

    pub fn current_height(&self) -> f32 {
        self.capsule.current_height(self.crouched)
    }

    pub fn is_slope_too_steep(&self, normal: Vec3) -> bool {
        normal.dot(self.up) < self.max_slope_angle.cos()
    }
}

/// Временный доступ к body + transform на время одного tick'а
///
/// `headroom` — static geometry для проверки, можно ли встать из приседа.
pub struct BodyView<'a, R: Raycast + ?Sized> {
    pub body: &'a mut KinematicBody,
    pub transform: &'a mut Transform,
    pub headroom: &'a R,
}

impl<R: Raycast + ?Sized> CharacterBody for BodyView<'_, R> {
    fn fetch_status(&mut self) -> PhysicsSnapshot {
        let body = &*self.body;
        PhysicsSnapshot {
            ground_velocity: body.ground_velocity,
            linear_velocity: body.velocity,
            up_direction: body.up,
            up_rotation: Quat::from_rotation_arc(Vec3::Y, body.up.normalize_or(Vec3::Y)),
            is_supported: body.ground_state != GroundState::InAir,
            ground_state: body.ground_state,
            ground_normal: body.ground_normal,
            ground_too_steep: body.ground_state != GroundState::InAir
                && body.is_slope_too_steep(body.ground_normal),
            is_crouched: body.crouched,
            position: self.transform.translation,
            rotation: self.transform.rotation,
            capsule: body.capsule,
        }
    }

    fn is_slope_too_steep(&self, normal: Vec3) -> bool {
        self.body.is_slope_too_steep(normal)
    }

    fn set_allow_sliding(&mut self, allow: bool) {
        self.body.allow_sliding = allow;
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.body.velocity = velocity;
    }

    fn set_stance(&mut self, crouched: bool) -> bool {
        if crouched == self.body.crouched {
            return true;
        }

        if !crouched {
            // Встаём: между макушкой в приседе и макушкой стоя должно быть пусто
            let capsule = self.body.capsule;
            let up = self.body.up;
            let extra = capsule.height - capsule.crouch_height;
            let crouch_top = self.transform.translation + up * capsule.crouch_height;
            if cast_static(self.headroom, crouch_top, up * extra).is_some() {
                return false;
            }
        }

        self.body.crouched = crouched;
        true
    }

    fn move_kinematic(&mut self, target: Transform) {
        self.transform.translation = target.translation;
        self.transform.rotation = target.rotation;
    }

    fn radius(&self) -> f32 {
        self.body.capsule.radius
    }

    fn height(&self) -> f32 {
        self.body.capsule.height
    }

    fn read_transform(&self) -> Transform {
        *self.transform
    }
}
