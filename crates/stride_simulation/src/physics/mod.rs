//! Physics слой персонажа
//!
//! Character body (swept capsule) + read-only raycast по static геометрии.
//! Два backend'а: headless (AABB мир, тесты) и Rapier (KinematicCharacterController).

pub mod body;
pub mod headless;
pub mod movement;
pub mod rapier;
pub mod raycast;

use bevy::prelude::*;

pub use body::{BodyView, CharacterBody, KinematicBody};
pub use headless::{integrate_headless_bodies, StaticBox, StaticWorld};
pub use movement::{
    spawn_kinematic_character, spawn_rapier_character, KinematicControllerPlugin, LocomotionSet,
    PhysicsBackend,
};
pub use raycast::{cast_static, Raycast, RaycastHit};

/// Мировая гравитация (m/s²), одна на все персонажи
#[derive(Resource, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct WorldGravity(pub Vec3);

impl Default for WorldGravity {
    fn default() -> Self {
        Self(Vec3::new(0.0, -9.81, 0.0))
    }
}
