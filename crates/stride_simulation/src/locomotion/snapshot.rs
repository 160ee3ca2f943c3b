//! Physics snapshot: то, что character body отдаёт в начале каждого tick'а
//!
//! Эфемерный: перечитывается каждый tick, нигде не хранится.

use bevy::prelude::*;

/// Контакт с землёй по версии physics primitive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum GroundState {
    #[default]
    InAir,
    OnGround,
    /// Стоим на поверхности круче max slope
    TooSteep,
}

/// Геометрия капсулы (read-only, владеет physics primitive)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct CapsuleGeometry {
    pub radius: f32,
    /// Полная высота стоя (включая полусферы)
    pub height: f32,
    pub crouch_height: f32,
}

impl Default for CapsuleGeometry {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 2.0,
            crouch_height: 1.2,
        }
    }
}

impl CapsuleGeometry {
    pub fn current_height(&self, crouched: bool) -> f32 {
        if crouched {
            self.crouch_height
        } else {
            self.height
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsSnapshot {
    pub ground_velocity: Vec3,
    pub linear_velocity: Vec3,
    pub up_direction: Vec3,
    pub up_rotation: Quat,
    pub is_supported: bool,
    pub ground_state: GroundState,
    pub ground_normal: Vec3,
    /// `is_slope_too_steep(ground_normal)` посчитанный primitive'ом
    pub ground_too_steep: bool,
    pub is_crouched: bool,
    /// Позиция ног персонажа (origin body)
    pub position: Vec3,
    pub rotation: Quat,
    pub capsule: CapsuleGeometry,
}

impl Default for PhysicsSnapshot {
    fn default() -> Self {
        Self {
            ground_velocity: Vec3::ZERO,
            linear_velocity: Vec3::ZERO,
            up_direction: Vec3::Y,
            up_rotation: Quat::IDENTITY,
            is_supported: false,
            ground_state: GroundState::InAir,
            ground_normal: Vec3::Y,
            ground_too_steep: false,
            is_crouched: false,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            capsule: CapsuleGeometry::default(),
        }
    }
}

impl PhysicsSnapshot {
    /// Компонента linear velocity вдоль up
    pub fn vertical_velocity(&self) -> Vec3 {
        self.up_direction * self.linear_velocity.dot(self.up_direction)
    }

    /// Горизонтальная скорость в world XZ
    pub fn flat_linear_velocity(&self) -> Vec3 {
        Vec3::new(self.linear_velocity.x, 0.0, self.linear_velocity.z)
    }
}
