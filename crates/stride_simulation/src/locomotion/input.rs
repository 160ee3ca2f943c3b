//! World-space input для character locomotion
//!
//! Один и тот же record пишут player input и NPC AI (см. ai::wander).
//! Previous-tick флаги передаёт caller: edge detection не хранит скрытого состояния.

use bevy::prelude::*;

/// Input персонажа на один fixed tick
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WorldSpaceInput {
    /// Плоское направление (y = 0), |v| ≤ 1
    pub flat_direction: Vec3,
    pub jump_pressed: bool,
    pub prev_jump_pressed: bool,
    pub crouch_pressed: bool,
    pub prev_crouch_pressed: bool,
}

/// Прижимает вектор к единичному диску в плоскости XZ
pub fn clamp_to_unit_disk(direction: Vec3) -> Vec3 {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    if !flat.is_finite() {
        return Vec3::ZERO;
    }
    if flat.length_squared() > 1.0 {
        flat.normalize()
    } else {
        flat
    }
}

impl WorldSpaceInput {
    pub fn from_direction(direction: Vec3) -> Self {
        Self {
            flat_direction: clamp_to_unit_disk(direction),
            ..Default::default()
        }
    }

    /// Конвертация stick input (x = вправо, y = вперёд) относительно камеры
    ///
    /// Forward камеры проецируется на плоскость, right = forward × up.
    /// Вырожденный (вертикальный) forward → нулевой input.
    pub fn from_camera_relative(stick: Vec2, camera_forward: Vec3) -> Self {
        let forward = Vec3::new(camera_forward.x, 0.0, camera_forward.z).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let world = right * stick.x + forward * stick.y;
        Self::from_direction(world)
    }

    /// Текущее нажатие поверх предыдущего tick'а
    pub fn with_presses(mut self, jump: bool, crouch: bool) -> Self {
        self.jump_pressed = jump;
        self.crouch_pressed = crouch;
        self
    }

    /// Переносит текущие нажатия в prev-флаги (вызывается после tick'а)
    pub fn latch(&mut self) {
        self.prev_jump_pressed = self.jump_pressed;
        self.prev_crouch_pressed = self.crouch_pressed;
    }

    pub fn on_jump_press(&self) -> bool {
        self.jump_pressed && !self.prev_jump_pressed
    }

    pub fn on_crouch_press(&self) -> bool {
        self.crouch_pressed && !self.prev_crouch_pressed
    }

    pub fn magnitude(&self) -> f32 {
        self.flat_direction.length()
    }

    /// Input не пренебрежимо мал (можно брать atan2)
    pub fn has_direction(&self, epsilon: f32) -> bool {
        self.flat_direction.length_squared() > epsilon * epsilon
    }
}
