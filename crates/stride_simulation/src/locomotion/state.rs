//! Movement state персонажа (живёт от spawn до despawn)
//!
//! Мутируется только locomotion tick'ом.
//! Инварианты:
//! - facing углы в (−π, π]
//! - `turnaround_enabled` sticky: ставит только grounded модель,
//!   снимает quick-turn контекст или airborne модель

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct GroundedState {
    /// Линейная скорость по земле (m/s)
    pub speed: f32,
    pub facing_angle: f32,
    pub turnaround_enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct AirborneState {
    pub input_facing_angle: f32,
}

#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MovementState {
    pub grounded: GroundedState,
    pub airborne: AirborneState,
    /// Нажатия с последнего tick'а (для callers без своей input history)
    pub prev_jump_pressed: bool,
    pub prev_crouch_pressed: bool,
}

impl MovementState {
    /// Spawn с заданным facing (оба режима стартуют с одного heading)
    pub fn facing(angle: f32) -> Self {
        let angle = super::angle::wrap_angle(angle);
        Self {
            grounded: GroundedState { facing_angle: angle, ..Default::default() },
            airborne: AirborneState { input_facing_angle: angle },
            ..Default::default()
        }
    }
}
