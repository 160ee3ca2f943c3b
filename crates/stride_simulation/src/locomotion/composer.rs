//! Velocity composer: сумма вкладов + gravity, применение к physics primitive
//!
//! Gravity добавляется последней и всегда, независимо от режима.

use bevy::prelude::*;

use super::state::MovementState;
use crate::logger;
use crate::physics::CharacterBody;

/// Вклады в итоговую скорость tick'а
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityContributions {
    /// Ground velocity (grounded), вертикаль полёта (airborne) или override пробы
    pub base: Vec3,
    /// Planar скорость grounded модели или effective скорость airborne модели
    pub lateral: Vec3,
    /// Jump impulse grounded модели
    pub impulse: Vec3,
}

impl VelocityContributions {
    /// Скорость до gravity
    pub fn sum(&self) -> Vec3 {
        self.base + self.lateral + self.impulse
    }
}

/// Gravity term: мир повёрнут в систему up персонажа
pub fn gravity_term(up_rotation: Quat, world_gravity: Vec3, dt: f32) -> Vec3 {
    (up_rotation * world_gravity) * dt
}

pub fn compose(contributions: &VelocityContributions, up_rotation: Quat, world_gravity: Vec3, dt: f32) -> Vec3 {
    contributions.sum() + gravity_term(up_rotation, world_gravity, dt)
}

/// Сигналы для animator'а (пишутся раз в tick)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct LocomotionSignals {
    pub is_moving: bool,
    pub is_grounded: bool,
    pub on_jump: bool,
    pub on_turnaround: bool,
    pub on_ledge_climb: bool,
}

/// Всё, что locomotion tick решил на этот tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub state: MovementState,
    pub contributions: VelocityContributions,
    /// Итоговая скорость с gravity
    pub velocity: Vec3,
    /// Some(crouched) — запрос смены стойки
    pub stance_request: Option<bool>,
    /// Ledge climb: новая позиция ног
    pub relocate_to: Option<Vec3>,
    pub allow_sliding: bool,
    pub is_grounded: bool,
    pub display_facing_angle: f32,
    pub signals: LocomotionSignals,
}

/// Применяет решения tick'а к body
///
/// Порядок как у physics primitive: стойка → перенос → sliding → velocity.
/// Возвращает true если стойка реально сменилась.
pub fn apply_to_body<B: CharacterBody + ?Sized>(output: &TickOutput, body: &mut B) -> bool {
    let mut stance_changed = false;
    if let Some(crouched) = output.stance_request {
        stance_changed = body.set_stance(crouched);
        if !stance_changed {
            logger::log_warning(&format!(
                "stance switch to crouched={} refused by character body",
                crouched
            ));
        }
    }

    if let Some(target) = output.relocate_to {
        let mut transform = body.read_transform();
        transform.translation = target;
        body.move_kinematic(transform);
    }

    body.set_allow_sliding(output.allow_sliding);
    body.set_velocity(output.velocity);

    stance_changed
}
