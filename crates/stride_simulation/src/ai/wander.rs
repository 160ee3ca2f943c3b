//! Wander: NPC бродит, периодически меняя направление и иногда прыгая
//!
//! Случайность только из `DeterministicRng`: одинаковый seed → одинаковые
//! траектории.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use crate::locomotion::WorldSpaceInput;
use crate::DeterministicRng;

#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Wander {
    /// Период смены направления (сек)
    pub change_interval: f32,
    pub timer: f32,
    /// Модуль stick'а, [0, 1]
    pub stick: f32,
    /// Вероятность прыжка на каждой смене направления
    pub jump_chance: f32,
    /// Вероятность остановиться вместо нового направления
    pub idle_chance: f32,
    pub direction: Vec3,
    /// Прыжок нажат на следующем tick'е (одно нажатие = один tick)
    pub pending_jump: bool,
}

impl Default for Wander {
    fn default() -> Self {
        Self {
            change_interval: 2.0,
            timer: 0.0,
            stick: 1.0,
            jump_chance: 0.25,
            idle_chance: 0.15,
            direction: Vec3::ZERO,
            pending_jump: false,
        }
    }
}

impl Wander {
    /// Новое решение: направление (или стоп) + возможный прыжок
    pub fn reroll(&mut self, rng: &mut impl Rng) {
        self.timer = self.change_interval;

        self.direction = if rng.gen::<f32>() < self.idle_chance {
            Vec3::ZERO
        } else {
            let angle = rng.gen::<f32>() * TAU;
            Vec3::new(angle.sin(), 0.0, angle.cos()) * self.stick.clamp(0.0, 1.0)
        };
        self.pending_jump = rng.gen::<f32>() < self.jump_chance;
    }
}

/// Система: Wander → WorldSpaceInput
///
/// Работает в FixedUpdate до locomotion.
pub fn drive_wander_input(
    time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    mut query: Query<(&mut Wander, &mut WorldSpaceInput)>,
) {
    let dt = time.timestep().as_secs_f32();

    for (mut wander, mut input) in query.iter_mut() {
        wander.timer -= dt;
        if wander.timer <= 0.0 {
            wander.reroll(&mut rng.rng);
        }

        input.flat_direction = wander.direction;
        input.jump_pressed = wander.pending_jump;
        input.crouch_pressed = false;
        wander.pending_jump = false;
    }
}
