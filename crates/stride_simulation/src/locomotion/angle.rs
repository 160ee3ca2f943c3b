//! Угловая математика facing'а (yaw вокруг world Y)
//!
//! Конвенция: angle = atan2(x, z), т.е. 0 смотрит в +Z, π/2 в +X.
//! Все хранимые углы нормализованы в (−π, π].

use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

/// Нормализация в (−π, π]
///
/// Non-finite угол → 0.0 (NaN не должен утечь в MovementState).
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }

    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Знаковая разница `to - from`, обёрнутая в (−π, π]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Поворот `current` к `target` не больше чем на `max_step` (без overshoot)
pub fn step_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let mut delta = angle_delta(current, target);
    if delta.abs() > max_step {
        delta = max_step * delta.signum();
    }
    wrap_angle(current + delta)
}

/// Facing из плоского вектора (x, z)
pub fn facing_of(planar: Vec3) -> f32 {
    planar.x.atan2(planar.z)
}

/// Единичный плоский вектор для facing angle
pub fn planar_direction(angle: f32) -> Vec3 {
    Vec3::new(angle.sin(), 0.0, angle.cos())
}
