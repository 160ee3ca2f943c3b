//! Raycast service (только static/world геометрия)
//!
//! Пробы locomotion'а никогда не видят movable тела других персонажей:
//! иначе результат зависел бы от порядка обработки персонажей в tick'е.

use bevy::prelude::*;

/// Ближайшее попадание луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Расстояние от origin вдоль луча
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Read-only запросы к static слою physics world
pub trait Raycast {
    /// Луч из `origin` длиной |direction_and_length|
    ///
    /// Реализации могут считать, что длина > 0 и конечна: вызывающий код
    /// идёт через `cast_static`, который отсекает вырожденные лучи.
    fn raycast(&self, origin: Vec3, direction_and_length: Vec3) -> Option<RaycastHit>;
}

impl<T: Raycast + ?Sized> Raycast for &T {
    fn raycast(&self, origin: Vec3, direction_and_length: Vec3) -> Option<RaycastHit> {
        (**self).raycast(origin, direction_and_length)
    }
}

/// Минимальная длина луча, ниже — "нет попадания"
pub const MIN_RAY_LENGTH: f32 = 1e-6;

/// Fail-closed обёртка: нулевой/NaN луч = промах
pub fn cast_static<R: Raycast + ?Sized>(
    raycast: &R,
    origin: Vec3,
    direction_and_length: Vec3,
) -> Option<RaycastHit> {
    if !origin.is_finite() || !direction_and_length.is_finite() {
        return None;
    }
    if direction_and_length.length_squared() < MIN_RAY_LENGTH * MIN_RAY_LENGTH {
        return None;
    }
    raycast.raycast(origin, direction_and_length)
}
