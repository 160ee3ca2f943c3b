//! Общая геометрия проб: origin на краю силуэта в сторону facing

use bevy::prelude::*;

use super::angle::planar_direction;

/// Смещение origin'а пробы и единичное направление луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeOrigin {
    /// Горизонтальное смещение от позиции персонажа, max(|x|, |z|) == radius
    pub offset: Vec3,
    /// Единичное плоское направление
    pub direction: Vec3,
}

/// Смещение до края квадратного силуэта со стороной 2·radius
///
/// Для вещественного угла max(|sin|, |cos|) ≥ √2/2, но radius и угол приходят
/// извне: вырожденный знаменатель или non-finite результат → None.
pub fn silhouette_origin(facing_angle: f32, radius: f32) -> Option<ProbeOrigin> {
    probe_origin_along(planar_direction(facing_angle), radius)
}

/// То же для произвольного направления (нормализуется)
pub fn probe_origin_along(direction: Vec3, radius: f32) -> Option<ProbeOrigin> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    let direction = flat.try_normalize()?;

    let dominant = direction.x.abs().max(direction.z.abs());
    if dominant <= f32::EPSILON || !radius.is_finite() || radius < 0.0 {
        return None;
    }

    let offset = direction * (radius / dominant);
    offset.is_finite().then_some(ProbeOrigin { offset, direction })
}
