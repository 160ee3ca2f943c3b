//! Wall-jump проба: fallback после неудачного ledge climb при падении
//!
//! Веер лучей по кругу начиная с input facing. Выигрывает первое попадание
//! по порядку лучей, а не ближайшее.

use bevy::prelude::*;
use std::f32::consts::TAU;

use super::probe::silhouette_origin;
use super::settings::ProbeSettings;
use crate::physics::{cast_static, Raycast, RaycastHit};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    pub ray_index: u32,
    pub hit: RaycastHit,
}

pub fn probe_wall<R: Raycast + ?Sized>(
    raycast: &R,
    position: Vec3,
    facing_angle: f32,
    radius: f32,
    probes: &ProbeSettings,
) -> Option<WallContact> {
    let count = probes.wall_jump_ray_count;
    (0..count).find_map(|ray_index| {
        let angle = facing_angle + ray_index as f32 * TAU / count as f32;
        let origin = silhouette_origin(angle, radius)?;
        cast_static(
            raycast,
            position + origin.offset,
            origin.direction * probes.wall_jump_ray_length,
        )
        .map(|hit| WallContact { ray_index, hit })
    })
}

/// Вертикальная компонента заменяется на +jump_speed вдоль up
pub fn wall_jump_velocity(velocity: Vec3, up: Vec3, jump_speed: f32) -> Vec3 {
    velocity - up * up.dot(velocity) + up * jump_speed
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::physics::StaticWorld;

    #[test]
    fn test_wall_in_front_hits_first_ray() {
        let world = StaticWorld::new().with_box(Vec3::new(-5.0, -10.0, 1.0), Vec3::new(5.0, 20.0, 2.0));
        let contact = probe_wall(&world, Vec3::new(0.0, 5.0, 0.0), 0.0, 0.5, &ProbeSettings::default())
            .expect("wall");
        assert_eq!(contact.ray_index, 0);
        assert!((contact.hit.distance - 0.5).abs() < 1e-5);
        assert_eq!(contact.hit.normal, Vec3::NEG_Z);
    }

    #[test]
    fn test_first_ray_in_order_wins_not_nearest() {
        // Стена сзади: лучи 1-2 смотрят вперёд-вбок, первым попадает луч 3 (120°)
        let world = StaticWorld::new().with_box(Vec3::new(-5.0, -10.0, -2.0), Vec3::new(5.0, 20.0, -1.0));
        let contact = probe_wall(&world, Vec3::new(0.0, 5.0, 0.0), 0.0, 0.5, &ProbeSettings::default())
            .expect("wall");
        assert_eq!(contact.ray_index, 3);
    }

    #[test]
    fn test_open_air_no_contact() {
        let world = StaticWorld::new();
        assert!(probe_wall(&world, Vec3::ZERO, 1.0, 0.5, &ProbeSettings::default()).is_none());
    }

    #[test]
    fn test_wall_jump_velocity_replaces_vertical() {
        let out = wall_jump_velocity(Vec3::new(2.0, -5.0, 1.0), Vec3::Y, 30.0);
        assert!((out - Vec3::new(2.0, 30.0, 1.0)).length() < 1e-5);
    }
}
