//! Ledge-climb проба (только в воздухе, на jump edge)
//!
//! Две стадии:
//! - reach-empty: над капсулой ищем высоту, где перед персонажем пусто
//!   (луч не упирается в стену ближе radius)
//! - ledge search: с найденной высоты бьём лучами вниз на нескольких
//!   глубинах; последний попавший луч даёт точку приземления
//!
//! Провал любой стадии — обычный исход, не ошибка.

use bevy::prelude::*;

use super::probe::silhouette_origin;
use super::settings::ProbeSettings;
use crate::logger;
use crate::physics::{cast_static, Raycast};

/// Найденный уступ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgeClimb {
    /// Новая позиция персонажа (ноги)
    pub target: Vec3,
    /// Высота над серединой капсулы, прошедшая reach-empty тест
    pub reach_extra_height: f32,
}

/// Что нужно знать о персонаже для пробы
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimbQuery {
    pub position: Vec3,
    pub up: Vec3,
    pub facing_angle: f32,
    pub radius: f32,
    pub height: f32,
}

/// Reach-empty: первая высота, на которой луч вперёд свободен дальше radius
fn find_reach_origin<R: Raycast + ?Sized>(
    raycast: &R,
    origin: Vec3,
    query: &ClimbQuery,
    direction: Vec3,
    probes: &ProbeSettings,
) -> Option<(f32, Vec3)> {
    let min_length = query.radius;
    let ray = direction * probes.max_ledge_search_length;

    probes.reach_extra_heights.iter().find_map(|&extra| {
        let reach_origin = origin + query.up * (query.height * 0.5 + extra);
        match cast_static(raycast, reach_origin, ray) {
            Some(hit) if hit.distance <= min_length => None,
            _ => Some((extra, reach_origin)),
        }
    })
}

pub fn probe_ledge<R: Raycast + ?Sized>(
    raycast: &R,
    query: &ClimbQuery,
    probes: &ProbeSettings,
) -> Option<LedgeClimb> {
    let Some(origin) = silhouette_origin(query.facing_angle, query.radius) else {
        logger::log_warning(&format!(
            "ledge probe: degenerate facing {} / radius {}, skipped",
            query.facing_angle, query.radius
        ));
        return None;
    };

    let min_length = query.radius;
    let max_length = probes.max_ledge_search_length;
    if !(max_length > min_length) || !(query.height > 0.0) {
        logger::log_warning(&format!(
            "ledge probe: search range [{}, {}] / height {} degenerate, skipped",
            min_length, max_length, query.height
        ));
        return None;
    }

    let check_origin = query.position + origin.offset;
    let (reach_extra_height, reach_origin) =
        find_reach_origin(raycast, check_origin, query, origin.direction, probes)?;

    let search_span = max_length - min_length;
    let down = -query.up * (reach_extra_height + query.height);

    // Берём последнее попадание: самую дальнюю глубину, где есть опора
    let landing = probes
        .ledge_search_fractions
        .iter()
        .filter_map(|&fraction| {
            let depth = min_length + fraction * search_span;
            cast_static(raycast, reach_origin + origin.direction * depth, down)
        })
        .last()?;

    Some(LedgeClimb {
        target: landing.point - origin.offset,
        reach_extra_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::StaticWorld;

    fn query_at(position: Vec3) -> ClimbQuery {
        ClimbQuery {
            position,
            up: Vec3::Y,
            facing_angle: 0.0,
            radius: 0.5,
            height: 2.0,
        }
    }

    fn ground() -> StaticWorld {
        StaticWorld::new().with_box(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0))
    }

    #[test]
    fn test_climbs_onto_ledge_in_front() {
        let world = ground().with_box(Vec3::new(-10.0, -1.0, 0.9), Vec3::new(10.0, 2.0, 5.0));

        let climb = probe_ledge(&world, &query_at(Vec3::new(0.0, 0.25, 0.0)), &ProbeSettings::default())
            .expect("ledge found");

        // Два нижних reach-луча упираются в стену в 0.4 от силуэта
        assert_eq!(climb.reach_extra_height, 1.0);
        assert!((climb.target - Vec3::new(0.0, 2.0, 1.5)).length() < 1e-4, "target = {:?}", climb.target);
    }

    #[test]
    fn test_no_support_below_means_no_climb() {
        let world = StaticWorld::new();
        assert!(probe_ledge(&world, &query_at(Vec3::new(0.0, 5.0, 0.0)), &ProbeSettings::default()).is_none());
    }

    #[test]
    fn test_tall_wall_blocks_every_reach_height() {
        let world = StaticWorld::new().with_box(Vec3::new(-5.0, -10.0, 1.0), Vec3::new(5.0, 20.0, 2.0));
        assert!(probe_ledge(&world, &query_at(Vec3::new(0.0, 5.0, 0.0)), &ProbeSettings::default()).is_none());
    }

    #[test]
    fn test_degenerate_search_range_skipped() {
        let probes = ProbeSettings {
            max_ledge_search_length: 0.5,
            ..Default::default()
        };
        assert!(probe_ledge(&ground(), &query_at(Vec3::new(0.0, 0.25, 0.0)), &probes).is_none());
    }
}
