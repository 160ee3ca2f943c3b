//! Headless physics backend: static AABB мир + простой swept-capsule integrator
//!
//! Используется когда Rapier не подключен (тесты, headless bin).
//! Геометрия только статическая: набор axis-aligned боксов.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;

use super::body::KinematicBody;
use super::raycast::{cast_static, Raycast, RaycastHit};
use crate::locomotion::GroundState;

/// Насколько выше ног начинается луч ground detection (ступенька)
pub const STEP_HEIGHT: f32 = 0.3;
/// Запас ниже ног, в пределах которого body прилипает к земле
pub const GROUND_SNAP: f32 = 0.05;

/// Axis-aligned бокс статической геометрии
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct StaticBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl StaticBox {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Ray vs cuboid через parry (тот же query, что у Rapier backend'а)
    ///
    /// Distance в единицах длины луча. Origin внутри бокса = попадание
    /// на расстоянии 0 (нормаль против луча).
    pub fn raycast(&self, origin: Vec3, direction_and_length: Vec3) -> Option<RaycastHit> {
        let length = direction_and_length.length();
        let direction = direction_and_length / length;

        if self.contains(origin) {
            return Some(RaycastHit {
                distance: 0.0,
                point: origin,
                normal: -direction,
            });
        }

        let half = self.half_extents();
        Collider::cuboid(half.x, half.y, half.z)
            .cast_ray_and_get_normal(self.center(), Quat::IDENTITY, origin, direction, length, true)
            .map(|intersection| RaycastHit {
                distance: intersection.time_of_impact,
                point: intersection.point,
                normal: intersection.normal,
            })
    }
}

/// Статический мир headless backend'а
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct StaticWorld {
    pub boxes: Vec<StaticBox>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_box(mut self, a: Vec3, b: Vec3) -> Self {
        self.add_box(a, b);
        self
    }

    pub fn add_box(&mut self, a: Vec3, b: Vec3) {
        self.boxes.push(StaticBox::new(a, b));
    }
}

impl Raycast for StaticWorld {
    fn raycast(&self, origin: Vec3, direction_and_length: Vec3) -> Option<RaycastHit> {
        self.boxes
            .iter()
            .filter_map(|b| b.raycast(origin, direction_and_length))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Один шаг интеграции body: velocity · dt с коллизиями, затем ground detection
///
/// Горизонталь клипается лучом из середины капсулы, вертикаль идёт как есть,
/// после чего body прилипает к земле, если падает/стоит над ней.
pub fn integrate_body<R: Raycast + ?Sized>(
    body: &mut KinematicBody,
    translation: &mut Vec3,
    world: &R,
    dt: f32,
) {
    let up = body.up.normalize_or(Vec3::Y);
    let radius = body.capsule.radius;
    let mut velocity = body.velocity;
    let mut position = *translation;

    // Горизонталь
    let vertical_speed = velocity.dot(up);
    let lateral = (velocity - up * vertical_speed) * dt;
    let lateral_length = lateral.length();
    if lateral_length > f32::EPSILON {
        let direction = lateral / lateral_length;
        let mid = position + up * (body.current_height() * 0.5);
        match cast_static(world, mid, direction * (lateral_length + radius)) {
            Some(hit) => {
                position += direction * (hit.distance - radius).max(0.0);
                let into_wall = velocity.dot(hit.normal);
                if into_wall < 0.0 {
                    velocity -= hit.normal * into_wall;
                }
            }
            None => position += lateral,
        }
    }

    // Вертикаль: потолок режет подъём
    let vertical_speed = velocity.dot(up);
    let mut rise = vertical_speed * dt;
    if rise > 0.0 {
        let head = position + up * body.current_height();
        if let Some(hit) = cast_static(world, head, up * rise) {
            rise = hit.distance;
            velocity -= up * vertical_speed;
        }
    }
    let start = position;
    position += up * rise;

    // Ground detection: луч покрывает и падение за этот tick
    let falling = velocity.dot(up) <= 0.0;
    let drop = (-rise).max(0.0);
    let probe = cast_static(
        world,
        start + up * STEP_HEIGHT,
        -up * (STEP_HEIGHT + drop + GROUND_SNAP),
    );
    match probe {
        Some(hit) if falling => {
            position -= up * up.dot(position - hit.point);
            velocity -= up * velocity.dot(up);
            body.ground_normal = hit.normal;
            body.ground_state = if body.is_slope_too_steep(hit.normal) {
                GroundState::TooSteep
            } else {
                GroundState::OnGround
            };
        }
        _ => {
            body.ground_state = GroundState::InAir;
            body.ground_normal = up;
        }
    }

    body.velocity = velocity;
    *translation = position;
}

/// Система: интеграция всех headless body
///
/// Работает в FixedUpdate после locomotion.
pub fn integrate_headless_bodies(
    world: Res<StaticWorld>,
    time: Res<Time<Fixed>>,
    mut query: Query<(&mut KinematicBody, &mut Transform)>,
) {
    let dt = time.timestep().as_secs_f32();
    let world = world.into_inner();

    query.par_iter_mut().for_each(|(mut body, mut transform)| {
        integrate_body(&mut body, &mut transform.translation, world, dt);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> StaticWorld {
        StaticWorld::new().with_box(Vec3::new(-50.0, -1.0, -50.0), Vec3::new(50.0, 0.0, 50.0))
    }

    #[test]
    fn test_box_raycast_hits_nearest_face() {
        let world = floor();
        let hit = world
            .raycast(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, -5.0, 0.0))
            .expect("floor hit");
        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Y).length() < 1e-5, "normal = {:?}", hit.normal);
        assert!((hit.point.y).abs() < 1e-5);
    }

    #[test]
    fn test_box_raycast_side_face_normal() {
        let world = StaticWorld::new().with_box(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(1.0, 3.0, 4.0));
        let hit = world
            .raycast(Vec3::new(0.5, 1.0, 0.0), Vec3::new(0.0, 0.0, 10.0))
            .expect("wall hit");
        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert!((hit.normal + Vec3::Z).length() < 1e-5, "normal = {:?}", hit.normal);
        assert!((hit.point - Vec3::new(0.5, 1.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn test_nearest_box_wins() {
        let world = floor()
            .with_box(Vec3::new(-1.0, 0.0, 5.0), Vec3::new(1.0, 2.0, 6.0))
            .with_box(Vec3::new(-1.0, 0.0, 3.0), Vec3::new(1.0, 2.0, 4.0));
        let hit = world
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 10.0))
            .expect("hit");
        assert!((hit.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_box_raycast_respects_length() {
        let world = floor();
        assert!(world.raycast(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, -1.5, 0.0)).is_none());
        assert!(world.raycast(Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 5.0, 0.0)).is_none());
    }

    #[test]
    fn test_origin_inside_box_hits_at_zero() {
        let world = floor();
        let hit = world
            .raycast(Vec3::new(0.0, -0.5, 0.0), Vec3::new(0.0, 0.0, 1.0))
            .expect("inside");
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.normal, Vec3::NEG_Z);
    }

    #[test]
    fn test_body_falls_and_lands() {
        let world = floor();
        let mut body = KinematicBody::default();
        let mut position = Vec3::new(0.0, 0.05, 0.0);
        body.velocity = Vec3::new(0.0, -5.0, 0.0);

        integrate_body(&mut body, &mut position, &world, 0.02);

        assert_eq!(body.ground_state, GroundState::OnGround);
        assert!(position.y.abs() < 1e-5, "y = {}", position.y);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_rising_body_leaves_ground() {
        let world = floor();
        let mut body = KinematicBody {
            ground_state: GroundState::OnGround,
            velocity: Vec3::new(0.0, 30.0, 0.0),
            ..default()
        };
        let mut position = Vec3::ZERO;

        integrate_body(&mut body, &mut position, &world, 0.02);

        assert_eq!(body.ground_state, GroundState::InAir);
        assert!((position.y - 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_wall_blocks_lateral_motion() {
        let world = floor().with_box(Vec3::new(-5.0, 0.0, 1.0), Vec3::new(5.0, 5.0, 2.0));
        let mut body = KinematicBody {
            velocity: Vec3::new(0.0, 0.0, 50.0),
            ..default()
        };
        let mut position = Vec3::new(0.0, 0.0, 0.0);

        integrate_body(&mut body, &mut position, &world, 0.1);

        assert!((position.z - 0.5).abs() < 1e-5, "z = {}", position.z);
        assert_eq!(body.velocity.z, 0.0);
    }
}
