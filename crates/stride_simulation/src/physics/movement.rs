//! Kinematic контроллер для NPC/игрока
//!
//! Архитектура:
//! - locomotion tick (чистая функция) решает velocity/стойку/перенос
//! - physics primitive резолвит коллизии: headless integrator или Rapier
//! - gravity добавляет locomotion, не primitive
//!
//! Детерминизм: fixed timestep, dt берётся из `Time<Fixed>::timestep()`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::body::{BodyView, CharacterBody, KinematicBody};
use super::headless::{integrate_headless_bodies, StaticWorld};
use super::rapier::{
    capsule_collider, push_rapier_motion, sync_rapier_bodies, AppliedStance, RapierStaticRaycast,
};
use super::raycast::Raycast;
use super::WorldGravity;
use crate::components::{DisplayFacing, DisplayRepr, LocomotionArchetype};
use crate::locomotion::{
    apply_to_body, step_locomotion, CapsuleGeometry, LocomotionSignals, MovementState,
    TickContext, WorldSpaceInput,
};

/// Кто резолвит коллизии character body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhysicsBackend {
    /// AABB `StaticWorld` + встроенный integrator (тесты, headless bin)
    #[default]
    Headless,
    /// KinematicCharacterController (Rapier step в fixed schedule)
    Rapier,
}

/// Все системы контроллера (input producers ставятся `.before(LocomotionSet)`)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocomotionSet;

/// Компоненты персонажа, которые трогает locomotion tick
type LocomotionItem = (
    &'static LocomotionArchetype,
    &'static WorldSpaceInput,
    &'static mut MovementState,
    &'static mut KinematicBody,
    &'static mut Transform,
    &'static mut LocomotionSignals,
    &'static mut DisplayFacing,
);

/// Один tick одного персонажа: snapshot → locomotion → body
///
/// Transform пишется обратно только при реальном изменении (ledge climb),
/// иначе change detection дёргал бы Rapier каждый tick.
#[allow(clippy::too_many_arguments)]
fn tick_character<R: Raycast + ?Sized>(
    archetype: &LocomotionArchetype,
    input: &WorldSpaceInput,
    state: &mut MovementState,
    body: &mut KinematicBody,
    transform: &mut Mut<Transform>,
    signals: &mut LocomotionSignals,
    facing: &mut DisplayFacing,
    raycast: &R,
    world_gravity: Vec3,
    dt: f32,
) {
    let mut local = **transform;
    let mut view = BodyView {
        body,
        transform: &mut local,
        headroom: raycast,
    };

    let snapshot = view.fetch_status();
    let ctx = TickContext {
        settings: archetype.settings(),
        world_gravity,
        dt,
        raycast,
    };
    let output = step_locomotion(state, input, &snapshot, &ctx);
    apply_to_body(&output, &mut view);

    *state = output.state;
    *signals = output.signals;
    facing.0 = output.display_facing_angle;

    if local != **transform {
        **transform = local;
    }
}

/// Система: locomotion tick (headless backend)
///
/// Работает в FixedUpdate до интеграции. Персонажи независимы → par_iter.
pub fn drive_locomotion_headless(
    world: Res<StaticWorld>,
    gravity: Res<WorldGravity>,
    time: Res<Time<Fixed>>,
    mut query: Query<LocomotionItem>,
) {
    let dt = time.timestep().as_secs_f32();
    let world = world.into_inner();
    let world_gravity = gravity.0;

    query.par_iter_mut().for_each(
        |(archetype, input, mut state, mut body, mut transform, mut signals, mut facing)| {
            tick_character(
                archetype,
                input,
                &mut state,
                &mut body,
                &mut transform,
                &mut signals,
                &mut facing,
                world,
                world_gravity,
                dt,
            );
        },
    );
}

/// Система: locomotion tick (Rapier backend)
pub fn drive_locomotion_rapier(
    read_rapier_context: ReadRapierContext,
    gravity: Res<WorldGravity>,
    time: Res<Time<Fixed>>,
    mut query: Query<LocomotionItem>,
) -> Result {
    let rapier_context = read_rapier_context.single()?;
    let raycast = RapierStaticRaycast {
        context: &rapier_context,
    };
    let dt = time.timestep().as_secs_f32();

    for (archetype, input, mut state, mut body, mut transform, mut signals, mut facing) in
        query.iter_mut()
    {
        tick_character(
            archetype,
            input,
            &mut state,
            &mut body,
            &mut transform,
            &mut signals,
            &mut facing,
            &raycast,
            gravity.0,
            dt,
        );
    }

    Ok(())
}

/// Система: текущие нажатия → prev-флаги (после locomotion)
pub fn latch_world_space_input(mut query: Query<&mut WorldSpaceInput>) {
    for mut input in query.iter_mut() {
        input.latch();
    }
}

/// Система: DisplayFacing → rotation визуального представления
pub fn apply_display_facing(
    characters: Query<(&DisplayFacing, &DisplayRepr)>,
    mut visuals: Query<&mut Transform, Without<DisplayFacing>>,
) {
    for (facing, repr) in characters.iter() {
        if let Ok(mut transform) = visuals.get_mut(repr.0) {
            let rotation = facing.rotation();
            if transform.rotation != rotation {
                transform.rotation = rotation;
            }
        }
    }
}

/// Plugin для kinematic контроллера
///
/// Регистрирует все системы в FixedUpdate для детерминизма.
/// Порядок: (sync Rapier) → locomotion → интеграция/push → latch input → display.
#[derive(Debug, Clone, Copy, Default)]
pub struct KinematicControllerPlugin {
    pub backend: PhysicsBackend,
}

impl Plugin for KinematicControllerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<KinematicBody>()
            .register_type::<MovementState>()
            .register_type::<WorldSpaceInput>()
            .register_type::<LocomotionSignals>()
            .register_type::<DisplayFacing>()
            .register_type::<DisplayRepr>()
            .init_resource::<WorldGravity>();

        match self.backend {
            PhysicsBackend::Headless => {
                app.init_resource::<StaticWorld>().add_systems(
                    FixedUpdate,
                    (
                        drive_locomotion_headless,
                        integrate_headless_bodies,
                        latch_world_space_input,
                        apply_display_facing,
                    )
                        .chain()
                        .in_set(LocomotionSet),
                );
            }
            PhysicsBackend::Rapier => {
                use bevy_rapier3d::plugin::PhysicsSet;

                // Наши системы запускаются ДО rapier physics step
                app.register_type::<AppliedStance>().add_systems(
                    FixedUpdate,
                    (
                        sync_rapier_bodies,
                        drive_locomotion_rapier,
                        push_rapier_motion,
                        latch_world_space_input,
                        apply_display_facing,
                    )
                        .chain()
                        .in_set(LocomotionSet)
                        .before(PhysicsSet::SyncBackend),
                );
            }
        }
    }
}

/// Spawn helper для создания kinematic персонажа (headless backend)
///
/// Создает entity с полным набором компонентов locomotion:
/// - Transform (позиция ног) + KinematicBody
/// - MovementState / WorldSpaceInput / LocomotionSignals / DisplayFacing
/// - LocomotionArchetype (shared, уже проверенные settings)
pub fn spawn_kinematic_character(
    commands: &mut Commands,
    position: Vec3,
    facing_angle: f32,
    archetype: LocomotionArchetype,
) -> Entity {
    let state = MovementState::facing(facing_angle);

    commands
        .spawn((
            Transform::from_translation(position),
            KinematicBody::default(),
            state,
            WorldSpaceInput::default(),
            LocomotionSignals::default(),
            DisplayFacing(state.grounded.facing_angle),
            archetype,
        ))
        .id()
}

/// То же + Rapier: KinematicPositionBased тело, капсула, character controller
pub fn spawn_rapier_character(
    commands: &mut Commands,
    position: Vec3,
    facing_angle: f32,
    archetype: LocomotionArchetype,
) -> Entity {
    let entity = spawn_kinematic_character(commands, position, facing_angle, archetype);
    let capsule = CapsuleGeometry::default();

    commands.entity(entity).insert((
        RigidBody::KinematicPositionBased,
        capsule_collider(&capsule, false),
        KinematicCharacterController::default(),
        AppliedStance::default(),
    ));

    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locomotion::GroundState;

    fn flat_world() -> StaticWorld {
        StaticWorld::new().with_box(Vec3::new(-50.0, -1.0, -50.0), Vec3::new(50.0, 0.0, 50.0))
    }

    fn headless_app(world: StaticWorld) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(Time::<Fixed>::from_hz(50.0))
            .add_plugins(KinematicControllerPlugin::default())
            .insert_resource(world);
        app
    }

    #[test]
    fn test_character_settles_on_ground() {
        let mut app = headless_app(flat_world());
        let entity = app
            .world_mut()
            .spawn((
                Transform::from_translation(Vec3::new(0.0, 0.01, 0.0)),
                KinematicBody::default(),
                MovementState::default(),
                WorldSpaceInput::default(),
                LocomotionSignals::default(),
                DisplayFacing::default(),
                LocomotionArchetype::default(),
            ))
            .id();

        for _ in 0..3 {
            app.world_mut().run_schedule(FixedUpdate);
        }

        let body = app.world().get::<KinematicBody>(entity).expect("body");
        assert_eq!(body.ground_state, GroundState::OnGround);
        let transform = app.world().get::<Transform>(entity).expect("transform");
        assert!(transform.translation.y.abs() < 1e-4);
    }

    #[test]
    fn test_input_latched_after_tick() {
        let mut app = headless_app(flat_world());
        let entity = app
            .world_mut()
            .spawn((
                Transform::default(),
                KinematicBody::default(),
                MovementState::default(),
                WorldSpaceInput::default().with_presses(true, false),
                LocomotionSignals::default(),
                DisplayFacing::default(),
                LocomotionArchetype::default(),
            ))
            .id();

        app.world_mut().run_schedule(FixedUpdate);

        let input = app.world().get::<WorldSpaceInput>(entity).expect("input");
        assert!(input.prev_jump_pressed);
        assert!(!input.on_jump_press());
    }

    #[test]
    fn test_display_repr_follows_facing() {
        let mut app = headless_app(flat_world());
        let visual = app.world_mut().spawn(Transform::default()).id();
        app.world_mut().spawn((
            Transform::default(),
            KinematicBody::default(),
            MovementState::facing(std::f32::consts::FRAC_PI_2),
            WorldSpaceInput::default(),
            LocomotionSignals::default(),
            DisplayFacing::default(),
            DisplayRepr(visual),
            LocomotionArchetype::default(),
        ));

        app.world_mut().run_schedule(FixedUpdate);

        let transform = app.world().get::<Transform>(visual).expect("visual");
        let forward = transform.rotation * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-4, "forward = {:?}", forward);
    }
}
