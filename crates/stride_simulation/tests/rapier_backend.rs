//! Rapier backend end-to-end: KinematicCharacterController как physics primitive
//!
//! Rapier step в fixed schedule, тики гоняем через `FixedMain` напрямую:
//! locomotion системы и physics step идут в одном FixedUpdate.

use bevy::app::FixedMain;
use bevy::prelude::*;
use bevy_rapier3d::plugin::TimestepMode;
use bevy_rapier3d::prelude::*;

use stride_simulation::locomotion::{GroundState, WorldSpaceInput};
use stride_simulation::{
    spawn_rapier_character, KinematicBody, LocomotionArchetype, LocomotionSignals, PhysicsBackend,
    SimulationPlugin, SIMULATION_HZ,
};

fn rapier_app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        // dt шага не зависит от wall clock
        .insert_resource(TimestepMode::Fixed {
            dt: 1.0 / SIMULATION_HZ as f32,
            substeps: 1,
        })
        .add_plugins((
            RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule(),
            SimulationPlugin {
                backend: PhysicsBackend::Rapier,
            },
        ));
    app.finish();
    app.cleanup();

    // Startup: default RapierContext
    app.update();
    app
}

fn spawn_fixed_box(app: &mut App, center: Vec3, half_extents: Vec3) {
    app.world_mut().spawn((
        Transform::from_translation(center),
        RigidBody::Fixed,
        Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
    ));
}

fn spawn_floor(app: &mut App) {
    spawn_fixed_box(app, Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0));
}

fn spawn_character(app: &mut App, position: Vec3) -> Entity {
    let world = app.world_mut();
    let entity = {
        let mut commands = world.commands();
        spawn_rapier_character(&mut commands, position, 0.0, LocomotionArchetype::default())
    };
    world.flush();
    entity
}

fn run_ticks(app: &mut App, count: usize) {
    for _ in 0..count {
        app.world_mut().run_schedule(FixedMain);
    }
}

fn set_input(app: &mut App, entity: Entity, input: WorldSpaceInput) {
    app.world_mut().entity_mut(entity).insert(input);
}

fn ground_state(app: &App, entity: Entity) -> GroundState {
    app.world().get::<KinematicBody>(entity).expect("body").ground_state
}

fn feet(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).expect("transform").translation
}

#[test]
fn test_character_settles_on_flat_floor() {
    let mut app = rapier_app();
    spawn_floor(&mut app);
    let entity = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));

    run_ticks(&mut app, 60);

    assert_eq!(ground_state(&app, entity), GroundState::OnGround);
    let position = feet(&app, entity);
    assert!(position.y.abs() < 0.1, "feet = {:?}", position);
    let signals = app.world().get::<LocomotionSignals>(entity).expect("signals");
    assert!(signals.is_grounded);
}

#[test]
fn test_running_on_flat_floor_stays_grounded() {
    let mut app = rapier_app();
    spawn_floor(&mut app);
    let entity = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));
    run_ticks(&mut app, 60);

    set_input(&mut app, entity, WorldSpaceInput::from_direction(Vec3::Z));
    for _ in 0..50 {
        run_ticks(&mut app, 1);
        assert_eq!(ground_state(&app, entity), GroundState::OnGround);
        let signals = app.world().get::<LocomotionSignals>(entity).expect("signals");
        assert!(signals.is_grounded && signals.is_moving);
    }

    let position = feet(&app, entity);
    assert!(position.z > 1.0, "feet = {:?}", position);
    assert!(position.y.abs() < 0.1, "feet = {:?}", position);
}

#[test]
fn test_jump_press_launches_upward() {
    let mut app = rapier_app();
    spawn_floor(&mut app);
    let entity = spawn_character(&mut app, Vec3::new(0.0, 1.0, 0.0));
    run_ticks(&mut app, 60);
    let rest = feet(&app, entity);

    set_input(&mut app, entity, WorldSpaceInput::default().with_presses(true, false));
    run_ticks(&mut app, 1);

    let signals = *app.world().get::<LocomotionSignals>(entity).expect("signals");
    assert!(signals.on_jump);
    let body = app.world().get::<KinematicBody>(entity).expect("body");
    assert!(body.velocity.y > 0.0, "velocity = {:?}", body.velocity);

    set_input(&mut app, entity, WorldSpaceInput::default());
    run_ticks(&mut app, 3);

    let position = feet(&app, entity);
    assert!(position.y > rest.y + 0.5, "rest = {:?}, now = {:?}", rest, position);
    assert_eq!(ground_state(&app, entity), GroundState::InAir);
}

#[test]
fn test_ledge_climb_relocates_transform() {
    let mut app = rapier_app();
    // Верх уступа на высоте капсулы (2.0), стена в 0.4 от силуэта; пола нет
    spawn_fixed_box(&mut app, Vec3::new(0.0, 0.5, 2.95), Vec3::new(10.0, 1.5, 2.05));
    let entity = spawn_character(&mut app, Vec3::new(0.0, 0.25, 0.0));

    // Коллайдеры попадают в query pipeline после первого step
    run_ticks(&mut app, 2);
    assert_eq!(ground_state(&app, entity), GroundState::InAir);

    set_input(
        &mut app,
        entity,
        WorldSpaceInput::from_direction(Vec3::Z).with_presses(true, false),
    );
    run_ticks(&mut app, 1);

    let signals = *app.world().get::<LocomotionSignals>(entity).expect("signals");
    assert!(signals.on_ledge_climb);
    let position = feet(&app, entity);
    assert!(
        (position - Vec3::new(0.0, 2.0, 1.5)).length() < 0.1,
        "feet = {:?}",
        position
    );

    set_input(&mut app, entity, WorldSpaceInput::default());
    run_ticks(&mut app, 20);

    assert_eq!(ground_state(&app, entity), GroundState::OnGround);
    let position = feet(&app, entity);
    assert!((position.y - 2.0).abs() < 0.1, "feet = {:?}", position);
}
