//! STRIDE Simulation Core
//!
//! Kinematic character locomotion на Bevy 0.16:
//! world-space input → velocity/стойка/перенос для swept-capsule body.
//!
//! Слои:
//! - locomotion: чистый per-tick алгоритм (не знает про ECS)
//! - physics: character body (headless AABB мир или Rapier) + raycast
//! - ai: NPC input producers
//! - components: archetype settings, display facing

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod components;
pub mod locomotion;
pub mod logger;
pub mod physics;

// Re-export базовых типов для удобства
pub use ai::{AIPlugin, Wander};
pub use components::*;
pub use locomotion::{
    step_locomotion, LocomotionSettings, LocomotionSignals, MovementState, PhysicsSnapshot,
    SettingsError, TickContext, TickOutput, WorldSpaceInput,
};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use physics::{
    spawn_kinematic_character, spawn_rapier_character, KinematicBody, KinematicControllerPlugin,
    PhysicsBackend, StaticWorld, WorldGravity,
};

/// Частота fixed tick'а симуляции
pub const SIMULATION_HZ: f64 = 50.0;

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationPlugin {
    pub backend: PhysicsBackend,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 50Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            .add_plugins((
                KinematicControllerPlugin {
                    backend: self.backend,
                },
                AIPlugin,
            ));

        // Детерминистичный RNG (seed по умолчанию), если caller не дал свой
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Headless backend, пустой `StaticWorld`: геометрию добавляет caller.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin::default());

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
