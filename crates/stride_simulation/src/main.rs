//! Headless симуляция STRIDE
//!
//! Полоса препятствий (пол, уступ, стена) + бродящие NPC.
//! Usage: stride_simulation [settings.toml]

use bevy::prelude::*;
use stride_simulation::{
    create_headless_app, log_error, log_info, spawn_kinematic_character, KinematicBody,
    LocomotionArchetype, LocomotionSettings, LocomotionSignals, StaticWorld, Wander,
};

const NPC_COUNT: usize = 8;
const TICK_COUNT: usize = 1000;

fn obstacle_course() -> StaticWorld {
    StaticWorld::new()
        // Пол
        .with_box(Vec3::new(-40.0, -1.0, -40.0), Vec3::new(40.0, 0.0, 40.0))
        // Уступ высотой 2м
        .with_box(Vec3::new(-10.0, 0.0, 8.0), Vec3::new(10.0, 2.0, 14.0))
        // Стена
        .with_box(Vec3::new(-20.0, 0.0, -12.0), Vec3::new(20.0, 12.0, -11.0))
}

fn load_archetype() -> Result<LocomotionArchetype, stride_simulation::SettingsError> {
    let settings = match std::env::args().nth(1) {
        Some(path) => {
            log_info(&format!("Loading locomotion settings from {}", path));
            LocomotionSettings::load(path)?
        }
        None => LocomotionSettings::default(),
    };
    LocomotionArchetype::new(settings)
}

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    log_info(&format!("Starting STRIDE headless simulation (seed: {})", seed));

    let archetype = match load_archetype() {
        Ok(archetype) => {
            let settings = archetype.settings();
            log_info(&format!(
                "Locomotion settings accepted (standing {} m/s, jump {} m/s)",
                settings.standing_speed, settings.jump_speed
            ));
            archetype
        }
        Err(err) => {
            log_error(&format!("Invalid locomotion settings: {}", err));
            std::process::exit(1);
        }
    };

    app.insert_resource(obstacle_course());

    let world = app.world_mut();
    {
        let mut commands = world.commands();
        for i in 0..NPC_COUNT {
            let x = (i as f32 - NPC_COUNT as f32 * 0.5) * 3.0;
            let entity = spawn_kinematic_character(
                &mut commands,
                Vec3::new(x, 0.0, 0.0),
                0.0,
                archetype.clone(),
            );
            commands.entity(entity).insert(Wander::default());
        }
    }
    world.flush();

    for tick in 0..TICK_COUNT {
        app.world_mut().run_schedule(FixedUpdate);

        if tick % 100 == 0 {
            let world = app.world_mut();
            let mut query = world.query::<(&Transform, &KinematicBody, &LocomotionSignals)>();
            let airborne = query.iter(world).filter(|(_, _, s)| !s.is_grounded).count();
            let highest = query
                .iter(world)
                .map(|(t, _, _)| t.translation.y)
                .fold(f32::NEG_INFINITY, f32::max);
            log_info(&format!(
                "Tick {}: {} airborne, highest feet y = {:.2}",
                tick, airborne, highest
            ));
        }
    }

    log_info("Simulation complete!");
}
