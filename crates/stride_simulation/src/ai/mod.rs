//! NPC input producers
//!
//! AI пишет тот же `WorldSpaceInput`, что и игрок; locomotion не различает их.

use bevy::prelude::*;

use crate::physics::LocomotionSet;

pub mod wander;

// Re-export основных типов
pub use wander::{drive_wander_input, Wander};

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate строго до locomotion.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Wander>()
            .add_systems(FixedUpdate, drive_wander_input.before(LocomotionSet));
    }
}
