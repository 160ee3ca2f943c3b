//! Movement компоненты: archetype settings и визуальный facing

use bevy::prelude::*;
use std::sync::Arc;

use crate::locomotion::{LocomotionSettings, SettingsError};

/// Settings archetype'а персонажа
///
/// Один `Arc` на archetype: все NPC одного типа делят одни settings,
/// locomotion читает их read-only. Собирается только из settings,
/// прошедших `validate()`.
#[derive(Component, Debug, Clone)]
pub struct LocomotionArchetype(Arc<LocomotionSettings>);

impl Default for LocomotionArchetype {
    fn default() -> Self {
        Self(Arc::new(LocomotionSettings::default()))
    }
}

impl LocomotionArchetype {
    /// Проверяет settings и оборачивает в shared archetype
    pub fn new(settings: impl Into<Arc<LocomotionSettings>>) -> Result<Self, SettingsError> {
        let settings = settings.into();
        settings.validate()?;
        Ok(Self(settings))
    }

    pub fn settings(&self) -> &LocomotionSettings {
        &self.0
    }
}

/// Facing, который показываем игроку (rad, 0 = +Z)
///
/// Grounded: facing модели; в воздухе: input facing.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct DisplayFacing(pub f32);

impl DisplayFacing {
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.0)
    }
}

/// Entity визуального представления (mesh/rig), который поворачиваем по facing
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct DisplayRepr(pub Entity);
