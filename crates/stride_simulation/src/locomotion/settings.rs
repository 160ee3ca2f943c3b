//! Locomotion settings (per-archetype tuning)
//!
//! Загружаются один раз (TOML или Default), валидируются при загрузке.
//! Runtime tick никогда не проверяет settings повторно: всё что может
//! дать NaN/недостижимый порог отсекается здесь.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Ошибки конфигурации locomotion
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{field} must be finite and non-negative, got {value}")]
    NegativeOrNonFinite { field: &'static str, value: f32 },

    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("grounded_turn_speeds is empty")]
    NoTurnSpeedContexts,

    #[error("grounded_turn_speeds[{index}].max_speed_of_context ({value}) must be greater than the previous context ({previous})")]
    UnsortedTurnSpeedContexts { index: usize, value: f32, previous: f32 },

    #[error("last turn speed context covers up to {covered} but stance speed reaches {required}")]
    UnreachableStanceSpeed { covered: f32, required: f32 },

    #[error("turnaround_back_angle_deg must be within [0, 360), got {0}")]
    TurnaroundAngleOutOfRange(f32),

    #[error("{0} table is empty")]
    EmptyTable(&'static str),

    #[error("ledge_search_fractions must be ascending values in [0, 1], got {0:?}")]
    BadSearchFractions(Vec<f32>),

    #[error("wall_jump_ray_count must be at least 1")]
    NoWallJumpRays,

    #[error("failed to parse locomotion settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read locomotion settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Turn speed для диапазона grounded скорости
///
/// Контексты упорядочены; берётся первый, чей `max_speed_of_context >= speed`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnSpeedContext {
    /// rad/s
    pub turn_speed: f32,
    pub max_speed_of_context: f32,
}

/// Геометрия ledge-climb / wall-jump проб
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Доп. высоты над серединой капсулы для reach-empty теста
    pub reach_extra_heights: Vec<f32>,
    /// Интерполяция между min (radius) и max длиной поиска уступа
    pub ledge_search_fractions: Vec<f32>,
    pub max_ledge_search_length: f32,
    pub wall_jump_ray_count: u32,
    pub wall_jump_ray_length: f32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            reach_extra_heights: vec![0.0, 0.5, 1.0, 1.5],
            ledge_search_fractions: vec![0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0],
            max_ledge_search_length: 1.5,
            wall_jump_ray_count: 9,
            wall_jump_ray_length: 1.5,
        }
    }
}

/// Пороговые константы контроллера
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionTuning {
    /// Turn speed выше порога = мгновенный поворот, turnaround не включается
    pub quick_turn_threshold: f32,
    /// Конус "назад": turnaround срабатывает при |delta| > 180° − angle/2
    pub turnaround_back_angle_deg: f32,
    /// Допуск (vertical − ground).y для grounded классификации
    pub grounded_vertical_tolerance: f32,
    /// Ниже этой длины input/velocity считаются нулевыми
    pub input_epsilon: f32,
    /// allow_sliding только когда grounded speed больше этого
    pub sliding_speed_epsilon: f32,
    /// Порог |input| для animator сигнала is_moving
    pub moving_input_threshold: f32,
    pub probes: ProbeSettings,
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        Self {
            quick_turn_threshold: 1000.0,
            turnaround_back_angle_deg: 45.0,
            grounded_vertical_tolerance: 0.1,
            input_epsilon: 1e-6,
            sliding_speed_epsilon: 1e-6,
            moving_input_threshold: 0.5,
            probes: ProbeSettings::default(),
        }
    }
}

impl LocomotionTuning {
    /// Минимальный |delta| (rad) для входа в turnaround
    pub fn turnaround_trigger_angle(&self) -> f32 {
        (180.0 - self.turnaround_back_angle_deg * 0.5).to_radians()
    }
}

/// Settings одного archetype персонажа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionSettings {
    pub crouched_speed: f32,
    pub standing_speed: f32,
    pub grounded_acceleration: f32,
    pub grounded_deceleration: f32,
    pub grounded_turn_speeds: Vec<TurnSpeedContext>,
    pub airborne_acceleration: f32,
    /// rad/s
    pub airborne_turn_speed: f32,
    pub jump_speed: f32,
    pub tuning: LocomotionTuning,
}

impl Default for LocomotionSettings {
    fn default() -> Self {
        let crouched_speed = 5.0;
        let standing_speed = 15.0;
        Self {
            crouched_speed,
            standing_speed,
            grounded_acceleration: 80.0,
            grounded_deceleration: 120.0,
            grounded_turn_speeds: vec![
                TurnSpeedContext { turn_speed: 1_000_000.0, max_speed_of_context: crouched_speed + 0.1 },
                TurnSpeedContext { turn_speed: 10.0, max_speed_of_context: standing_speed + 0.1 },
                TurnSpeedContext { turn_speed: 5.0, max_speed_of_context: 50.0 },
            ],
            airborne_acceleration: 60.0,
            airborne_turn_speed: 7.5,
            jump_speed: 30.0,
            tuning: LocomotionTuning::default(),
        }
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::NegativeOrNonFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::NotPositive { field, value })
    }
}

impl LocomotionSettings {
    /// Парсинг + валидация
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Скорость стойки (crouched / standing)
    pub fn stance_speed(&self, crouched: bool) -> f32 {
        if crouched {
            self.crouched_speed
        } else {
            self.standing_speed
        }
    }

    /// Первый контекст с `max_speed_of_context >= speed`; 0.0 если ни один не покрывает
    pub fn grounded_turn_speed(&self, speed: f32) -> f32 {
        self.grounded_turn_speeds
            .iter()
            .find(|context| speed <= context.max_speed_of_context)
            .map(|context| context.turn_speed)
            .unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        non_negative("crouched_speed", self.crouched_speed)?;
        non_negative("standing_speed", self.standing_speed)?;
        non_negative("grounded_acceleration", self.grounded_acceleration)?;
        non_negative("grounded_deceleration", self.grounded_deceleration)?;
        non_negative("airborne_acceleration", self.airborne_acceleration)?;
        non_negative("airborne_turn_speed", self.airborne_turn_speed)?;
        non_negative("jump_speed", self.jump_speed)?;

        if self.grounded_turn_speeds.is_empty() {
            return Err(SettingsError::NoTurnSpeedContexts);
        }
        let mut previous: Option<f32> = None;
        for (index, context) in self.grounded_turn_speeds.iter().enumerate() {
            non_negative("grounded_turn_speeds.turn_speed", context.turn_speed)?;
            non_negative("grounded_turn_speeds.max_speed_of_context", context.max_speed_of_context)?;
            if let Some(previous) = previous {
                if context.max_speed_of_context <= previous {
                    return Err(SettingsError::UnsortedTurnSpeedContexts {
                        index,
                        value: context.max_speed_of_context,
                        previous,
                    });
                }
            }
            previous = Some(context.max_speed_of_context);
        }
        let required = self.crouched_speed.max(self.standing_speed);
        let covered = previous.unwrap_or(0.0);
        if covered < required {
            return Err(SettingsError::UnreachableStanceSpeed { covered, required });
        }

        let tuning = &self.tuning;
        non_negative("quick_turn_threshold", tuning.quick_turn_threshold)?;
        if !(0.0..360.0).contains(&tuning.turnaround_back_angle_deg) {
            return Err(SettingsError::TurnaroundAngleOutOfRange(tuning.turnaround_back_angle_deg));
        }
        non_negative("grounded_vertical_tolerance", tuning.grounded_vertical_tolerance)?;
        positive("input_epsilon", tuning.input_epsilon)?;
        non_negative("sliding_speed_epsilon", tuning.sliding_speed_epsilon)?;
        non_negative("moving_input_threshold", tuning.moving_input_threshold)?;

        let probes = &tuning.probes;
        if probes.reach_extra_heights.is_empty() {
            return Err(SettingsError::EmptyTable("reach_extra_heights"));
        }
        for &height in &probes.reach_extra_heights {
            non_negative("reach_extra_heights", height)?;
        }
        if probes.ledge_search_fractions.is_empty() {
            return Err(SettingsError::EmptyTable("ledge_search_fractions"));
        }
        let fractions_ok = probes
            .ledge_search_fractions
            .iter()
            .all(|f| (0.0..=1.0).contains(f))
            && probes.ledge_search_fractions.windows(2).all(|w| w[0] <= w[1]);
        if !fractions_ok {
            return Err(SettingsError::BadSearchFractions(probes.ledge_search_fractions.clone()));
        }
        positive("max_ledge_search_length", probes.max_ledge_search_length)?;
        if probes.wall_jump_ray_count == 0 {
            return Err(SettingsError::NoWallJumpRays);
        }
        positive("wall_jump_ray_length", probes.wall_jump_ray_length)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = LocomotionSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.standing_speed, 15.0);
        assert_eq!(settings.grounded_turn_speeds.len(), 3);
        assert_eq!(settings.tuning.probes.wall_jump_ray_count, 9);
    }

    #[test]
    fn test_turn_speed_first_match_wins() {
        let settings = LocomotionSettings::default();
        // 0 ≤ 5.1 → quick-turn контекст
        assert_eq!(settings.grounded_turn_speed(0.0), 1_000_000.0);
        assert_eq!(settings.grounded_turn_speed(5.1), 1_000_000.0);
        assert_eq!(settings.grounded_turn_speed(12.0), 10.0);
        assert_eq!(settings.grounded_turn_speed(40.0), 5.0);
        // Выше всех контекстов → 0 (поворот заморожен)
        assert_eq!(settings.grounded_turn_speed(80.0), 0.0);
    }

    #[test]
    fn test_turnaround_trigger_angle() {
        let tuning = LocomotionTuning::default();
        assert!((tuning.turnaround_trigger_angle() - 157.5f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_negative_deceleration() {
        let settings = LocomotionSettings {
            grounded_deceleration: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::NegativeOrNonFinite { field: "grounded_deceleration", .. })
        ));
    }

    #[test]
    fn test_rejects_unsorted_contexts() {
        let mut settings = LocomotionSettings::default();
        settings.grounded_turn_speeds.swap(0, 1);
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::UnsortedTurnSpeedContexts { index: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_unreachable_stance_speed() {
        let settings = LocomotionSettings {
            standing_speed: 60.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::UnreachableStanceSpeed { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_probe_tables() {
        let mut settings = LocomotionSettings::default();
        settings.tuning.probes.ledge_search_fractions = vec![0.0, 1.5];
        assert!(matches!(settings.validate(), Err(SettingsError::BadSearchFractions(_))));

        let mut settings = LocomotionSettings::default();
        settings.tuning.probes.reach_extra_heights.clear();
        assert!(matches!(settings.validate(), Err(SettingsError::EmptyTable("reach_extra_heights"))));

        let mut settings = LocomotionSettings::default();
        settings.tuning.probes.wall_jump_ray_count = 0;
        assert!(matches!(settings.validate(), Err(SettingsError::NoWallJumpRays)));
    }

    #[test]
    fn test_toml_partial_override() {
        let settings = LocomotionSettings::from_toml_str(
            r#"
            jump_speed = 22.5
            airborne_turn_speed = 4.0

            [tuning]
            quick_turn_threshold = 500.0
            "#,
        )
        .expect("valid TOML");

        assert_eq!(settings.jump_speed, 22.5);
        assert_eq!(settings.airborne_turn_speed, 4.0);
        assert_eq!(settings.tuning.quick_turn_threshold, 500.0);
        // Остальное из Default
        assert_eq!(settings.standing_speed, 15.0);
        assert_eq!(settings.tuning.probes.max_ledge_search_length, 1.5);
    }

    #[test]
    fn test_toml_invalid_values_rejected() {
        let result = LocomotionSettings::from_toml_str("grounded_acceleration = -80.0");
        assert!(result.is_err());

        let result = LocomotionSettings::from_toml_str("jump_speed = \"high\"");
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_toml_roundtrip_keeps_defaults() {
        let settings = LocomotionSettings::default();
        let text = settings.to_toml_string().expect("serializable");
        let parsed = LocomotionSettings::from_toml_str(&text).expect("parsable");
        assert_eq!(parsed, settings);
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let settings = LocomotionSettings::from_toml_str(include_str!("../../config/default_locomotion.toml"))
            .expect("shipped config");
        let defaults = LocomotionSettings::default();
        assert_eq!(settings.standing_speed, defaults.standing_speed);
        assert_eq!(settings.grounded_turn_speeds.len(), defaults.grounded_turn_speeds.len());
        assert_eq!(settings.tuning.probes.wall_jump_ray_count, 9);
    }
}
