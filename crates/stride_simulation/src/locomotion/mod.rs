//! Kinematic character locomotion
//!
//! Per-tick алгоритм: world-space intent → velocity для swept-capsule body.
//! Содержит:
//! - classifier (grounded / airborne)
//! - grounded модель (turn rate, speed ramp, turnaround, jump/crouch)
//! - airborne модель (velocity blending, свободный поворот)
//! - ledge-climb и wall-jump пробы
//! - composer (вклады + gravity → physics primitive)
//!
//! Чистая функция `step_locomotion` не знает про ECS: её одинаково зовут
//! bevy системы (physics::movement) и тесты.

pub mod airborne;
pub mod angle;
pub mod classifier;
pub mod composer;
pub mod controller;
pub mod grounded;
pub mod input;
pub mod ledge_climb;
pub mod probe;
pub mod settings;
pub mod snapshot;
pub mod state;
pub mod wall_jump;

pub use composer::{apply_to_body, LocomotionSignals, TickOutput, VelocityContributions};
pub use controller::{step_locomotion, TickContext};
pub use input::WorldSpaceInput;
pub use settings::{LocomotionSettings, LocomotionTuning, ProbeSettings, SettingsError, TurnSpeedContext};
pub use snapshot::{CapsuleGeometry, GroundState, PhysicsSnapshot};
pub use state::{AirborneState, GroundedState, MovementState};
