//! Ground classifier: snapshot → grounded / airborne

use super::settings::LocomotionTuning;
use super::snapshot::{GroundState, PhysicsSnapshot};

/// Grounded только если стоим на не слишком крутой земле и не отрываемся вверх
/// быстрее самой земли (старт прыжка, подброс платформой).
pub fn is_grounded(snapshot: &PhysicsSnapshot, tuning: &LocomotionTuning) -> bool {
    let vertical = snapshot.vertical_velocity();
    snapshot.ground_state == GroundState::OnGround
        && (vertical.y - snapshot.ground_velocity.y) < tuning.grounded_vertical_tolerance
        && !snapshot.ground_too_steep
}
