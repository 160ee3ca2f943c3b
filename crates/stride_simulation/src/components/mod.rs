//! ECS Components персонажа, не относящиеся к самому алгоритму
//!
//! Организация по доменам:
//! - movement: archetype settings, display facing, визуальное представление

pub mod movement;

pub use movement::*;
