//! ECS Components, общие для нескольких доменов
//!
//! Организация:
//! - actor: игрок, компаньон, locomotion toggle, steering authority, animator params
//! - view: viewpoint, camera follow/shake, UI panels, scalar channels, hit effect

pub mod actor;
pub mod view;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod actor_tests;

// Re-exports для удобного импорта
pub use actor::*;
pub use view::*;
