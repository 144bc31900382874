//! Steering / locomotion module
//!
//! Steering controller (чистый stepped-lerp) + locomotion системы, которые его
//! вызывают: player input, companion follower, интеграция velocity.

use bevy::prelude::*;

pub mod controller;
pub mod systems;


pub use controller::{
    apply_planar, look_rotation, planar, planar_distance, rotate_towards, SteeringRates, SteeringState,
};
pub use systems::{follow_leader, integrate_velocity, player_locomotion};

use crate::OrchestrationSet;

/// Steering Plugin
///
/// Порядок выполнения (OrchestrationSet::Locomotion, после tweens):
/// 1. player_locomotion - MovementInput → Velocity
/// 2. follow_leader - компаньон в free-roam
/// 3. integrate_velocity - Velocity → Transform
pub struct SteeringPlugin;

impl Plugin for SteeringPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (player_locomotion, follow_leader, integrate_velocity)
                .chain()
                .in_set(OrchestrationSet::Locomotion),
        );
    }
}
