//! Hostile agent module
//!
//! FSM: Patrol → Chase → Attack → Attacking.
//! - Patrol: обход waypoints по кругу, detection зона ловит игрока
//! - Chase: бег к игроку до attack distance
//! - Attack: хореография (игрок, камера, анимации) в процедуре
//! - Attacking: ждём внешний AttackConnected → kill sequence

use bevy::prelude::*;

pub mod choreography;
pub mod components;
pub mod events;
pub mod planner;
pub mod systems;


pub use choreography::{AttackChoreography, KillSequence};
pub use components::{AgentLinks, AgentState, AttackProgress, HostileAgent, PatrolRoute, PlayerDetection};
pub use events::{AttackBegan, AttackConnected, FootstepEvent, PlayerKilled};
pub use planner::{plan_agent_tick, AgentPlan};
pub use systems::{
    agent_fsm, resolve_attack_hits, shake_on_footstep, start_attack_choreography, track_player_detection,
};

use crate::OrchestrationSet;

/// Agent Plugin
///
/// Порядок выполнения (OrchestrationSet::Behavior):
/// 1. track_player_detection - ZoneEvent → PlayerDetection
/// 2. agent_fsm - тик FSM (steering, переходы)
/// 3. start_attack_choreography - AttackBegan → HUD / camera / процедура
/// 4. resolve_attack_hits - AttackConnected → kill sequence
/// 5. shake_on_footstep - FootstepEvent → CameraShake
pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<HostileAgent>()
            .register_type::<AgentState>()
            .register_type::<PatrolRoute>()
            .register_type::<AgentLinks>()
            .register_type::<PlayerDetection>()
            .add_event::<AttackBegan>()
            .add_event::<AttackConnected>()
            .add_event::<PlayerKilled>()
            .add_event::<FootstepEvent>()
            .add_systems(
                FixedUpdate,
                (
                    track_player_detection,
                    agent_fsm,
                    start_attack_choreography,
                    resolve_attack_hits,
                    shake_on_footstep,
                )
                    .chain()
                    .in_set(OrchestrationSet::Behavior),
            );
    }
}
