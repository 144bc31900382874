//! Чистое решение FSM на один тик (без ECS).

use bevy::prelude::*;

use super::components::{AgentState, PatrolRoute};
use crate::config::AgentConfig;
use crate::error::OrchestrationError;
use crate::steering::{planar, planar_distance};

/// Что агент делает в этом тике
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPlan {
    pub state: AgentState,
    /// Индекс waypoint после тика
    pub waypoint: usize,
    /// Steering запрос (direction, speed); None - velocity не трогаем
    pub steer: Option<(Vec3, f32)>,
    pub begin_chase: bool,
    pub begin_attack: bool,
    /// Пропущенный шаг (логируется вызывающим)
    pub error: Option<OrchestrationError>,
}

impl AgentPlan {
    fn hold(state: AgentState, waypoint: usize) -> Self {
        Self {
            state,
            waypoint,
            steer: None,
            begin_chase: false,
            begin_attack: false,
            error: None,
        }
    }
}

pub fn plan_agent_tick(
    state: AgentState,
    config: &AgentConfig,
    position: Vec3,
    route: &PatrolRoute,
    player: Option<Vec3>,
    player_in_range: bool,
) -> AgentPlan {
    let mut plan = AgentPlan::hold(state, route.current);

    match state {
        AgentState::Patrol => {
            if route.waypoints.is_empty() {
                plan.error = Some(OrchestrationError::missing("patrol waypoints", "agent.patrol"));
            } else {
                let index = route.current % route.waypoints.len();
                let target = route.waypoints[index];

                plan.steer = Some((planar(target - position), config.patrol_speed));
                plan.waypoint = index;
                if planar_distance(position, target) <= config.waypoint_radius {
                    plan.waypoint = (index + 1) % route.waypoints.len();
                }
            }

            if player_in_range {
                if player.is_some() {
                    plan.state = AgentState::Chase;
                    plan.begin_chase = true;
                } else {
                    plan.error = Some(OrchestrationError::missing("player", "agent.detect"));
                }
            }
        }
        AgentState::Chase => {
            let Some(player) = player else {
                plan.error = Some(OrchestrationError::missing("player", "agent.chase"));
                return plan;
            };

            if planar_distance(position, player) <= config.attack_distance {
                plan.state = AgentState::Attack;
                plan.begin_attack = true;
            } else {
                plan.steer = Some((planar(player - position), config.chase_speed));
            }
        }
        // Attack: хореография в процедуре. Attacking: ждём внешний сигнал
        AgentState::Attack | AgentState::Attacking => {}
    }

    plan
}
