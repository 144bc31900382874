//! Hostile agent systems (detection tracking, FSM tick, attack / kill / footsteps).

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::choreography::{AttackChoreography, KillSequence};
use super::components::{AgentLinks, AgentState, AttackProgress, HostileAgent, PatrolRoute, PlayerDetection};
use super::events::{AttackBegan, AttackConnected, FootstepEvent};
use super::planner::plan_agent_tick;
use crate::components::{AnimatorParams, CameraFollow, CameraShake, UiPanel};
use crate::coroutine::Coroutines;
use crate::error::OrchestrationError;
use crate::steering::{apply_planar, rotate_towards, SteeringRates, SteeringState};
use crate::zone::{ZoneEdge, ZoneEvent};

/// Система: PlayerDetection из ZoneEvent
///
/// Detection зона висит на самом агенте (Zone с фильтром Player).
pub fn track_player_detection(
    mut zone_events: EventReader<ZoneEvent>,
    mut agents: Query<(&AgentLinks, &mut PlayerDetection), With<HostileAgent>>,
) {
    for event in zone_events.read() {
        let Ok((links, mut detection)) = agents.get_mut(event.zone) else {
            continue;
        };
        if links.player != Some(event.subject) {
            continue;
        }

        detection.player_in_range = event.edge == ZoneEdge::Entered;
        crate::log(&format!(
            "Agent {:?}: player {}",
            event.zone,
            if detection.player_in_range { "detected" } else { "left detection zone" }
        ));
    }
}

/// Система: FSM тик агента
///
/// Чистое решение (`plan_agent_tick`) → steering / animator / AttackBegan.
pub fn agent_fsm(
    time: Res<Time<Fixed>>,
    mut agents: Query<(
        Entity,
        &HostileAgent,
        &mut AgentState,
        &mut PatrolRoute,
        &PlayerDetection,
        &AgentLinks,
        &mut SteeringState,
        &mut Velocity,
        &mut Transform,
        &mut AnimatorParams,
    )>,
    targets: Query<&Transform, Without<HostileAgent>>,
    mut attack_events: EventWriter<AttackBegan>,
) {
    let delta = time.delta_secs();

    for (entity, agent, mut state, mut route, detection, links, mut steering, mut velocity, mut transform, mut animator) in
        agents.iter_mut()
    {
        let config = &agent.config;
        let player_position = links
            .player
            .and_then(|player| targets.get(player).ok())
            .map(|t| t.translation);

        let plan = plan_agent_tick(
            *state,
            config,
            transform.translation,
            &route,
            player_position,
            detection.player_in_range,
        );

        if let Some(err) = &plan.error {
            err.report();
        }

        if route.current != plan.waypoint {
            route.current = plan.waypoint;
            crate::log(&format!("Agent {:?}: next waypoint {}", entity, plan.waypoint));
        }

        if let Some((direction, speed)) = plan.steer {
            let rates = SteeringRates::new(config.acceleration, config.deceleration);
            let planar_velocity = steering.update(direction, speed, rates, delta);
            apply_planar(&mut velocity.linvel, planar_velocity);
            transform.rotation = rotate_towards(transform.rotation, direction, config.rotation_speed, delta);
        }

        if plan.begin_chase {
            animator.set_bool("Run", true);
        }

        if plan.begin_attack {
            *velocity = Velocity::zero();
            steering.halt();
            animator.set_bool("Run", false);
            attack_events.write(AttackBegan { agent: entity });
        }

        if plan.state != *state {
            crate::log(&format!(
                "Agent {:?}: {} → {}",
                entity,
                state.name(),
                plan.state.name()
            ));
            *state = plan.state;
        }
    }
}

/// Система: вход в Attack - HUD, camera follow, запуск хореографии
pub fn start_attack_choreography(
    mut began: EventReader<AttackBegan>,
    mut agents: Query<(&HostileAgent, &AgentLinks, &mut AttackProgress)>,
    mut panels: Query<&mut UiPanel>,
    mut follows: Query<&mut CameraFollow>,
    mut coroutines: ResMut<Coroutines>,
) {
    for event in began.read() {
        let Ok((agent, links, mut progress)) = agents.get_mut(event.agent) else {
            OrchestrationError::missing("agent", "attack.begin").report();
            continue;
        };

        for hud in &links.hud {
            match panels.get_mut(*hud) {
                Ok(mut panel) => panel.visible = false,
                Err(_) => OrchestrationError::missing("hud panel", "attack.begin").report(),
            }
        }

        match links.camera.map(|camera| follows.get_mut(camera)) {
            Some(Ok(mut follow)) => follow.enabled = false,
            _ => OrchestrationError::missing("camera follow", "attack.begin").report(),
        }

        let handle = coroutines.start(AttackChoreography::new(
            event.agent,
            links.player,
            links.camera,
            agent.config.clone(),
        ));
        progress.choreography = Some(handle);
    }
}

/// Система: внешний AttackConnected → неотменяемая kill sequence
///
/// Принимается только в Attacking и только один раз.
pub fn resolve_attack_hits(
    mut hits: EventReader<AttackConnected>,
    mut agents: Query<(&HostileAgent, &AgentState, &AgentLinks, &mut AttackProgress)>,
    mut coroutines: ResMut<Coroutines>,
) {
    for hit in hits.read() {
        let Ok((agent, state, links, mut progress)) = agents.get_mut(hit.agent) else {
            OrchestrationError::missing("agent", "attack.connected").report();
            continue;
        };

        if *state != AgentState::Attacking {
            OrchestrationError::invalid("AttackConnected", state.name()).report();
            continue;
        }
        if progress.kill.is_some() {
            OrchestrationError::invalid("AttackConnected", "Attacking (resolved)").report();
            continue;
        }

        let handle = coroutines.start_uncancellable(KillSequence::new(
            hit.agent,
            links.player,
            links.death_panel,
            agent.config.clone(),
        ));
        progress.kill = Some(handle);
    }
}

/// Система: footstep → тряска активной камеры
pub fn shake_on_footstep(
    mut footsteps: EventReader<FootstepEvent>,
    agents: Query<(&HostileAgent, &AgentLinks)>,
    mut shakes: Query<&mut CameraShake>,
    mut commands: Commands,
) {
    for step in footsteps.read() {
        let Ok((agent, links)) = agents.get(step.agent) else {
            continue;
        };
        let Some(camera) = links.camera else {
            OrchestrationError::missing("camera", "agent.footstep").report();
            continue;
        };

        let (intensity, duration) = (agent.config.shake_intensity, agent.config.shake_duration);
        if let Ok(mut shake) = shakes.get_mut(camera) {
            shake.restart(intensity, duration);
        } else if let Ok(mut camera_commands) = commands.get_entity(camera) {
            let mut shake = CameraShake::default();
            shake.restart(intensity, duration);
            camera_commands.insert(shake);
        } else {
            OrchestrationError::missing("camera", "agent.footstep").report();
        }
    }
}
