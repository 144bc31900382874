//! Attack choreography + kill sequence (cooperative procedures над World).

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::AgentState;
use super::events::PlayerKilled;
use crate::camera::{collider_height, frame_two_shot};
use crate::components::{AnimatorParams, FreeLocomotion, HitEffect, UiPanel, Viewpoint};
use crate::config::AgentConfig;
use crate::coroutine::{Procedure, ProcedureStep, WaitSeconds};
use crate::error::{require, OrReport, OrchestrationError};
use crate::steering::{look_rotation, planar};
use crate::tween::{Ease, Sequence, Tween, TweenScheduler};

enum ChoreographyPhase {
    /// Забираем игрока и ставим его перед агентом
    Seize,
    /// Ждём поворот игрока, потом камера
    PlayerTurn(WaitSeconds),
    /// Ждём камеру, потом триггеры анимаций
    CameraMove(WaitSeconds),
}

/// Хореография входа в атаку
///
/// 1. Выключаем locomotion + физику игрока, tween к stand-off точке лицом к агенту
/// 2. Через player_turn_duration - two-shot камера
/// 3. Через camera_move_duration - "Scared" / "Attack", агент → Attacking
pub struct AttackChoreography {
    agent: Entity,
    player: Option<Entity>,
    camera: Option<Entity>,
    config: AgentConfig,
    phase: ChoreographyPhase,
}

impl AttackChoreography {
    pub fn new(agent: Entity, player: Option<Entity>, camera: Option<Entity>, config: AgentConfig) -> Self {
        Self {
            agent,
            player,
            camera,
            config,
            phase: ChoreographyPhase::Seize,
        }
    }

    fn seize_player(&self, world: &mut World) -> Result<(), OrchestrationError> {
        let player = require(self.player, "player", "attack.seize")?;
        let agent_transform = *require(world.get::<Transform>(self.agent), "agent transform", "attack.seize")?;
        let player_transform = *require(world.get::<Transform>(player), "player transform", "attack.seize")?;

        match world.get_mut::<FreeLocomotion>(player) {
            Some(mut free) => free.enabled = false,
            None => OrchestrationError::missing("player locomotion", "attack.seize").report(),
        }
        if let Some(mut velocity) = world.get_mut::<Velocity>(player) {
            *velocity = Velocity::zero();
        }
        match world.get_mut::<RigidBody>(player) {
            Some(mut body) => *body = RigidBody::KinematicPositionBased,
            None => OrchestrationError::missing("player rigid body", "attack.seize").report(),
        }

        let mut stand_point =
            agent_transform.translation + agent_transform.forward().as_vec3() * self.config.stand_off_distance;
        stand_point.y = player_transform.translation.y;
        let facing = look_rotation(planar(agent_transform.translation - player_transform.translation));

        let duration = self.config.player_turn_duration;
        world.resource_mut::<TweenScheduler>().start(
            Sequence::new()
                .append(Tween::move_to(player, stand_point, duration).ease(Ease::OutQuad))
                .join(Tween::rotate_to(player, facing, duration).ease(Ease::OutQuad)),
        );

        crate::log(&format!(
            "Agent {:?}: seized player {:?}, stand point {:?}",
            self.agent, player, stand_point
        ));
        Ok(())
    }

    fn frame_camera(&self, world: &mut World) -> Result<(), OrchestrationError> {
        let camera = require(self.camera, "camera", "attack.frame")?;
        let player = require(self.player, "player", "attack.frame")?;
        let agent_position = require(world.get::<Transform>(self.agent), "agent transform", "attack.frame")?.translation;
        let player_position = require(world.get::<Transform>(player), "player transform", "attack.frame")?.translation;
        require(world.get::<Transform>(camera), "camera transform", "attack.frame")?;

        let viewpoint = world.get::<Viewpoint>(camera).copied().unwrap_or_default();
        let tallest = match (height_of(world, self.agent), height_of(world, player)) {
            (Some(agent), Some(player)) => agent.max(player),
            _ => {
                OrchestrationError::missing("collider", "attack.frame").report();
                self.config.default_actor_height
            }
        };

        let shot = frame_two_shot(agent_position, player_position, tallest, &viewpoint);
        let duration = self.config.camera_move_duration;
        world.resource_mut::<TweenScheduler>().start(
            Sequence::new()
                .append(Tween::move_to(camera, shot.position, duration).ease(Ease::OutQuad))
                .join(Tween::rotate_to(camera, shot.rotation, duration).ease(Ease::OutQuad)),
        );

        crate::log(&format!(
            "Agent {:?}: two-shot camera at {:?} (distance {:.2})",
            self.agent, shot.position, shot.distance
        ));
        Ok(())
    }

    fn cue_animations(&self, world: &mut World) {
        let player_params = match self.player {
            Some(player) => world.get_mut::<AnimatorParams>(player),
            None => None,
        };
        match player_params {
            Some(mut params) => params.set_trigger("Scared"),
            None => OrchestrationError::missing("player animator", "attack.cue").report(),
        }
        match world.get_mut::<AnimatorParams>(self.agent) {
            Some(mut params) => params.set_trigger("Attack"),
            None => OrchestrationError::missing("agent animator", "attack.cue").report(),
        }
        if let Some(mut state) = world.get_mut::<AgentState>(self.agent) {
            *state = AgentState::Attacking;
            crate::log(&format!("Agent {:?}: Attack → Attacking", self.agent));
        }
    }
}

fn height_of(world: &World, entity: Entity) -> Option<f32> {
    let collider = world.get::<Collider>(entity)?;
    let transform = world.get::<Transform>(entity)?;
    Some(collider_height(collider, transform))
}

impl Procedure<World> for AttackChoreography {
    fn label(&self) -> &'static str {
        "attack_choreography"
    }

    fn resume(&mut self, world: &mut World, dt: f32) -> ProcedureStep {
        match &mut self.phase {
            ChoreographyPhase::Seize => {
                if self.seize_player(world).or_report().is_none() {
                    // Агент остаётся в Attack
                    return ProcedureStep::Done;
                }
                self.phase = ChoreographyPhase::PlayerTurn(WaitSeconds::new(self.config.player_turn_duration));
                ProcedureStep::Yield
            }
            ChoreographyPhase::PlayerTurn(wait) => {
                if !wait.advance(dt) {
                    return ProcedureStep::Yield;
                }
                // Без камеры сцена всё равно продолжается
                self.frame_camera(world).or_report();
                self.phase = ChoreographyPhase::CameraMove(WaitSeconds::new(self.config.camera_move_duration));
                ProcedureStep::Yield
            }
            ChoreographyPhase::CameraMove(wait) => {
                if !wait.advance(dt) {
                    return ProcedureStep::Yield;
                }
                self.cue_animations(world);
                ProcedureStep::Done
            }
        }
    }
}

enum KillPhase {
    Strike,
    AwaitPanel(WaitSeconds),
}

/// Kill sequence после AttackConnected (неотменяемая)
///
/// Hit effect в позиции игрока → death handler → пауза → death panel scale-in.
pub struct KillSequence {
    agent: Entity,
    player: Option<Entity>,
    death_panel: Option<Entity>,
    config: AgentConfig,
    phase: KillPhase,
}

impl KillSequence {
    pub fn new(agent: Entity, player: Option<Entity>, death_panel: Option<Entity>, config: AgentConfig) -> Self {
        Self {
            agent,
            player,
            death_panel,
            config,
            phase: KillPhase::Strike,
        }
    }

    fn strike(&self, world: &mut World) -> Result<(), OrchestrationError> {
        let player = require(self.player, "player", "kill.strike")?;
        let position = require(world.get::<Transform>(player), "player transform", "kill.strike")?.translation;

        world.spawn((HitEffect { victim: player }, Transform::from_translation(position)));

        // Death handler
        if let Some(mut params) = world.get_mut::<AnimatorParams>(player) {
            params.set_trigger("Die");
        }
        if let Some(mut free) = world.get_mut::<FreeLocomotion>(player) {
            free.enabled = false;
        }
        world.send_event(PlayerKilled {
            player,
            agent: self.agent,
        });

        crate::log_info(&format!("Agent {:?}: player {:?} killed", self.agent, player));
        Ok(())
    }

    fn reveal_death_panel(&self, world: &mut World) -> Result<(), OrchestrationError> {
        let panel = require(self.death_panel, "death panel", "kill.reveal")?;
        {
            let mut ui = require(world.get_mut::<UiPanel>(panel), "death panel ui", "kill.reveal")?;
            ui.visible = true;
        }

        if let Some(mut transform) = world.get_mut::<Transform>(panel) {
            transform.scale = Vec3::ZERO;
        }
        world.resource_mut::<TweenScheduler>().start(Sequence::single(
            Tween::scale_to(panel, Vec3::ONE, self.config.death_panel_scale_duration).ease(Ease::OutBack),
        ));
        Ok(())
    }
}

impl Procedure<World> for KillSequence {
    fn label(&self) -> &'static str {
        "kill_sequence"
    }

    fn resume(&mut self, world: &mut World, dt: f32) -> ProcedureStep {
        match &mut self.phase {
            KillPhase::Strike => {
                self.strike(world).or_report();
                self.phase = KillPhase::AwaitPanel(WaitSeconds::new(self.config.death_panel_delay));
                ProcedureStep::Yield
            }
            KillPhase::AwaitPanel(wait) => {
                if !wait.advance(dt) {
                    return ProcedureStep::Yield;
                }
                self.reveal_death_panel(world).or_report();
                ProcedureStep::Done
            }
        }
    }
}
