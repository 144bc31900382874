//! Cooperative procedures of a harvest session: channel timer, UI facing the viewer.

use bevy::prelude::*;

use super::components::{EncounterPhase, HarvestEncounter, PayoffStage};
use super::events::ChannelCompleted;
use crate::camera::active_viewpoint;
use crate::components::{ScalarChannels, UiPanel, Viewpoint};
use crate::coroutine::{Procedure, ProcedureStep, WaitSeconds};
use crate::error::OrchestrationError;

/// Channel таймер
///
/// Каждый тик: progress = elapsed / duration → сессия + канал "fill" на UI.
/// На 1.0 в том же тике фиксирует сессию в Resolving(Shrinking) (выход из зоны
/// уже не отменяет), шлёт ChannelCompleted и завершается. Если сессия
/// сменилась - тихо завершается.
pub struct ChannelProcedure {
    controller: Entity,
    session_id: u64,
    progress_ui: Option<Entity>,
    wait: WaitSeconds,
}

impl ChannelProcedure {
    pub fn new(controller: Entity, session_id: u64, progress_ui: Option<Entity>, duration: f32) -> Self {
        Self {
            controller,
            session_id,
            progress_ui,
            wait: WaitSeconds::new(duration),
        }
    }
}

impl Procedure<World> for ChannelProcedure {
    fn label(&self) -> &'static str {
        "harvest_channel"
    }

    fn resume(&mut self, world: &mut World, dt: f32) -> ProcedureStep {
        let finished = self.wait.advance(dt);
        let fraction = self.wait.fraction();

        {
            let Some(mut encounter) = world.get_mut::<HarvestEncounter>(self.controller) else {
                return ProcedureStep::Done;
            };
            let Some(session) = encounter.session_mut(self.session_id) else {
                return ProcedureStep::Done;
            };
            session.progress = session.progress.max(fraction);
            if finished {
                session.phase = EncounterPhase::Resolving(PayoffStage::Shrinking);
                crate::log(&format!(
                    "Harvest {:?}: session {} Channeling → Resolving(Shrinking)",
                    self.controller, self.session_id
                ));
            }
        }

        if let Some(ui) = self.progress_ui {
            if let Some(mut channels) = world.get_mut::<ScalarChannels>(ui) {
                channels.set("fill", fraction);
            }
        }

        if !finished {
            return ProcedureStep::Yield;
        }

        world.send_event(ChannelCompleted {
            controller: self.controller,
            session_id: self.session_id,
        });
        ProcedureStep::Done
    }
}

/// Поворот progress UI к активной камере, пока UI видим
///
/// Заданный viewer берётся, пока его Viewpoint активен (или Viewpoint нет);
/// иначе каждый тик ищется активная камера.
pub struct FaceViewerProcedure {
    ui: Entity,
    viewer: Option<Entity>,
    rotation_speed: f32,
}

impl FaceViewerProcedure {
    pub fn new(ui: Entity, viewer: Option<Entity>, rotation_speed: f32) -> Self {
        Self {
            ui,
            viewer,
            rotation_speed,
        }
    }
}

impl Procedure<World> for FaceViewerProcedure {
    fn label(&self) -> &'static str {
        "harvest_ui_facing"
    }

    fn resume(&mut self, world: &mut World, dt: f32) -> ProcedureStep {
        let visible = world.get::<UiPanel>(self.ui).map(|panel| panel.visible).unwrap_or(false);
        if !visible {
            return ProcedureStep::Done;
        }

        let preferred = self
            .viewer
            .filter(|viewer| world.get::<Viewpoint>(*viewer).is_none_or(|viewpoint| viewpoint.active));
        let viewer = match preferred {
            Some(viewer) => Some(viewer),
            None => active_viewpoint(world),
        };
        let viewer_position = match viewer.and_then(|viewer| world.get::<Transform>(viewer)) {
            Some(transform) => transform.translation,
            None => {
                OrchestrationError::missing("viewer", "harvest.ui_facing").report();
                return ProcedureStep::Done;
            }
        };

        let Some(mut transform) = world.get_mut::<Transform>(self.ui) else {
            return ProcedureStep::Done;
        };
        let to_viewer = viewer_position - transform.translation;
        if to_viewer.length_squared() > f32::EPSILON {
            let target = Transform::IDENTITY.looking_to(to_viewer, Vec3::Y).rotation;
            let t = (self.rotation_speed * dt).clamp(0.0, 1.0);
            transform.rotation = transform.rotation.slerp(target, t);
        }
        ProcedureStep::Yield
    }
}
