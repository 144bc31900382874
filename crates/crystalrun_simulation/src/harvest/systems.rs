//! Harvesting encounter systems: begin / cancel by zone events, per-tick drive.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use std::collections::BTreeSet;

use super::components::{
    stand_off_distance, EncounterPhase, EncounterSession, HarvestEncounter, Harvestable, PayoffStage,
};
use super::events::{ChannelCompleted, EncounterEnded, EncounterOutcome, PayoffStageCompleted};
use super::procedures::{ChannelProcedure, FaceViewerProcedure};
use crate::components::{ActorKind, Companion, ScalarChannels, SteeringAuthority, UiPanel, ZoneSubject};
use crate::config::SimulationConfig;
use crate::coroutine::Coroutines;
use crate::error::OrchestrationError;
use crate::steering::{apply_planar, look_rotation, planar, planar_distance, rotate_towards, SteeringRates, SteeringState};
use crate::tween::{Ease, Sequence, Tween, TweenScheduler};
use crate::wallet::{BalanceChanged, Wallet};
use crate::zone::{Zone, ZoneEdge, ZoneEvent};

/// Сервисы сессии: процедуры, tweens, компаньоны, progress UI
#[derive(SystemParam)]
pub struct EncounterServices<'w, 's> {
    pub coroutines: ResMut<'w, Coroutines>,
    pub tweens: ResMut<'w, TweenScheduler>,
    pub companions: Query<
        'w,
        's,
        (
            &'static mut Transform,
            &'static mut SteeringState,
            &'static mut Velocity,
            &'static mut SteeringAuthority,
        ),
        (With<Companion>, Without<Harvestable>),
    >,
    pub panels: Query<
        'w,
        's,
        (&'static mut UiPanel, &'static mut Transform, Option<&'static mut ScalarChannels>),
        (Without<Companion>, Without<Harvestable>),
    >,
    pub ended: EventWriter<'w, EncounterEnded>,
}

impl EncounterServices<'_, '_> {
    /// Показать progress UI: scale 0 → 1 (OutBack), fill = 0
    fn show_ui(&mut self, encounter: &mut HarvestEncounter) {
        let Some(ui) = encounter.progress_ui else {
            OrchestrationError::missing("progress ui", "harvest.show_ui").report();
            return;
        };
        let Ok((mut panel, mut transform, channels)) = self.panels.get_mut(ui) else {
            OrchestrationError::missing("progress ui", "harvest.show_ui").report();
            return;
        };

        panel.visible = true;
        transform.scale = Vec3::ZERO;
        if let Some(mut channels) = channels {
            channels.set("fill", 0.0);
        }

        if let Some(previous) = encounter.ui_sequence.take() {
            self.tweens.kill(previous);
        }
        encounter.ui_sequence = Some(self.tweens.start(Sequence::single(
            Tween::scale_to(ui, Vec3::ONE, encounter.config.ui_show_duration).ease(Ease::OutBack),
        )));
        encounter.ui_shown = true;
    }

    /// Спрятать progress UI: fill = 0, scale → 0 (InBack), потом visible = false
    fn hide_ui(&mut self, encounter: &mut HarvestEncounter) {
        if !encounter.ui_shown {
            return;
        }
        encounter.ui_shown = false;

        let Some(ui) = encounter.progress_ui else {
            return;
        };
        let Ok((_, _, channels)) = self.panels.get_mut(ui) else {
            OrchestrationError::missing("progress ui", "harvest.hide_ui").report();
            return;
        };
        if let Some(mut channels) = channels {
            channels.set("fill", 0.0);
        }

        if let Some(previous) = encounter.ui_sequence.take() {
            self.tweens.kill(previous);
        }
        encounter.ui_sequence = Some(
            self.tweens.start(
                Sequence::single(
                    Tween::scale_to(ui, Vec3::ZERO, encounter.config.ui_show_duration).ease(Ease::InBack),
                )
                .on_complete(move |world: &mut World| {
                    if let Some(mut panel) = world.get_mut::<UiPanel>(ui) {
                        panel.visible = false;
                    }
                }),
            ),
        );
    }

    /// Вернуть компаньона в free-roam (только если им владеет этот контроллер)
    fn release_companion(&mut self, controller: Entity, companion: Option<Entity>) {
        let Some(companion) = companion else {
            return;
        };
        if let Ok((_, _, _, mut authority)) = self.companions.get_mut(companion) {
            if *authority == (SteeringAuthority::Encounter { controller }) {
                *authority = SteeringAuthority::FreeRoam;
            }
        }
    }

    /// Уничтожить сессию: процедуры, tweens, UI, компаньон
    ///
    /// Всё в одном тике: после возврата authority уже FreeRoam.
    fn teardown(&mut self, controller: Entity, encounter: &mut HarvestEncounter, outcome: EncounterOutcome) {
        let Some(session) = encounter.session.take() else {
            return;
        };

        for procedure in [session.channel, session.ui_facing].into_iter().flatten() {
            self.coroutines.cancel(procedure);
        }
        for sequence in [session.align, session.payoff].into_iter().flatten() {
            self.tweens.kill(sequence);
        }

        self.hide_ui(encounter);
        self.release_companion(controller, encounter.companion);

        self.ended.write(EncounterEnded {
            controller,
            resource: session.resource,
            outcome,
        });
        crate::log(&format!(
            "Harvest {:?}: session {} ended in {} ({:?})",
            controller,
            session.id,
            session.phase.name(),
            outcome
        ));
    }
}

fn subject_is(subjects: &Query<&ZoneSubject>, subject: Entity, kind: ActorKind) -> bool {
    subjects.get(subject).map(|s| s.0 == kind).unwrap_or(false)
}

/// Система: выход отслеживаемого subject из зоны ресурса → отмена сессии
///
/// Отмена без награды, прогресс выбрасывается. В Resolving выход игнорируется.
pub fn cancel_encounters(
    mut zone_events: EventReader<ZoneEvent>,
    subjects: Query<&ZoneSubject>,
    mut controllers: Query<(Entity, &mut HarvestEncounter)>,
    mut services: EncounterServices,
) {
    for event in zone_events.read() {
        if event.edge != ZoneEdge::Exited {
            continue;
        }

        for (controller, mut encounter) in controllers.iter_mut() {
            let Some(session) = &encounter.session else {
                continue;
            };
            if session.resource != event.zone
                || !subject_is(&subjects, event.subject, encounter.config.cancel_subject)
            {
                continue;
            }

            if !session.phase.is_cancellable() {
                OrchestrationError::invalid("ZoneExit", session.phase.name()).report();
                continue;
            }

            let progress = session.progress;
            services.teardown(controller, &mut encounter, EncounterOutcome::Cancelled { progress });
        }
    }
}

/// Система: вход entry subject в зону ресурса → новая сессия
///
/// Пока у контроллера есть сессия, повторный вход ничего не делает.
/// На ресурс не больше одной сессии среди всех контроллеров.
pub fn begin_encounters(
    mut zone_events: EventReader<ZoneEvent>,
    subjects: Query<&ZoneSubject>,
    resources: Query<(&Transform, &Zone), (With<Harvestable>, Without<Companion>)>,
    mut controllers: Query<(Entity, &mut HarvestEncounter)>,
    mut services: EncounterServices,
) {
    let mut claimed: BTreeSet<Entity> = controllers
        .iter()
        .filter_map(|(_, encounter)| encounter.session.as_ref().map(|session| session.resource))
        .collect();

    for event in zone_events.read() {
        if event.edge != ZoneEdge::Entered {
            continue;
        }
        let Ok((resource_transform, zone)) = resources.get(event.zone) else {
            continue;
        };
        if claimed.contains(&event.zone) {
            crate::log(&format!("Harvest: enter ignored, {:?} already has a session", event.zone));
            continue;
        }

        for (controller, mut encounter) in controllers.iter_mut() {
            if !subject_is(&subjects, event.subject, encounter.config.entry_subject) {
                continue;
            }
            if let Some(session) = &encounter.session {
                crate::log(&format!(
                    "Harvest {:?}: enter ignored, session {} is {}",
                    controller,
                    session.id,
                    session.phase.name()
                ));
                continue;
            }

            let Some(companion) = encounter.companion else {
                OrchestrationError::missing("companion", "harvest.begin").report();
                continue;
            };
            let Ok((_, _, _, mut authority)) = services.companions.get_mut(companion) else {
                OrchestrationError::missing("companion", "harvest.begin").report();
                continue;
            };
            if !authority.is_free() {
                OrchestrationError::invalid("ZoneEnter", "companion owned by another encounter").report();
                continue;
            }

            let (stand_off, fallback) = stand_off_distance(&zone.shape, resource_transform, &encounter.config);
            if let Some(err) = fallback {
                err.report();
            }

            *authority = SteeringAuthority::Encounter { controller };
            let id = encounter.allocate_session_id();
            encounter.session = Some(EncounterSession::new(id, event.zone, stand_off));
            claimed.insert(event.zone);

            crate::log(&format!(
                "Harvest {:?}: session {} started on {:?}, stand-off {:.2}",
                controller, id, event.zone, stand_off
            ));
            // Один ресурс - одна сессия
            break;
        }
    }
}

/// Система: тик всех сессий
///
/// 1. ChannelCompleted → payoff shrink
/// 2. PayoffStageCompleted → полёт / награда
/// 3. Approaching / Aligning по текущим позициям
pub fn drive_encounters(
    time: Res<Time<Fixed>>,
    config: Res<SimulationConfig>,
    mut channel_done: EventReader<ChannelCompleted>,
    mut payoff_done: EventReader<PayoffStageCompleted>,
    mut controllers: Query<(Entity, &mut HarvestEncounter)>,
    resources: Query<(&Transform, &Harvestable), Without<Companion>>,
    mut services: EncounterServices,
    mut wallet: ResMut<Wallet>,
    mut balance_events: EventWriter<BalanceChanged>,
    mut commands: Commands,
) {
    let delta = time.delta_secs();
    let follower = &config.follower;
    let rates = SteeringRates::new(follower.acceleration, follower.deceleration);

    for done in channel_done.read() {
        let Ok((controller, mut encounter)) = controllers.get_mut(done.controller) else {
            continue;
        };
        let Some((phase, payoff)) = encounter
            .session_mut(done.session_id)
            .map(|session| (session.phase, session.payoff))
        else {
            continue;
        };
        // Канал сам переводит сессию в Resolving(Shrinking); анимация ещё не начата
        if phase != EncounterPhase::Resolving(PayoffStage::Shrinking) || payoff.is_some() {
            OrchestrationError::invalid("ChannelCompleted", phase.name()).report();
            continue;
        }
        start_shrink(controller, &mut encounter, &resources, &mut services);
    }

    for done in payoff_done.read() {
        let Ok((controller, mut encounter)) = controllers.get_mut(done.controller) else {
            continue;
        };
        let Some(phase) = encounter.session_mut(done.session_id).map(|session| session.phase) else {
            continue;
        };
        if phase != EncounterPhase::Resolving(done.stage) {
            OrchestrationError::invalid("PayoffStageCompleted", phase.name()).report();
            continue;
        }

        match done.stage {
            PayoffStage::Shrinking => start_fly(controller, &mut encounter, &resources, &mut services),
            PayoffStage::Flying => {
                let Some(session) = &encounter.session else {
                    continue;
                };
                let resource = session.resource;
                let Ok((_, harvestable)) = resources.get(resource) else {
                    services.teardown(controller, &mut encounter, EncounterOutcome::Lost);
                    continue;
                };

                let reward = harvestable.reward.unwrap_or(encounter.config.reward);
                balance_events.write(wallet.credit(reward));

                services.tweens.kill_targeting(resource);
                commands.entity(resource).despawn();
                services.teardown(controller, &mut encounter, EncounterOutcome::Completed { reward });
                crate::log_info(&format!(
                    "Harvest {:?}: collected {:?}, +{} (balance {})",
                    controller,
                    resource,
                    reward,
                    wallet.balance()
                ));
            }
        }
    }

    for (controller, mut encounter) in controllers.iter_mut() {
        let Some(session) = &encounter.session else {
            continue;
        };
        let (resource, phase) = (session.resource, session.phase);

        let Ok((resource_transform, _)) = resources.get(resource) else {
            OrchestrationError::missing("resource", "harvest.drive").report();
            services.teardown(controller, &mut encounter, EncounterOutcome::Lost);
            continue;
        };
        let resource_position = resource_transform.translation;

        match phase {
            EncounterPhase::Approaching => {
                approach(
                    controller,
                    &mut encounter,
                    resource_position,
                    rates,
                    follower.rotation_speed,
                    delta,
                    &mut services,
                );
            }
            EncounterPhase::Aligning => {
                let aligning = encounter
                    .session
                    .as_ref()
                    .and_then(|session| session.align)
                    .is_some_and(|align| services.tweens.is_active(align));
                if !aligning {
                    start_channel(controller, &mut encounter, &mut services);
                }
            }
            EncounterPhase::Channeling | EncounterPhase::Resolving(_) | EncounterPhase::Stalled => {}
        }
    }
}

fn stall(controller: Entity, encounter: &mut HarvestEncounter, err: OrchestrationError) {
    err.report();
    if let Some(session) = encounter.session.as_mut() {
        crate::log(&format!(
            "Harvest {:?}: session {} stalled in {}",
            controller,
            session.id,
            session.phase.name()
        ));
        session.phase = EncounterPhase::Stalled;
    }
}

/// Approaching: компаньон идёт к ресурсу до stand-off, потом поворот к нему
fn approach(
    controller: Entity,
    encounter: &mut HarvestEncounter,
    resource_position: Vec3,
    rates: SteeringRates,
    rotation_speed: f32,
    delta: f32,
    services: &mut EncounterServices,
) {
    let Some(companion) = encounter.companion else {
        stall(controller, encounter, OrchestrationError::missing("companion", "harvest.approach"));
        return;
    };
    let Ok((mut transform, mut steering, mut velocity, _)) = services.companions.get_mut(companion) else {
        stall(controller, encounter, OrchestrationError::missing("companion", "harvest.approach"));
        return;
    };
    let Some(session) = encounter.session.as_mut() else {
        return;
    };

    let to_resource = planar(resource_position - transform.translation);
    if planar_distance(transform.translation, resource_position) > session.stand_off {
        let planar_velocity = steering.update(to_resource, encounter.config.approach_speed, rates, delta);
        apply_planar(&mut velocity.linvel, planar_velocity);
        transform.rotation = rotate_towards(transform.rotation, to_resource, rotation_speed, delta);
        return;
    }

    steering.halt();
    apply_planar(&mut velocity.linvel, Vec3::ZERO);

    let facing = look_rotation(to_resource);
    session.align = Some(services.tweens.start(Sequence::single(
        Tween::rotate_to(companion, facing, encounter.config.align_duration).ease(Ease::OutQuad),
    )));
    session.phase = EncounterPhase::Aligning;
    crate::log(&format!("Harvest {:?}: Approaching → Aligning", controller));
}

/// Aligning → Channeling: UI, поворот UI к камере, channel таймер
fn start_channel(controller: Entity, encounter: &mut HarvestEncounter, services: &mut EncounterServices) {
    services.show_ui(encounter);

    let (progress_ui, viewer) = (encounter.progress_ui, encounter.viewer);
    let (duration, ui_rotation_speed) = (encounter.config.channel_duration, encounter.config.ui_rotation_speed);
    let ui_shown = encounter.ui_shown;
    let Some(session) = encounter.session.as_mut() else {
        return;
    };

    session.progress = 0.0;
    session.channel = Some(
        services
            .coroutines
            .start(ChannelProcedure::new(controller, session.id, progress_ui, duration)),
    );
    if let (Some(ui), true) = (progress_ui, ui_shown) {
        session.ui_facing = Some(
            services
                .coroutines
                .start(FaceViewerProcedure::new(ui, viewer, ui_rotation_speed)),
        );
    }
    session.phase = EncounterPhase::Channeling;
    crate::log(&format!("Harvest {:?}: Aligning → Channeling", controller));
}

/// Payoff shrink после ChannelCompleted
///
/// Одновременно: shrink до shrink_scale (InBack) + spin 360° по Y,
/// тот же shrink на дочернем меше, частицы "size" → 0.
fn start_shrink(
    controller: Entity,
    encounter: &mut HarvestEncounter,
    resources: &Query<(&Transform, &Harvestable), Without<Companion>>,
    services: &mut EncounterServices,
) {
    if let Some(session) = encounter.session.as_mut() {
        session.progress = 1.0;
        if let Some(facing) = session.ui_facing.take() {
            services.coroutines.cancel(facing);
        }
    }
    services.hide_ui(encounter);

    let config = &encounter.config;
    let Some(session) = encounter.session.as_mut() else {
        return;
    };
    let resource = session.resource;
    let Ok((_, harvestable)) = resources.get(resource) else {
        // Следующий тик drive снесёт сессию как Lost
        return;
    };

    let duration = config.shrink_duration;
    let mut sequence = Sequence::new()
        .append(Tween::scale_to(resource, Vec3::splat(config.shrink_scale), duration).ease(Ease::InBack))
        .join(Tween::spin(resource, Vec3::new(0.0, 360.0, 0.0), duration).ease(Ease::OutQuad));
    if let Some(child) = harvestable.child_visual {
        sequence = sequence.join(Tween::scale_to(child, Vec3::splat(config.shrink_scale), duration).ease(Ease::InBack));
    }
    for particle in &harvestable.particles {
        sequence = sequence.join(Tween::scalar_to(*particle, "size", 0.0, duration).ease(Ease::Linear));
    }

    let session_id = session.id;
    session.payoff = Some(services.tweens.start(sequence.on_complete(move |world: &mut World| {
        world.send_event(PayoffStageCompleted {
            controller,
            session_id,
            stage: PayoffStage::Shrinking,
        });
    })));
    session.phase = EncounterPhase::Resolving(PayoffStage::Shrinking);
    crate::log(&format!("Harvest {:?}: payoff shrink started", controller));
}

/// Resolving(Shrinking) → Resolving(Flying)
///
/// Кривая через start, поднятую середину и точку над компаньоном (InOutQuad),
/// параллельно spin, в последние fly_shrink_fraction полёта scale → 0.
fn start_fly(
    controller: Entity,
    encounter: &mut HarvestEncounter,
    resources: &Query<(&Transform, &Harvestable), Without<Companion>>,
    services: &mut EncounterServices,
) {
    let companion_position = encounter
        .companion
        .and_then(|companion| services.companions.get(companion).ok())
        .map(|(transform, ..)| transform.translation);
    let Some(companion_position) = companion_position else {
        stall(controller, encounter, OrchestrationError::missing("companion", "harvest.fly"));
        return;
    };

    let config = &encounter.config;
    let Some(session) = encounter.session.as_mut() else {
        return;
    };
    let resource = session.resource;
    let Ok((resource_transform, _)) = resources.get(resource) else {
        return;
    };

    let start = resource_transform.translation;
    let end = companion_position + Vec3::Y * config.fly_end_offset;
    let middle = (start + end) * 0.5 + Vec3::Y * config.fly_height;

    let duration = config.fly_duration;
    let shrink_fraction = config.fly_shrink_fraction.clamp(0.0, 1.0);
    let sequence = Sequence::new()
        .append(Tween::path(resource, vec![start, middle, end], duration).ease(Ease::InOutQuad))
        .join(Tween::spin(resource, Vec3::from(config.fly_spin_degrees), duration).ease(Ease::InOutQuad))
        .join(
            Tween::scale_to(resource, Vec3::ZERO, duration * shrink_fraction)
                .delay(duration * (1.0 - shrink_fraction))
                .ease(Ease::InBack),
        );

    let session_id = session.id;
    session.payoff = Some(services.tweens.start(sequence.on_complete(move |world: &mut World| {
        world.send_event(PayoffStageCompleted {
            controller,
            session_id,
            stage: PayoffStage::Flying,
        });
    })));
    session.phase = EncounterPhase::Resolving(PayoffStage::Flying);
    crate::log(&format!("Harvest {:?}: Shrinking → Flying", controller));
}
