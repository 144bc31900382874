//! Harvest components: resource, encounter controller, session state.

use bevy::prelude::*;

use crate::config::HarvestConfig;
use crate::coroutine::ProcedureHandle;
use crate::error::OrchestrationError;
use crate::tween::SequenceHandle;
use crate::zone::ZoneShape;

/// Ресурс, который можно собрать (зона висит на нём же)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Harvestable {
    /// Награда; None - `HarvestConfig::reward`
    pub reward: Option<i64>,
    /// Дочерний меш, который сжимается вместе с ресурсом
    pub child_visual: Option<Entity>,
    /// Частицы со scalar каналом "size"
    pub particles: Vec<Entity>,
}

/// Контроллер harvesting encounter
///
/// Владеет максимум одной EncounterSession. Пока сессия жива, компаньон
/// под `SteeringAuthority::Encounter { controller }`.
#[derive(Component, Debug, Default)]
pub struct HarvestEncounter {
    pub config: HarvestConfig,
    pub companion: Option<Entity>,
    /// Камера для UI; нет или неактивна - берётся активная Viewpoint
    pub viewer: Option<Entity>,
    /// Radial progress UI (UiPanel + ScalarChannels "fill")
    pub progress_ui: Option<Entity>,
    pub session: Option<EncounterSession>,
    /// Последняя show/hide анимация UI
    pub ui_sequence: Option<SequenceHandle>,
    /// UI показан этим контроллером (и ещё не спрятан)
    pub ui_shown: bool,
    next_session_id: u64,
}

impl HarvestEncounter {
    pub fn new(config: HarvestConfig, companion: Option<Entity>) -> Self {
        Self {
            config,
            companion,
            ..Default::default()
        }
    }

    pub fn with_viewer(mut self, viewer: Entity) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn with_progress_ui(mut self, ui: Entity) -> Self {
        self.progress_ui = Some(ui);
        self
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    /// Новый id сессии (stale события старых сессий отбрасываются по нему)
    pub(crate) fn allocate_session_id(&mut self) -> u64 {
        let id = self.next_session_id;
        self.next_session_id += 1;
        id
    }

    /// Сессия с этим id, если она ещё жива
    pub fn session_mut(&mut self, id: u64) -> Option<&mut EncounterSession> {
        self.session.as_mut().filter(|session| session.id == id)
    }
}

/// Стадия payoff анимации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PayoffStage {
    /// Shrink + spin на месте
    Shrinking,
    /// Полёт к компаньону
    Flying,
}

/// Фазы сессии (Idle = сессии нет)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterPhase {
    Approaching,
    Aligning,
    Channeling,
    Resolving(PayoffStage),
    /// Шаг прерван (пропал коллаборатор): ждём zone exit
    Stalled,
}

impl EncounterPhase {
    pub fn name(&self) -> &'static str {
        match self {
            EncounterPhase::Approaching => "Approaching",
            EncounterPhase::Aligning => "Aligning",
            EncounterPhase::Channeling => "Channeling",
            EncounterPhase::Resolving(PayoffStage::Shrinking) => "Resolving(Shrinking)",
            EncounterPhase::Resolving(PayoffStage::Flying) => "Resolving(Flying)",
            EncounterPhase::Stalled => "Stalled",
        }
    }

    /// Выход из зоны отменяет сессию (Resolving уже не отменить)
    pub fn is_cancellable(&self) -> bool {
        !matches!(self, EncounterPhase::Resolving(_))
    }
}

/// Одна сессия сбора
#[derive(Debug, Clone, PartialEq)]
pub struct EncounterSession {
    pub id: u64,
    /// Ресурс (он же владелец зоны)
    pub resource: Entity,
    pub phase: EncounterPhase,
    pub stand_off: f32,
    /// 0..1, не убывает пока Channeling
    pub progress: f32,
    pub channel: Option<ProcedureHandle>,
    pub ui_facing: Option<ProcedureHandle>,
    pub align: Option<SequenceHandle>,
    pub payoff: Option<SequenceHandle>,
}

impl EncounterSession {
    pub fn new(id: u64, resource: Entity, stand_off: f32) -> Self {
        Self {
            id,
            resource,
            phase: EncounterPhase::Approaching,
            stand_off,
            progress: 0.0,
            channel: None,
            ui_facing: None,
            align: None,
            payoff: None,
        }
    }
}

/// Stand-off дистанция компаньона от ресурса
///
/// radius(shape, scale) * factor - clearance, не меньше 0. Для формы без
/// известного радиуса - fallback_radius и GeometryFallback.
pub fn stand_off_distance(
    shape: &ZoneShape,
    owner: &Transform,
    config: &HarvestConfig,
) -> (f32, Option<OrchestrationError>) {
    let (radius, fallback) = match shape.effective_radius(owner, config.fallback_radius) {
        Ok(radius) => (radius, None),
        Err((radius, err)) => (radius, Some(err)),
    };
    ((radius * config.stand_off_factor - config.clearance).max(0.0), fallback)
}
