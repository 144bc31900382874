//! Hostile agent components (FSM state, patrol route, collaborator links).

use bevy::prelude::*;

use crate::config::AgentConfig;
use crate::coroutine::ProcedureHandle;

/// Hostile agent + его параметры
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct HostileAgent {
    pub config: AgentConfig,
}

/// FSM состояния
///
/// Patrol → Chase → Attack → Attacking. Обратного пути Chase → Patrol нет,
/// Attacking терминальное (дальше - внешняя логика сцены).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum AgentState {
    /// Начальное: обход waypoints
    #[default]
    Patrol,
    /// Бежим к игроку
    Chase,
    /// Вход в атаку, идёт хореография
    Attack,
    /// Ждём внешний сигнал удара (анимация)
    Attacking,
}

impl AgentState {
    pub fn name(&self) -> &'static str {
        match self {
            AgentState::Patrol => "Patrol",
            AgentState::Chase => "Chase",
            AgentState::Attack => "Attack",
            AgentState::Attacking => "Attacking",
        }
    }
}

/// Маршрут патруля (обход по кругу)
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub waypoints: Vec<Vec3>,
    pub current: usize,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self { waypoints, current: 0 }
    }
}

/// Ссылки на коллабораторов (non-owning)
///
/// Любая может отсутствовать: шаг, которому она нужна, пропускается.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AgentLinks {
    pub player: Option<Entity>,
    pub camera: Option<Entity>,
    pub death_panel: Option<Entity>,
    /// HUD панели, которые прячем на атаке
    pub hud: Vec<Entity>,
}

/// Игрок внутри detection зоны агента (обновляется из ZoneEvent)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct PlayerDetection {
    pub player_in_range: bool,
}

/// Handles процедур атаки (хореография, kill)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttackProgress {
    pub choreography: Option<ProcedureHandle>,
    pub kill: Option<ProcedureHandle>,
}
