//! Harvest events.

use bevy::prelude::*;

use super::components::PayoffStage;

/// Channel таймер дошёл до 1.0 (из ChannelProcedure)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCompleted {
    pub controller: Entity,
    pub session_id: u64,
}

/// Payoff sequence закончилась (on_complete callback)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoffStageCompleted {
    pub controller: Entity,
    pub session_id: u64,
    pub stage: PayoffStage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncounterOutcome {
    Completed { reward: i64 },
    /// Прогресс на момент отмены (награды нет)
    Cancelled { progress: f32 },
    /// Ресурс пропал до конца сессии
    Lost,
}

/// Сессия закончилась (для UI / аналитики / тестов)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EncounterEnded {
    pub controller: Entity,
    pub resource: Entity,
    pub outcome: EncounterOutcome,
}
