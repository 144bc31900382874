//! Harvesting encounter module
//!
//! Idle → Approaching → Aligning → Channeling → Resolving → Idle, всё в рамках
//! одной EncounterSession на контроллер:
//! - вход entry subject в зону ресурса открывает сессию (компаньон под authority сессии)
//! - выход cancel subject отменяет её до Resolving (без награды)
//! - channel таймер и поворот UI - cooperative процедуры
//! - payoff (shrink, полёт к компаньону) - tween sequences с on_complete событиями

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod procedures;
pub mod systems;

#[cfg(test)]
mod components_tests;

pub use components::{
    stand_off_distance, EncounterPhase, EncounterSession, HarvestEncounter, Harvestable, PayoffStage,
};
pub use events::{ChannelCompleted, EncounterEnded, EncounterOutcome, PayoffStageCompleted};
pub use procedures::{ChannelProcedure, FaceViewerProcedure};
pub use systems::{begin_encounters, cancel_encounters, drive_encounters, EncounterServices};

use crate::OrchestrationSet;

/// Harvest Plugin
///
/// Порядок выполнения (OrchestrationSet::Behavior, после zone snapshot):
/// 1. cancel_encounters - выход из зоны сносит сессию в этом же тике
/// 2. begin_encounters - вход открывает новую (если контроллер свободен)
/// 3. drive_encounters - события процедур / tweens + подход компаньона
pub struct HarvestPlugin;

impl Plugin for HarvestPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Harvestable>()
            .add_event::<ChannelCompleted>()
            .add_event::<PayoffStageCompleted>()
            .add_event::<EncounterEnded>()
            .add_systems(
                FixedUpdate,
                (cancel_encounters, begin_encounters, drive_encounters)
                    .chain()
                    .in_set(OrchestrationSet::Behavior),
            );
    }
}
