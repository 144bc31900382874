//! Actor components (player, companion, locomotion toggles, animator params).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Вид актёра для фильтров зон и tracked subject в конфиге
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Reflect)]
pub enum ActorKind {
    Player,
    Companion,
    Agent,
}

impl ActorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorKind::Player => "player",
            ActorKind::Companion => "companion",
            ActorKind::Agent => "agent",
        }
    }
}

/// Entity, которую видят зоны (позиция = Transform.translation)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct ZoneSubject(pub ActorKind);

/// Marker: игрок
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Marker: компаньон (робот-сборщик)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Companion;

/// Внешний locomotion-контроллер (игрок / follower)
///
/// Хореография выключает его на время сцены. Это просто флаг, не канал данных.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct FreeLocomotion {
    pub enabled: bool,
}

impl Default for FreeLocomotion {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Кто сейчас владеет steering компаньона
///
/// Максимум одна EncounterSession владеет компаньоном. Возврат в FreeRoam
/// происходит ровно в момент уничтожения сессии.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum SteeringAuthority {
    #[default]
    FreeRoam,
    Encounter {
        controller: Entity,
    },
}

impl SteeringAuthority {
    pub fn is_free(&self) -> bool {
        matches!(self, SteeringAuthority::FreeRoam)
    }
}

/// Параметры аниматора (внешняя система анимаций читает их)
///
/// Bool-флаги ("Run") + очередь триггеров ("Scared", "Attack", "Die").
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct AnimatorParams {
    flags: BTreeMap<String, bool>,
    pending_triggers: Vec<String>,
}

impl AnimatorParams {
    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.flags.insert(name.to_string(), value);
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set_trigger(&mut self, name: &str) {
        self.pending_triggers.push(name.to_string());
    }

    pub fn has_trigger(&self, name: &str) -> bool {
        self.pending_triggers.iter().any(|t| t == name)
    }

    /// Забирает триггеры (потребитель - animation layer)
    pub fn take_triggers(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_triggers)
    }
}

/// Входные данные движения игрока (joystick → direction + magnitude)
///
/// Для headless тестов - mock input через этот компонент.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MovementInput {
    /// Направление (XZ, не обязательно normalized)
    pub direction: Vec3,
    /// Отклонение стика 0..1 (walk → run)
    pub magnitude: f32,
}

/// Follower: держится рядом с leader, пока authority == FreeRoam
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Follower {
    pub leader: Entity,
}
