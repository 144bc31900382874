//! Hostile agent events.

use bevy::prelude::*;

/// Агент вошёл в Attack (внутреннее: запускает хореографию)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackBegan {
    pub agent: Entity,
}

/// Внешний сигнал: анимация атаки дошла до удара
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackConnected {
    pub agent: Entity,
}

/// Death handler игрока (внешние системы: звук, ragdoll, аналитика)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerKilled {
    pub player: Entity,
    pub agent: Entity,
}

/// Внешний сигнал: шаг агента (animation event) → тряска камеры
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootstepEvent {
    pub agent: Entity,
}
