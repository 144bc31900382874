//! Balance display: counter + punch-scale на рост баланса.

use bevy::prelude::*;

use super::BalanceChanged;
use crate::components::ScalarChannels;
use crate::tween::{Ease, Sequence, SequenceHandle, Tween, TweenScheduler, TweenValue};

/// Канал, в котором живёт отображаемое число
pub const BALANCE_CHANNEL: &str = "balance";

/// Счётчик баланса на экране (Transform = "handler", который пульсирует)
#[derive(Component, Debug, Clone, PartialEq)]
pub struct BalanceDisplay {
    pub punch_scale: f32,
    pub punch_duration: f32,
    pub counter_duration: f32,
    counter: Option<SequenceHandle>,
}

impl Default for BalanceDisplay {
    fn default() -> Self {
        Self {
            punch_scale: 0.15,
            punch_duration: 0.3,
            counter_duration: 0.5,
            counter: None,
        }
    }
}

impl BalanceDisplay {
    /// Отображаемое значение (целое, как в тексте)
    pub fn shown(channels: &ScalarChannels) -> i64 {
        channels.get(BALANCE_CHANNEL).map(|value| value.round() as i64).unwrap_or(0)
    }
}

/// Система: BalanceChanged → анимация счётчика
///
/// Рост: punch (scale 1 + punch, потом обратно 1) + counter tween до нового
/// значения (OutQuad). Падение / ноль: сразу новое значение.
pub fn animate_balance_display(
    mut changes: EventReader<BalanceChanged>,
    mut displays: Query<(Entity, &mut BalanceDisplay, &mut ScalarChannels)>,
    mut tweens: ResMut<TweenScheduler>,
) {
    for change in changes.read() {
        for (entity, mut display, mut channels) in displays.iter_mut() {
            if let Some(counter) = display.counter.take() {
                tweens.kill(counter);
            }

            if change.difference() <= 0 {
                channels.set(BALANCE_CHANNEL, change.current as f32);
                continue;
            }

            let half = display.punch_duration * 0.5;
            tweens.start(
                Sequence::new()
                    .append(Tween::scale_to(entity, Vec3::splat(1.0 + display.punch_scale), half).ease(Ease::OutQuad))
                    .append(Tween::scale_to(entity, Vec3::ONE, half).ease(Ease::InQuad)),
            );

            let from = channels.get(BALANCE_CHANNEL).unwrap_or(change.previous as f32);
            display.counter = Some(tweens.start(Sequence::single(
                Tween::scalar_to(entity, BALANCE_CHANNEL, change.current as f32, display.counter_duration)
                    .from(TweenValue::Scalar(from))
                    .ease(Ease::OutQuad),
            )));

            crate::log(&format!(
                "Balance display {:?}: {} → {}",
                entity, change.previous, change.current
            ));
        }
    }
}
