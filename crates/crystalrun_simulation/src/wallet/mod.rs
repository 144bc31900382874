//! Reward sink
//!
//! `Wallet` - целочисленный баланс + уведомление `BalanceChanged(previous, current)`.
//! Harvest только увеличивает его. Хранение баланса между запусками - снаружи.
//! `BalanceDisplay` - счётчик на экране: рост анимируется (punch + counter), падение мгновенно.

use bevy::prelude::*;

pub mod display;

#[cfg(test)]
mod wallet_tests;

pub use display::{animate_balance_display, BalanceDisplay};

use crate::OrchestrationSet;

/// Изменение баланса
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceChanged {
    pub previous: i64,
    pub current: i64,
}

impl BalanceChanged {
    pub fn difference(&self) -> i64 {
        self.current - self.previous
    }
}

/// Resource: баланс игрока
///
/// Меняется только через `credit` / `set`, каждый вызов возвращает событие
/// для отправки вызывающим.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wallet {
    balance: i64,
}

impl Wallet {
    pub fn new(balance: i64) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn credit(&mut self, amount: i64) -> BalanceChanged {
        self.set(self.balance.saturating_add(amount))
    }

    pub fn set(&mut self, balance: i64) -> BalanceChanged {
        let previous = self.balance;
        self.balance = balance;
        BalanceChanged {
            previous,
            current: balance,
        }
    }
}

/// Wallet Plugin
pub struct WalletPlugin;

impl Plugin for WalletPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Wallet>()
            .add_event::<BalanceChanged>()
            .add_systems(
                FixedUpdate,
                animate_balance_display.in_set(OrchestrationSet::Animation).before(crate::tween::run_tweens),
            );
    }
}
