//! Animation-tween scheduler
//!
//! Маленький внутренний аналог tween-библиотеки:
//! - Tween: target + curve + duration + ease + delay
//! - Sequence: append / join timeline с одним on_complete
//! - TweenScheduler: advance каждый тик, kill без callback (идемпотентно)
//!
//! Callback вызывается ровно один раз. Убитая sequence оставляет последнее
//! записанное значение (никакого snap-back).

use bevy::prelude::*;

pub mod ease;
pub mod primitives;
pub mod scheduler;
pub mod sequence;


pub use ease::Ease;
pub use primitives::{catmull_rom_path, Tween, TweenCurve, TweenTarget, TweenValue};
pub use scheduler::{run_tweens, Completed, SequenceHandle, TweenBackend, TweenScheduler, WorldBackend};
pub use sequence::{Sequence, SequenceCallback};

use crate::OrchestrationSet;

/// Tween Plugin (OrchestrationSet::Animation - после procedures, до locomotion)
pub struct TweenPlugin;

impl Plugin for TweenPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TweenScheduler>()
            .add_systems(FixedUpdate, run_tweens.in_set(OrchestrationSet::Animation));
    }
}
