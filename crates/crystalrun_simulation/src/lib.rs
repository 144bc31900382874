//! CrystalRun Simulation Core
//!
//! Behavior orchestration на Bevy 0.16 (headless, FixedUpdate 60Hz):
//! - hostile agent: patrol → chase → attack → attacking (+ kill sequence)
//! - harvesting encounter: approach → align → channel → payoff → reward
//!
//! Общие примитивы: spatial zones, steering, tween scheduler, cooperative procedures.
//!
//! Порядок тика (OrchestrationSet, chained):
//! Zones → Behavior → Procedures → Animation → Locomotion

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod agent;
pub mod camera;
pub mod components;
pub mod config;
pub mod coroutine;
pub mod error;
pub mod harvest;
pub mod logger;
pub mod scene;
pub mod steering;
pub mod tween;
pub mod wallet;
pub mod zone;

// Re-export для удобства
pub use agent::{AgentPlugin, AgentState, AttackConnected, FootstepEvent, HostileAgent, PlayerKilled};
pub use camera::CameraPlugin;
pub use components::*;
pub use config::{ConfigError, SimulationConfig};
pub use coroutine::{CoroutinePlugin, Coroutines};
pub use error::{OrchestrationError, OrReport};
pub use harvest::{EncounterEnded, EncounterOutcome, HarvestEncounter, HarvestPlugin, Harvestable};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level, set_logger, LogLevel,
    LogPrinter,
};
pub use steering::SteeringPlugin;
pub use tween::{TweenPlugin, TweenScheduler};
pub use wallet::{BalanceChanged, Wallet, WalletPlugin};
pub use zone::{Zone, ZoneEvent, ZonePlugin};

/// Фазы FixedUpdate тика
///
/// Zone snapshot считается один раз до всех FSM, поэтому все FSM видят
/// одинаковое членство в этом тике.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrchestrationSet {
    /// Пересчёт членства зон → ZoneEvent
    Zones,
    /// FSM реакции (agent, harvest, wallet)
    Behavior,
    /// Resume cooperative процедур
    Procedures,
    /// Tween scheduler пишет transforms / каналы
    Animation,
    /// Steering → velocity → transform, камера
    Locomotion,
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl SimulationPlugin {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(self.config.rng_seed));
        }

        app.insert_resource(Time::<Fixed>::from_hz(self.config.tick_hz))
            .insert_resource(self.config.clone())
            .configure_sets(
                FixedUpdate,
                (
                    OrchestrationSet::Zones,
                    OrchestrationSet::Behavior,
                    OrchestrationSet::Procedures,
                    OrchestrationSet::Animation,
                    OrchestrationSet::Locomotion,
                )
                    .chain(),
            )
            .add_plugins((
                ZonePlugin,
                SteeringPlugin,
                TweenPlugin,
                CoroutinePlugin,
                CameraPlugin,
                AgentPlugin,
                HarvestPlugin,
                WalletPlugin,
            ))
            .insert_resource(Wallet::new(self.config.starting_balance));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время двигается вручную на один fixed тик за `app.update()`
/// (первый update - нулевой delta).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
