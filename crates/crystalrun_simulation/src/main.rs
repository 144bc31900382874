//! Headless симуляция CrystalRun
//!
//! Демо-сцена: игрок идёт к кристаллу, компаньон его собирает, потом игрок
//! уходит к патрулю агента. Первый аргумент - путь к JSON конфигу (опционально).

use std::process::ExitCode;

use bevy::prelude::*;
use crystalrun_simulation::scene::spawn_demo_scene;
use crystalrun_simulation::{create_headless_app, log_error, MovementInput, SimulationConfig, SimulationPlugin, Wallet};

const TICKS: usize = 1200;

fn load_config() -> Result<SimulationConfig, String> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(SimulationConfig::default());
    };
    let json = std::fs::read_to_string(&path).map_err(|err| format!("failed to read {}: {}", path, err))?;
    SimulationConfig::from_json_str(&json).map_err(|err| err.to_string())
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            log_error(&err);
            return ExitCode::FAILURE;
        }
    };

    let seed = config.rng_seed;
    println!("Starting CrystalRun headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin::new(config.clone()));
    let scene = spawn_demo_scene(app.world_mut(), &config);

    for tick in 0..TICKS {
        // Скриптованный input: к первому кристаллу, ждём сбор, к агенту
        let input = match tick {
            0..=60 => MovementInput {
                direction: Vec3::X,
                magnitude: 0.5,
            },
            700..=1000 => MovementInput {
                direction: Vec3::NEG_Z,
                magnitude: 1.0,
            },
            _ => MovementInput::default(),
        };
        if let Some(mut movement) = app.world_mut().get_mut::<MovementInput>(scene.player) {
            *movement = input;
        }

        app.update();

        if tick % 100 == 0 {
            let world = app.world();
            let balance = world.resource::<Wallet>().balance();
            let entity_count = world.entities().len();
            println!("Tick {}: {} entities, balance {}", tick, entity_count, balance);
        }
    }

    println!(
        "Simulation complete! Balance: {}",
        app.world().resource::<Wallet>().balance()
    );
    ExitCode::SUCCESS
}
