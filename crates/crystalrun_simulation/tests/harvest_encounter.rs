//! Integration tests: harvesting encounter на headless app
//!
//! Игрок входит в зону кристалла → компаньон подходит, канал 5 с, payoff, награда.

use approx::assert_relative_eq;
use bevy::prelude::*;
use crystalrun_simulation::config::HarvestConfig;
use crystalrun_simulation::harvest::{EncounterPhase, HarvestEncounter, PayoffStage};
use crystalrun_simulation::scene::{
    spawn_companion, spawn_crystal, spawn_harvest_controller, spawn_panel, spawn_player, spawn_viewpoint,
};
use crystalrun_simulation::steering::planar_distance;
use crystalrun_simulation::{
    create_headless_app, ScalarChannels, SimulationConfig, SimulationPlugin, SteeringAuthority, UiPanel, Viewpoint,
    Wallet,
};

const MAX_UPDATES: usize = 1500;

struct Fixture {
    app: App,
    player: Entity,
    companion: Entity,
    camera: Entity,
    crystal: Entity,
    progress_ui: Entity,
    controller: Entity,
}

fn setup(harvest: HarvestConfig) -> Fixture {
    let mut app = create_headless_app(7);
    let config = SimulationConfig {
        harvest: harvest.clone(),
        ..Default::default()
    };
    app.add_plugins(SimulationPlugin::new(config));

    let world = app.world_mut();
    let player = spawn_player(world, Vec3::new(8.0, 0.0, 0.0));
    let companion = spawn_companion(world, player, Vec3::ZERO);
    let camera = spawn_viewpoint(world, Vec3::new(0.0, 8.0, 10.0), None);
    let crystal = spawn_crystal(world, Vec3::new(10.0, 0.0, 0.0), 4.0);
    let progress_ui = spawn_panel(world, false);
    let controller = spawn_harvest_controller(world, harvest, companion, Some(camera), Some(progress_ui));

    Fixture {
        app,
        player,
        companion,
        camera,
        crystal,
        progress_ui,
        controller,
    }
}

fn encounter(fixture: &Fixture) -> &HarvestEncounter {
    fixture.app.world().get::<HarvestEncounter>(fixture.controller).unwrap()
}

fn phase(fixture: &Fixture) -> Option<EncounterPhase> {
    encounter(fixture).session.as_ref().map(|session| session.phase)
}

fn authority(fixture: &Fixture) -> SteeringAuthority {
    *fixture.app.world().get::<SteeringAuthority>(fixture.companion).unwrap()
}

fn balance(fixture: &Fixture) -> i64 {
    fixture.app.world().resource::<Wallet>().balance()
}

/// Крутим app, пока условие не выполнится (или MAX_UPDATES)
fn run_until(fixture: &mut Fixture, condition: impl Fn(&Fixture) -> bool) -> bool {
    for _ in 0..MAX_UPDATES {
        fixture.app.update();
        if condition(fixture) {
            return true;
        }
    }
    false
}

fn teleport(fixture: &mut Fixture, entity: Entity, position: Vec3) {
    fixture.app.world_mut().get_mut::<Transform>(entity).unwrap().translation = position;
}

fn sessions_on(fixture: &mut Fixture, resource: Entity) -> usize {
    let world = fixture.app.world_mut();
    world
        .query::<&HarvestEncounter>()
        .iter(world)
        .filter(|encounter| encounter.session.as_ref().is_some_and(|session| session.resource == resource))
        .count()
}

fn is_resolving(fixture: &Fixture) -> bool {
    matches!(phase(fixture), Some(EncounterPhase::Resolving(_)))
}

#[test]
fn test_full_harvest_credits_reward_and_removes_crystal() {
    let mut fixture = setup(HarvestConfig::default());

    assert!(run_until(&mut fixture, |f| phase(f).is_some()), "session never started");
    assert!(matches!(authority(&fixture), SteeringAuthority::Encounter { .. }));

    assert!(
        run_until(&mut fixture, |f| balance(f) == 150),
        "reward was never credited"
    );
    fixture.app.update();

    assert!(fixture.app.world().get_entity(fixture.crystal).is_err());
    assert!(encounter(&fixture).session.is_none());
    assert_eq!(authority(&fixture), SteeringAuthority::FreeRoam);
    assert_eq!(balance(&fixture), 150);

    // UI спрятан задолго до конца полёта
    let panel = fixture.app.world().get::<UiPanel>(fixture.progress_ui).unwrap();
    assert!(!panel.visible);
}

#[test]
fn test_channel_progress_is_monotonic() {
    let mut fixture = setup(HarvestConfig::default());

    assert!(run_until(&mut fixture, |f| phase(f) == Some(EncounterPhase::Channeling)));

    let mut last = 0.0;
    for _ in 0..120 {
        fixture.app.update();
        let progress = encounter(&fixture).session.as_ref().unwrap().progress;
        assert!(progress >= last, "progress went back: {} < {}", progress, last);
        last = progress;
    }
    assert!(last > 0.3);

    let fill = fixture
        .app
        .world()
        .get::<ScalarChannels>(fixture.progress_ui)
        .unwrap()
        .get("fill")
        .unwrap();
    assert_relative_eq!(fill, last, epsilon = 1e-4);
}

#[test]
fn test_player_exit_cancels_without_reward_and_reentry_restarts() {
    let mut fixture = setup(HarvestConfig::default());

    assert!(run_until(&mut fixture, |f| {
        f.app
            .world()
            .get::<HarvestEncounter>(f.controller)
            .and_then(|e| e.session.as_ref())
            .is_some_and(|s| s.phase == EncounterPhase::Channeling && s.progress >= 0.6)
    }));
    let first_id = encounter(&fixture).session.as_ref().unwrap().id;

    let player = fixture.player;
    teleport(&mut fixture, player, Vec3::new(30.0, 0.0, 0.0));
    fixture.app.update();

    // Тот же тик: сессии нет, компаньон свободен, награды нет
    assert!(encounter(&fixture).session.is_none());
    assert_eq!(authority(&fixture), SteeringAuthority::FreeRoam);
    assert_eq!(balance(&fixture), 100);
    assert!(fixture.app.world().get_entity(fixture.crystal).is_ok());
    let fill = fixture
        .app
        .world()
        .get::<ScalarChannels>(fixture.progress_ui)
        .unwrap()
        .get("fill")
        .unwrap();
    assert_eq!(fill, 0.0);

    // Канал больше не тикает
    for _ in 0..30 {
        fixture.app.update();
    }
    assert!(encounter(&fixture).session.is_none());
    assert_eq!(balance(&fixture), 100);

    teleport(&mut fixture, player, Vec3::new(8.0, 0.0, 0.0));
    fixture.app.update();

    let session = encounter(&fixture).session.as_ref().expect("re-entry must open a new session");
    assert_ne!(session.id, first_id);
    assert_eq!(session.resource, fixture.crystal);
    assert_eq!(session.progress, 0.0);
}

#[test]
fn test_entering_another_zone_while_active_is_ignored() {
    let mut fixture = setup(HarvestConfig::default());
    let second = spawn_crystal(fixture.app.world_mut(), Vec3::new(10.0, 0.0, 5.0), 4.0);

    assert!(run_until(&mut fixture, |f| phase(f).is_some()));
    let first_id = encounter(&fixture).session.as_ref().unwrap().id;

    // Внутри обеих зон сразу
    let player = fixture.player;
    teleport(&mut fixture, player, Vec3::new(9.0, 0.0, 2.5));
    for _ in 0..5 {
        fixture.app.update();
    }

    let session = encounter(&fixture).session.as_ref().unwrap();
    assert_eq!(session.id, first_id);
    assert_eq!(session.resource, fixture.crystal);
    assert!(fixture.app.world().get_entity(second).is_ok());
}

#[test]
fn test_companion_stops_at_stand_off() {
    let mut fixture = setup(HarvestConfig {
        clearance: 0.5,
        ..Default::default()
    });

    assert!(run_until(&mut fixture, |f| phase(f).is_some()));
    assert_relative_eq!(encounter(&fixture).session.as_ref().unwrap().stand_off, 1.5);

    assert!(run_until(&mut fixture, |f| phase(f) != Some(EncounterPhase::Approaching)));
    assert_eq!(phase(&fixture), Some(EncounterPhase::Aligning));

    let companion = fixture.app.world().get::<Transform>(fixture.companion).unwrap().translation;
    let distance = planar_distance(companion, Vec3::new(10.0, 0.0, 0.0));
    assert!(distance <= 1.5 + 1e-3, "companion too far: {}", distance);
    assert!(distance > 1.3, "companion overshot: {}", distance);
}

#[test]
fn test_vanished_crystal_releases_companion() {
    let mut fixture = setup(HarvestConfig::default());

    assert!(run_until(&mut fixture, |f| phase(f) == Some(EncounterPhase::Channeling)));
    let crystal = fixture.crystal;
    fixture.app.world_mut().despawn(crystal);
    fixture.app.update();

    assert!(encounter(&fixture).session.is_none());
    assert_eq!(authority(&fixture), SteeringAuthority::FreeRoam);
    assert_eq!(balance(&fixture), 100);
}

#[test]
fn test_channel_resolves_once_after_five_seconds() {
    let mut fixture = setup(HarvestConfig::default());

    let mut channel_started = None;
    let mut resolved_at = None;
    let mut resolutions = 0;
    let mut previous = None;

    for update in 0..MAX_UPDATES {
        fixture.app.update();
        let current = phase(&fixture);

        if current == Some(EncounterPhase::Channeling) && channel_started.is_none() {
            channel_started = Some(update);
        }
        if current == Some(EncounterPhase::Resolving(PayoffStage::Shrinking))
            && previous != Some(EncounterPhase::Resolving(PayoffStage::Shrinking))
        {
            resolutions += 1;
            if resolved_at.is_none() {
                resolved_at = Some(update);
            }
            assert_relative_eq!(encounter(&fixture).session.as_ref().unwrap().progress, 1.0);
        }
        previous = current;

        if balance(&fixture) == 150 {
            break;
        }
    }

    let channel_started = channel_started.expect("channel never started");
    let resolved_at = resolved_at.expect("channel never resolved");
    // 300 тиков канала по 1/60 = 5.0 с, тик старта входит в канал
    assert_eq!(resolved_at - channel_started + 1, 300);
    assert_eq!(resolutions, 1);
    assert_eq!(balance(&fixture), 150);
}

#[test]
fn test_exit_on_completion_tick_still_rewards() {
    let mut fixture = setup(HarvestConfig::default());

    assert!(run_until(&mut fixture, |f| {
        encounter(f).session.as_ref().is_some_and(|session| session.progress >= 1.0)
    }));
    assert_eq!(phase(&fixture), Some(EncounterPhase::Resolving(PayoffStage::Shrinking)));

    let player = fixture.player;
    teleport(&mut fixture, player, Vec3::new(30.0, 0.0, 0.0));

    assert!(run_until(&mut fixture, |f| balance(f) == 150), "completed channel was cancelled");
    fixture.app.update();
    assert!(encounter(&fixture).session.is_none());
    assert!(fixture.app.world().get_entity(fixture.crystal).is_err());
}

#[test]
fn test_exit_during_payoff_is_ignored() {
    let mut fixture = setup(HarvestConfig::default());

    assert!(run_until(&mut fixture, |f| {
        phase(f) == Some(EncounterPhase::Resolving(PayoffStage::Flying))
    }));

    let player = fixture.player;
    teleport(&mut fixture, player, Vec3::new(30.0, 0.0, 0.0));
    fixture.app.update();
    assert!(is_resolving(&fixture));

    assert!(run_until(&mut fixture, |f| balance(f) == 150));
    fixture.app.update();
    assert!(encounter(&fixture).session.is_none());
    assert_eq!(authority(&fixture), SteeringAuthority::FreeRoam);
    assert!(fixture.app.world().get_entity(fixture.crystal).is_err());
}

#[test]
fn test_one_session_per_resource_across_controllers() {
    let mut fixture = setup(HarvestConfig::default());
    let world = fixture.app.world_mut();
    let second_companion = spawn_companion(world, fixture.player, Vec3::new(0.0, 0.0, 3.0));
    spawn_harvest_controller(world, HarvestConfig::default(), second_companion, None, None);

    let crystal = fixture.crystal;
    assert!(run_until(&mut fixture, |f| {
        f.app
            .world()
            .iter_entities()
            .filter_map(|entity| entity.get::<HarvestEncounter>())
            .any(|encounter| matches!(encounter.session.as_ref().map(|s| s.phase), Some(EncounterPhase::Resolving(_))))
    }));
    assert_eq!(sessions_on(&mut fixture, crystal), 1);

    // Игрок выходит и снова заходит, пока payoff идёт
    let player = fixture.player;
    teleport(&mut fixture, player, Vec3::new(30.0, 0.0, 0.0));
    fixture.app.update();
    fixture.app.update();
    let inside = fixture.app.world().get::<Transform>(crystal).unwrap().translation;
    teleport(&mut fixture, player, inside);
    for _ in 0..3 {
        fixture.app.update();
        assert_eq!(sessions_on(&mut fixture, crystal), 1);
    }

    let owned = [fixture.companion, second_companion]
        .iter()
        .filter(|companion| {
            matches!(
                fixture.app.world().get::<SteeringAuthority>(**companion),
                Some(SteeringAuthority::Encounter { .. })
            )
        })
        .count();
    assert_eq!(owned, 1);

    assert!(run_until(&mut fixture, |f| balance(f) == 150));
    for _ in 0..30 {
        fixture.app.update();
    }
    assert_eq!(balance(&fixture), 150);
    assert_eq!(sessions_on(&mut fixture, crystal), 0);
}

#[test]
fn test_progress_ui_turns_to_active_viewpoint() {
    let mut fixture = setup(HarvestConfig::default());

    // Заданная камера выключена: UI ищет активную
    let camera = fixture.camera;
    fixture.app.world_mut().get_mut::<Viewpoint>(camera).unwrap().active = false;
    let active = spawn_viewpoint(fixture.app.world_mut(), Vec3::new(-10.0, 5.0, 0.0), None);

    assert!(run_until(&mut fixture, |f| phase(f) == Some(EncounterPhase::Channeling)));
    for _ in 0..200 {
        fixture.app.update();
    }
    assert_eq!(phase(&fixture), Some(EncounterPhase::Channeling));

    let world = fixture.app.world();
    let ui = world.get::<Transform>(fixture.progress_ui).unwrap();
    let viewer = world.get::<Transform>(active).unwrap().translation;
    let to_viewer = (viewer - ui.translation).normalize();
    assert!(ui.forward().as_vec3().dot(to_viewer) > 0.99);
}
