//! Integration tests: hostile agent FSM на headless app
//!
//! Patrol → Chase → Attack (хореография) → Attacking → AttackConnected → kill sequence.

use approx::assert_relative_eq;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use crystalrun_simulation::agent::{AgentLinks, AttackProgress, PatrolRoute};
use crystalrun_simulation::config::AgentConfig;
use crystalrun_simulation::scene::{spawn_hostile_agent, spawn_panel, spawn_player, spawn_viewpoint, AgentSpawn};
use crystalrun_simulation::steering::planar_distance;
use crystalrun_simulation::{
    create_headless_app, AgentState, AnimatorParams, AttackConnected, CameraFollow, CameraShake, FootstepEvent,
    FreeLocomotion, HitEffect, SimulationPlugin, UiPanel,
};

const MAX_UPDATES: usize = 600;

struct Fixture {
    app: App,
    player: Entity,
    camera: Entity,
    hud: Entity,
    death_panel: Entity,
    agent: Entity,
}

fn setup(agent_position: Vec3, with_camera: bool) -> Fixture {
    let mut app = create_headless_app(11);
    app.add_plugins(SimulationPlugin::default());

    let world = app.world_mut();
    let player = spawn_player(world, Vec3::ZERO);
    let camera = spawn_viewpoint(world, Vec3::new(0.0, 8.0, 10.0), Some(player));
    let hud = spawn_panel(world, true);
    let death_panel = spawn_panel(world, false);
    let agent = spawn_hostile_agent(
        world,
        AgentSpawn {
            position: agent_position,
            waypoints: vec![
                agent_position + Vec3::new(-3.0, 0.0, 0.0),
                agent_position + Vec3::new(3.0, 0.0, 0.0),
            ],
            detection: Vec3::new(4.0, 2.0, 8.0),
            links: AgentLinks {
                player: Some(player),
                camera: with_camera.then_some(camera),
                death_panel: Some(death_panel),
                hud: vec![hud],
            },
            config: AgentConfig::default(),
        },
    );

    Fixture {
        app,
        player,
        camera,
        hud,
        death_panel,
        agent,
    }
}

fn state(fixture: &Fixture) -> AgentState {
    *fixture.app.world().get::<AgentState>(fixture.agent).unwrap()
}

fn run_until(fixture: &mut Fixture, condition: impl Fn(&Fixture) -> bool) -> bool {
    for _ in 0..MAX_UPDATES {
        fixture.app.update();
        if condition(fixture) {
            return true;
        }
    }
    false
}

fn hit_effects(fixture: &mut Fixture) -> usize {
    let world = fixture.app.world_mut();
    world.query::<&HitEffect>().iter(world).count()
}

#[test]
fn test_patrol_cycles_waypoints() {
    // Игрок далеко за пределами detection box
    let mut fixture = setup(Vec3::new(0.0, 0.0, -40.0), true);

    let mut visited = Vec::new();
    for _ in 0..MAX_UPDATES {
        fixture.app.update();
        let current = fixture.app.world().get::<PatrolRoute>(fixture.agent).unwrap().current;
        if visited.last() != Some(&current) {
            visited.push(current);
        }
    }

    assert_eq!(state(&fixture), AgentState::Patrol);
    assert!(visited.len() >= 3, "waypoints visited: {:?}", visited);
    assert_eq!(&visited[..3], &[0, 1, 0]);
}

#[test]
fn test_chase_ends_in_attack_choreography() {
    let mut fixture = setup(Vec3::new(0.0, 0.0, -6.0), true);

    assert!(run_until(&mut fixture, |f| state(f) == AgentState::Chase));
    let agent_params = fixture.app.world().get::<AnimatorParams>(fixture.agent).unwrap();
    assert!(agent_params.get_bool("Run"));

    assert!(run_until(&mut fixture, |f| state(f) == AgentState::Attacking));
    let world = fixture.app.world();

    let agent_params = world.get::<AnimatorParams>(fixture.agent).unwrap();
    assert!(agent_params.has_trigger("Attack"));
    assert!(!agent_params.get_bool("Run"));
    let player_params = world.get::<AnimatorParams>(fixture.player).unwrap();
    assert!(player_params.has_trigger("Scared"));

    // Игрок выключен из locomotion и физики
    assert!(!world.get::<FreeLocomotion>(fixture.player).unwrap().enabled);
    assert!(matches!(
        world.get::<RigidBody>(fixture.player).unwrap(),
        RigidBody::KinematicPositionBased
    ));

    assert!(!world.get::<UiPanel>(fixture.hud).unwrap().visible);
    assert!(!world.get::<CameraFollow>(fixture.camera).unwrap().enabled);

    // Игрок стоит перед агентом на stand-off дистанции
    let agent = world.get::<Transform>(fixture.agent).unwrap().translation;
    let player = world.get::<Transform>(fixture.player).unwrap().translation;
    assert_relative_eq!(planar_distance(agent, player), 2.3, epsilon = 0.05);

    // Камера ушла на two-shot
    let camera = world.get::<Transform>(fixture.camera).unwrap().translation;
    assert!(camera.distance(Vec3::new(0.0, 8.0, 10.0)) > 0.5);
}

#[test]
fn test_attack_connected_runs_kill_sequence() {
    let mut fixture = setup(Vec3::new(0.0, 0.0, -6.0), true);
    assert!(run_until(&mut fixture, |f| state(f) == AgentState::Attacking));

    let agent = fixture.agent;
    fixture.app.world_mut().send_event(AttackConnected { agent });
    fixture.app.update();

    assert_eq!(hit_effects(&mut fixture), 1);
    let player_params = fixture.app.world().get::<AnimatorParams>(fixture.player).unwrap();
    assert!(player_params.has_trigger("Die"));
    assert!(fixture.app.world().get::<AttackProgress>(agent).unwrap().kill.is_some());

    // Повторный сигнал игнорируется
    fixture.app.world_mut().send_event(AttackConnected { agent });
    fixture.app.update();
    assert_eq!(hit_effects(&mut fixture), 1);

    // Панель ещё скрыта до конца паузы
    assert!(!fixture.app.world().get::<UiPanel>(fixture.death_panel).unwrap().visible);

    // 5 с паузы + 0.5 с scale-in
    for _ in 0..400 {
        fixture.app.update();
    }
    let world = fixture.app.world();
    assert!(world.get::<UiPanel>(fixture.death_panel).unwrap().visible);
    let scale = world.get::<Transform>(fixture.death_panel).unwrap().scale;
    assert_relative_eq!(scale.x, 1.0, epsilon = 1e-3);
}

#[test]
fn test_attack_connected_outside_attacking_is_ignored() {
    let mut fixture = setup(Vec3::new(0.0, 0.0, -40.0), true);
    for _ in 0..10 {
        fixture.app.update();
    }

    let agent = fixture.agent;
    fixture.app.world_mut().send_event(AttackConnected { agent });
    for _ in 0..10 {
        fixture.app.update();
    }

    assert_eq!(state(&fixture), AgentState::Patrol);
    assert_eq!(hit_effects(&mut fixture), 0);
    assert!(fixture.app.world().get::<AttackProgress>(agent).unwrap().kill.is_none());
}

#[test]
fn test_missing_camera_still_reaches_attacking() {
    let mut fixture = setup(Vec3::new(0.0, 0.0, -6.0), false);

    assert!(run_until(&mut fixture, |f| state(f) == AgentState::Attacking));
    let player_params = fixture.app.world().get::<AnimatorParams>(fixture.player).unwrap();
    assert!(player_params.has_trigger("Scared"));
    // Без ссылки на камеру follow не трогается
    assert!(fixture.app.world().get::<CameraFollow>(fixture.camera).unwrap().enabled);
}

#[test]
fn test_footstep_shakes_camera() {
    let mut fixture = setup(Vec3::new(0.0, 0.0, -40.0), true);
    fixture.app.update();

    let agent = fixture.agent;
    fixture.app.world_mut().send_event(FootstepEvent { agent });
    fixture.app.update();

    let shake = fixture.app.world().get::<CameraShake>(fixture.camera).unwrap();
    assert!(shake.is_active());
    assert_relative_eq!(shake.intensity, AgentConfig::default().shake_intensity);

    for _ in 0..30 {
        fixture.app.update();
    }
    let shake = fixture.app.world().get::<CameraShake>(fixture.camera).unwrap();
    assert!(!shake.is_active());
    assert_eq!(shake.applied, Vec3::ZERO);
}
