//! Scene assembly: spawn helpers для актёров, зон, UI и демо-сцены.
//!
//! Загрузка сцен снаружи; здесь только то, что нужно headless симуляции и тестам.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::agent::{AgentLinks, AgentState, AttackProgress, HostileAgent, PatrolRoute, PlayerDetection};
use crate::components::{
    ActorKind, AnimatorParams, CameraFollow, CameraShake, Companion, Follower, FreeLocomotion, MovementInput,
    Player, ScalarChannels, SteeringAuthority, UiPanel, Viewpoint, ZoneSubject,
};
use crate::config::{AgentConfig, HarvestConfig, SimulationConfig};
use crate::harvest::{HarvestEncounter, Harvestable};
use crate::steering::SteeringState;
use crate::wallet::display::BALANCE_CHANNEL;
use crate::wallet::BalanceDisplay;
use crate::zone::{SubjectFilter, Zone, ZoneShape};

/// Offset камеры от игрока по умолчанию
pub const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 8.0, 10.0);

pub fn spawn_player(world: &mut World, position: Vec3) -> Entity {
    world
        .spawn((
            Player,
            ZoneSubject(ActorKind::Player),
            Transform::from_translation(position),
            MovementInput::default(),
            FreeLocomotion::default(),
            SteeringState::default(),
            Velocity::zero(),
            RigidBody::Dynamic,
            Collider::capsule_y(0.5, 0.4),
            AnimatorParams::default(),
        ))
        .id()
}

pub fn spawn_companion(world: &mut World, leader: Entity, position: Vec3) -> Entity {
    world
        .spawn((
            Companion,
            ZoneSubject(ActorKind::Companion),
            Follower { leader },
            SteeringAuthority::default(),
            FreeLocomotion::default(),
            SteeringState::default(),
            Velocity::zero(),
            RigidBody::Dynamic,
            Collider::ball(0.3),
            Transform::from_translation(position),
        ))
        .id()
}

/// Активная камера; с `follow` - следует за target на CAMERA_OFFSET
pub fn spawn_viewpoint(world: &mut World, position: Vec3, follow: Option<Entity>) -> Entity {
    let mut camera = world.spawn((
        Viewpoint::default(),
        CameraShake::default(),
        Transform::from_translation(position).looking_at(position - CAMERA_OFFSET, Vec3::Y),
    ));
    if let Some(target) = follow {
        camera.insert(CameraFollow::new(target, CAMERA_OFFSET));
    }
    camera.id()
}

/// UI панель (HUD, death panel, progress) с каналом "fill"
pub fn spawn_panel(world: &mut World, visible: bool) -> Entity {
    let scale = if visible { Vec3::ONE } else { Vec3::ZERO };
    world
        .spawn((
            UiPanel { visible },
            Transform::from_scale(scale),
            ScalarChannels::default().with("fill", 0.0),
        ))
        .id()
}

/// Параметры спавна hostile agent
#[derive(Debug, Clone)]
pub struct AgentSpawn {
    pub position: Vec3,
    pub waypoints: Vec<Vec3>,
    /// Detection box (half extents, agent-local)
    pub detection: Vec3,
    pub links: AgentLinks,
    pub config: AgentConfig,
}

pub fn spawn_hostile_agent(world: &mut World, spawn: AgentSpawn) -> Entity {
    world
        .spawn((
            HostileAgent { config: spawn.config },
            AgentState::default(),
            PatrolRoute::new(spawn.waypoints),
            spawn.links,
            PlayerDetection::default(),
            AttackProgress::default(),
            SteeringState::default(),
            Velocity::zero(),
            RigidBody::Dynamic,
            Collider::cuboid(0.5, 1.0, 0.5),
            AnimatorParams::default(),
            ZoneSubject(ActorKind::Agent),
            Transform::from_translation(spawn.position),
            Zone {
                shape: ZoneShape::cuboid(spawn.detection),
                filter: SubjectFilter::only(ActorKind::Player),
            },
        ))
        .id()
}

/// Кристалл: sphere зона (игрок + компаньон), дочерний меш и частицы
pub fn spawn_crystal(world: &mut World, position: Vec3, radius: f32) -> Entity {
    let crystal = world
        .spawn((
            Transform::from_translation(position),
            Zone {
                shape: ZoneShape::sphere(radius),
                filter: SubjectFilter::only(ActorKind::Player).with(ActorKind::Companion),
            },
        ))
        .id();

    let visual = world.spawn((Transform::default(), ChildOf(crystal))).id();
    let particles = world
        .spawn((
            Transform::default(),
            ScalarChannels::default().with("size", 1.0),
            ChildOf(crystal),
        ))
        .id();

    world.entity_mut(crystal).insert(Harvestable {
        reward: None,
        child_visual: Some(visual),
        particles: vec![particles],
    });
    crystal
}

pub fn spawn_harvest_controller(
    world: &mut World,
    config: HarvestConfig,
    companion: Entity,
    viewer: Option<Entity>,
    progress_ui: Option<Entity>,
) -> Entity {
    let mut encounter = HarvestEncounter::new(config, Some(companion));
    if let Some(viewer) = viewer {
        encounter = encounter.with_viewer(viewer);
    }
    if let Some(ui) = progress_ui {
        encounter = encounter.with_progress_ui(ui);
    }
    world.spawn(encounter).id()
}

pub fn spawn_balance_display(world: &mut World, balance: i64) -> Entity {
    world
        .spawn((
            BalanceDisplay::default(),
            ScalarChannels::default().with(BALANCE_CHANNEL, balance as f32),
            Transform::default(),
        ))
        .id()
}

/// Entities демо-сцены
#[derive(Debug, Clone)]
pub struct DemoScene {
    pub player: Entity,
    pub companion: Entity,
    pub camera: Entity,
    pub hud: Entity,
    pub death_panel: Entity,
    pub progress_ui: Entity,
    pub agent: Entity,
    pub crystals: Vec<Entity>,
    pub controller: Entity,
    pub balance_display: Entity,
}

/// Демо: игрок с компаньоном, два кристалла, патрулирующий агент
pub fn spawn_demo_scene(world: &mut World, config: &SimulationConfig) -> DemoScene {
    let player = spawn_player(world, Vec3::ZERO);
    let companion = spawn_companion(world, player, Vec3::new(-2.0, 0.0, 0.0));
    let camera = spawn_viewpoint(world, CAMERA_OFFSET, Some(player));

    let hud = spawn_panel(world, true);
    let death_panel = spawn_panel(world, false);
    let progress_ui = spawn_panel(world, false);

    let agent = spawn_hostile_agent(
        world,
        AgentSpawn {
            position: Vec3::new(0.0, 0.0, -20.0),
            waypoints: vec![Vec3::new(-5.0, 0.0, -20.0), Vec3::new(5.0, 0.0, -20.0)],
            detection: Vec3::new(4.0, 2.0, 4.0),
            links: AgentLinks {
                player: Some(player),
                camera: Some(camera),
                death_panel: Some(death_panel),
                hud: vec![hud],
            },
            config: config.agent.clone(),
        },
    );

    let crystals = vec![
        spawn_crystal(world, Vec3::new(6.0, 0.0, 0.0), 3.0),
        spawn_crystal(world, Vec3::new(-8.0, 0.0, 4.0), 3.0),
    ];
    let controller = spawn_harvest_controller(
        world,
        config.harvest.clone(),
        companion,
        Some(camera),
        Some(progress_ui),
    );
    let balance_display = spawn_balance_display(world, config.starting_balance);

    crate::log_info(&format!(
        "Demo scene: player {:?}, companion {:?}, agent {:?}, {} crystals",
        player,
        companion,
        agent,
        crystals.len()
    ));

    DemoScene {
        player,
        companion,
        camera,
        hud,
        death_panel,
        progress_ui,
        agent,
        crystals,
        controller,
        balance_display,
    }
}
