//! Конфигурация симуляции
//!
//! Все значения имеют дефолты оригинальной игры. JSON override через `from_json_str`
//! (любое поле можно опустить, `#[serde(default)]` на каждой структуре).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::ActorKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse simulation config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Корневой конфиг (Resource)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота FixedUpdate
    pub tick_hz: f64,
    pub rng_seed: u64,
    /// Стартовый баланс кошелька
    pub starting_balance: i64,
    pub agent: AgentConfig,
    pub harvest: HarvestConfig,
    pub follower: FollowerConfig,
    pub locomotion: LocomotionConfig,
    pub camera: CameraConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            rng_seed: 42,
            starting_balance: 100,
            agent: AgentConfig::default(),
            harvest: HarvestConfig::default(),
            follower: FollowerConfig::default(),
            locomotion: LocomotionConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Все числа конечны; скорости, rates и радиусы > 0, остальное >= 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(ConfigError::Invalid {
                field: "tick_hz",
                reason: "must be positive",
            });
        }

        let (agent, harvest, follower, locomotion, camera) =
            (&self.agent, &self.harvest, &self.follower, &self.locomotion, &self.camera);

        for (field, value) in [
            ("agent.patrol_speed", agent.patrol_speed),
            ("agent.chase_speed", agent.chase_speed),
            ("agent.acceleration", agent.acceleration),
            ("agent.deceleration", agent.deceleration),
            ("agent.rotation_speed", agent.rotation_speed),
            ("agent.waypoint_radius", agent.waypoint_radius),
            ("harvest.channel_duration", harvest.channel_duration),
            ("harvest.approach_speed", harvest.approach_speed),
            ("harvest.ui_rotation_speed", harvest.ui_rotation_speed),
            ("harvest.fallback_radius", harvest.fallback_radius),
            ("follower.move_speed", follower.move_speed),
            ("follower.acceleration", follower.acceleration),
            ("follower.deceleration", follower.deceleration),
            ("follower.rotation_speed", follower.rotation_speed),
            ("locomotion.walk_speed", locomotion.walk_speed),
            ("locomotion.run_speed", locomotion.run_speed),
            ("locomotion.acceleration", locomotion.acceleration),
            ("locomotion.deceleration", locomotion.deceleration),
            ("locomotion.rotation_speed", locomotion.rotation_speed),
            ("camera.position_damping", camera.position_damping),
            ("camera.max_speed", camera.max_speed),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be positive",
                });
            }
        }

        for (field, value) in [
            ("agent.attack_distance", agent.attack_distance),
            ("agent.stand_off_distance", agent.stand_off_distance),
            ("agent.player_turn_duration", agent.player_turn_duration),
            ("agent.camera_move_duration", agent.camera_move_duration),
            ("agent.default_actor_height", agent.default_actor_height),
            ("agent.death_panel_delay", agent.death_panel_delay),
            ("agent.death_panel_scale_duration", agent.death_panel_scale_duration),
            ("agent.shake_intensity", agent.shake_intensity),
            ("agent.shake_duration", agent.shake_duration),
            ("harvest.align_duration", harvest.align_duration),
            ("harvest.ui_show_duration", harvest.ui_show_duration),
            ("harvest.shrink_duration", harvest.shrink_duration),
            ("harvest.shrink_scale", harvest.shrink_scale),
            ("harvest.fly_duration", harvest.fly_duration),
            ("harvest.fly_height", harvest.fly_height),
            ("harvest.fly_end_offset", harvest.fly_end_offset),
            ("harvest.stand_off_factor", harvest.stand_off_factor),
            ("harvest.clearance", harvest.clearance),
            ("follower.follow_distance", follower.follow_distance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be non-negative",
                });
            }
        }

        if !harvest.fly_spin_degrees.iter().all(|degrees| degrees.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "harvest.fly_spin_degrees",
                reason: "must be finite",
            });
        }
        if harvest.reward < 0 {
            return Err(ConfigError::Invalid {
                field: "harvest.reward",
                reason: "reward sink is only ever incremented",
            });
        }
        if !(0.0..=1.0).contains(&harvest.fly_shrink_fraction) {
            return Err(ConfigError::Invalid {
                field: "harvest.fly_shrink_fraction",
                reason: "must be within 0..=1",
            });
        }
        Ok(())
    }
}

/// Параметры hostile agent (patrol / chase / attack)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct AgentConfig {
    pub patrol_speed: f32,
    pub chase_speed: f32,
    /// Steering blend rates. 60 при 60Hz = мгновенная смена скорости
    pub acceleration: f32,
    pub deceleration: f32,
    /// Скорость slerp поворота (1/s)
    pub rotation_speed: f32,
    /// Радиус достижения waypoint (planar)
    pub waypoint_radius: f32,
    /// Planar дистанция Chase → Attack
    pub attack_distance: f32,
    /// Точка, куда ставим игрока перед агентом
    pub stand_off_distance: f32,
    pub player_turn_duration: f32,
    pub camera_move_duration: f32,
    /// Высота актёра, если у кого-то нет коллайдера
    pub default_actor_height: f32,
    pub death_panel_delay: f32,
    pub death_panel_scale_duration: f32,
    pub shake_intensity: f32,
    pub shake_duration: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            patrol_speed: 2.0,
            chase_speed: 5.0,
            acceleration: 60.0,
            deceleration: 60.0,
            rotation_speed: 10.0,
            waypoint_radius: 0.5,
            attack_distance: 2.0,
            stand_off_distance: 2.3,
            player_turn_duration: 0.1,
            camera_move_duration: 0.15,
            default_actor_height: 2.0,
            death_panel_delay: 5.0,
            death_panel_scale_duration: 0.5,
            shake_intensity: 0.1,
            shake_duration: 0.1,
        }
    }
}

/// Параметры harvesting encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct HarvestConfig {
    /// Кто открывает сессию входом в зону ресурса
    pub entry_subject: ActorKind,
    /// Кто отменяет сессию выходом из зоны
    pub cancel_subject: ActorKind,
    pub channel_duration: f32,
    pub reward: i64,
    /// Скорость подхода компаньона к ресурсу
    pub approach_speed: f32,
    pub align_duration: f32,
    pub ui_show_duration: f32,
    pub ui_rotation_speed: f32,
    pub shrink_duration: f32,
    pub shrink_scale: f32,
    pub fly_duration: f32,
    pub fly_height: f32,
    /// Конец полёта: над компаньоном на эту высоту
    pub fly_end_offset: f32,
    /// Euler градусы (x, y, z) за полёт
    pub fly_spin_degrees: [f32; 3],
    /// Доля полёта в конце, за которую ресурс сжимается в 0
    pub fly_shrink_fraction: f32,
    /// stand-off = radius * factor - clearance
    pub stand_off_factor: f32,
    pub clearance: f32,
    /// Радиус для формы зоны без геометрии stand-off
    pub fallback_radius: f32,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            entry_subject: ActorKind::Player,
            cancel_subject: ActorKind::Player,
            channel_duration: 5.0,
            reward: 50,
            approach_speed: 3.0,
            align_duration: 0.3,
            ui_show_duration: 0.3,
            ui_rotation_speed: 2.0,
            shrink_duration: 0.5,
            shrink_scale: 0.1,
            fly_duration: 1.0,
            fly_height: 3.0,
            fly_end_offset: 1.5,
            fly_spin_degrees: [360.0, 720.0, 360.0],
            fly_shrink_fraction: 0.3,
            stand_off_factor: 0.5,
            clearance: 0.0,
            fallback_radius: 2.0,
        }
    }
}

/// Компаньон в free-roam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct FollowerConfig {
    pub follow_distance: f32,
    pub move_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub rotation_speed: f32,
}

impl Default for FollowerConfig {
    fn default() -> Self {
        Self {
            follow_distance: 3.0,
            move_speed: 3.0,
            acceleration: 5.0,
            deceleration: 8.0,
            rotation_speed: 5.0,
        }
    }
}

/// Player locomotion (joystick)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct LocomotionConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub rotation_speed: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 2.0,
            run_speed: 5.0,
            acceleration: 10.0,
            deceleration: 15.0,
            rotation_speed: 10.0,
        }
    }
}

/// Camera follow (SmoothDamp)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct CameraConfig {
    pub position_damping: f32,
    pub max_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position_damping: 0.1,
            max_speed: 10.0,
        }
    }
}
