//! View-side components: viewpoint, UI panels, scalar channels, effects.
//!
//! Рендер и UI chrome снаружи. Здесь только то, что пишет оркестрация.

use bevy::prelude::*;
use std::collections::BTreeMap;

/// Активная точка обзора (камера)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Viewpoint {
    pub active: bool,
    /// Вертикальный FOV (градусы)
    pub fov_degrees: f32,
    /// width / height
    pub aspect: f32,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            active: true,
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
        }
    }
}

/// Камера следует за target с фиксированным offset (smooth damp по XZ)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CameraFollow {
    pub target: Entity,
    pub offset: Vec3,
    pub enabled: bool,
    /// SmoothDamp state
    pub velocity: Vec3,
}

impl CameraFollow {
    pub fn new(target: Entity, offset: Vec3) -> Self {
        Self {
            target,
            offset,
            enabled: true,
            velocity: Vec3::ZERO,
        }
    }
}

/// Тряска камеры (footsteps)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct CameraShake {
    pub intensity: f32,
    pub duration: f32,
    pub remaining: f32,
    /// Offset, применённый в прошлом тике (снимается перед новым)
    pub applied: Vec3,
}

impl CameraShake {
    pub fn restart(&mut self, intensity: f32, duration: f32) {
        self.intensity = intensity;
        self.duration = duration;
        self.remaining = duration;
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }
}

/// UI-панель (progress, HUD, death panel). Show/hide chrome снаружи
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct UiPanel {
    pub visible: bool,
}

/// Именованные числовые каналы, которые умеет двигать tween scheduler
///
/// "fill" - radial progress, "size" - размер частиц, "balance" - счётчик денег.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ScalarChannels {
    values: BTreeMap<&'static str, f32>,
}

impl ScalarChannels {
    pub fn with(mut self, channel: &'static str, value: f32) -> Self {
        self.values.insert(channel, value);
        self
    }

    pub fn get(&self, channel: &str) -> Option<f32> {
        self.values.get(channel).copied()
    }

    pub fn set(&mut self, channel: &'static str, value: f32) {
        self.values.insert(channel, value);
    }
}

/// Hit effect, заспавненный в позиции игрока при ударе (визуал снаружи)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HitEffect {
    pub victim: Entity,
}
