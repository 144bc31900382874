//! Steering controller: stepped-lerp velocity blend + yaw-only rotation.
//!
//! Чистые функции, без ECS. Системы (locomotion, follower, agent, harvest)
//! вызывают их каждый FixedUpdate тик.

use bevy::prelude::*;

/// Порог "есть желаемая скорость" (accel vs decel)
pub const DESIRED_SPEED_EPSILON: f32 = 0.1;

/// Порог направления для поворота
pub const ROTATION_EPSILON: f32 = 0.01;

/// Asymmetric blend rates (1/s)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SteeringRates {
    pub acceleration: f32,
    pub deceleration: f32,
}

impl SteeringRates {
    pub fn new(acceleration: f32, deceleration: f32) -> Self {
        Self {
            acceleration,
            deceleration,
        }
    }
}

/// Steering state актёра
///
/// `current` / `target` - только planar (XZ). Вертикаль живёт в Velocity.linvel.y
/// и steering её не трогает.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SteeringState {
    pub current: Vec3,
    pub target: Vec3,
}

impl SteeringState {
    /// Один шаг: desired = normalize(direction) * speed, current → desired на rate*dt
    ///
    /// Rate = acceleration если |desired| > eps, иначе deceleration.
    /// При ненулевом desired результат не длиннее desired speed.
    pub fn update(&mut self, direction: Vec3, speed: f32, rates: SteeringRates, dt: f32) -> Vec3 {
        let desired = planar(direction).normalize_or_zero() * speed.max(0.0);
        let accelerating = desired.length() > DESIRED_SPEED_EPSILON;
        let rate = if accelerating {
            rates.acceleration
        } else {
            rates.deceleration
        };

        let t = (rate * dt).clamp(0.0, 1.0);
        let mut next = self.current.lerp(desired, t);
        if accelerating {
            next = next.clamp_length_max(desired.length());
        }

        self.target = desired;
        self.current = planar(next);
        self.current
    }

    /// Мгновенная остановка (attack / arrival)
    pub fn halt(&mut self) {
        self.current = Vec3::ZERO;
        self.target = Vec3::ZERO;
    }
}

/// Пишет planar скорость в linvel, сохраняя вертикальную компоненту
pub fn apply_planar(linvel: &mut Vec3, planar_velocity: Vec3) {
    linvel.x = planar_velocity.x;
    linvel.z = planar_velocity.z;
}

pub fn planar(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    planar(a - b).length()
}

/// Rotation, которая смотрит (-Z forward) вдоль direction
pub fn look_rotation(direction: Vec3) -> Quat {
    Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation
}

/// Yaw-only slerp к направлению движения
///
/// Если planar direction короче eps - rotation не меняется.
pub fn rotate_towards(rotation: Quat, direction: Vec3, rotation_speed: f32, dt: f32) -> Quat {
    let flat = planar(direction);
    if flat.length() <= ROTATION_EPSILON {
        return rotation;
    }
    let t = (rotation_speed * dt).clamp(0.0, 1.0);
    rotation.slerp(look_rotation(flat), t)
}
