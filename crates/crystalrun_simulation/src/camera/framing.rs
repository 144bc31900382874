//! Camera math: two-shot framing, collider heights, SmoothDamp.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::steering::look_rotation;

/// Куда поставить камеру, чтобы в кадре были оба актёра
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotFraming {
    pub position: Vec3,
    pub rotation: Quat,
    pub distance: f32,
}

/// Two-shot framing (агент + игрок сбоку)
///
/// Камера сдвигается от midpoint по cross(up, agent - player) на дистанцию
/// max(нужная ширина, нужная высота (tallest * 1.5), 2 * separation).
/// Высота камеры: ground + 0.6h, смотрит на ground + 0.5h.
pub fn frame_two_shot(agent: Vec3, player: Vec3, max_height: f32, viewpoint: &crate::components::Viewpoint) -> ShotFraming {
    let midpoint = (agent + player) / 2.0;
    let side = Vec3::Y.cross((agent - player).normalize_or_zero());
    let separation = agent.distance(player);

    let vertical_fov = viewpoint.fov_degrees.to_radians();
    let total_width = separation * 2.0;

    let for_width = total_width / (2.0 * (vertical_fov * viewpoint.aspect / 2.0).tan());
    let for_height = (max_height * 1.5) / (2.0 * (vertical_fov / 2.0).tan());
    let distance = for_width.max(for_height).max(separation * 2.0);

    let ground = agent.y.min(player.y);
    let mut position = midpoint + side * distance;
    position.y = ground + max_height * 0.6;

    let mut look_at = midpoint;
    look_at.y = ground + max_height * 0.5;

    ShotFraming {
        position,
        rotation: look_rotation(look_at - position),
        distance,
    }
}

/// Полная высота коллайдера в мире (local AABB * scale.y)
pub fn collider_height(collider: &Collider, transform: &Transform) -> f32 {
    let extents = collider.raw.compute_local_aabb().extents();
    extents.y * transform.scale.y
}

/// Critically damped spring (как SmoothDamp)
///
/// `velocity` - состояние между вызовами. Скорость ограничена max_speed.
pub fn smooth_damp(current: Vec3, target: Vec3, velocity: &mut Vec3, smooth_time: f32, max_speed: f32, dt: f32) -> Vec3 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(0.0001);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let decay = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let change = (current - target).clamp_length_max(max_speed * smooth_time);
    let clamped_target = current - change;

    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * decay;
    let mut output = clamped_target + (change + temp) * decay;

    // Не перелетаем target
    if (target - current).dot(output - target) > 0.0 {
        output = target;
        *velocity = Vec3::ZERO;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Viewpoint;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_shot_distance_candidates() {
        let viewpoint = Viewpoint {
            active: true,
            fov_degrees: 60.0,
            aspect: 1.0,
        };
        let agent = Vec3::new(0.0, 0.0, 0.0);
        let player = Vec3::new(0.0, 0.0, 2.3);

        let shot = frame_two_shot(agent, player, 2.0, &viewpoint);

        // width: 4.6 / (2 tan 30°) ≈ 3.98; height: 3 / (2 tan 30°) ≈ 2.6; separation*2 = 4.6
        assert_relative_eq!(shot.distance, 4.6, epsilon = 1e-4);
        assert_relative_eq!(shot.position.y, 1.2, epsilon = 1e-5);
        // Камера сбоку: по X от midpoint
        assert_relative_eq!(shot.position.z, 1.15, epsilon = 1e-5);
        assert_relative_eq!(shot.position.x.abs(), 4.6, epsilon = 1e-4);
    }

    #[test]
    fn test_two_shot_looks_at_midpoint() {
        let viewpoint = Viewpoint::default();
        let agent = Vec3::new(4.0, 0.0, 0.0);
        let player = Vec3::new(0.0, 0.0, 0.0);

        let shot = frame_two_shot(agent, player, 2.0, &viewpoint);
        let forward = shot.rotation * Vec3::NEG_Z;
        let expected = (Vec3::new(2.0, 1.0, 0.0) - shot.position).normalize();

        assert_relative_eq!(forward.dot(expected), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_collider_height_scaled() {
        let collider = Collider::cuboid(0.5, 1.0, 0.5);
        let transform = Transform::from_scale(Vec3::new(1.0, 1.5, 1.0));
        assert_relative_eq!(collider_height(&collider, &transform), 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_smooth_damp_converges_without_overshoot() {
        let target = Vec3::new(10.0, 0.0, 0.0);
        let mut position = Vec3::ZERO;
        let mut velocity = Vec3::ZERO;

        for _ in 0..600 {
            position = smooth_damp(position, target, &mut velocity, 0.1, 10.0, 1.0 / 60.0);
            assert!(position.x <= target.x + 1e-4);
        }
        assert_relative_eq!(position.x, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_smooth_damp_respects_max_speed() {
        let mut velocity = Vec3::ZERO;
        let dt = 1.0 / 60.0;
        let next = smooth_damp(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), &mut velocity, 0.1, 10.0, dt);
        assert!(next.x <= 10.0 * dt * 2.0);
    }
}
