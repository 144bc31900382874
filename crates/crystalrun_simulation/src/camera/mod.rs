//! Camera module
//!
//! Follow игрока (SmoothDamp по XZ), footstep shake, two-shot framing для атаки.

use bevy::prelude::*;
use rand::Rng;

pub mod framing;

pub use framing::{collider_height, frame_two_shot, smooth_damp, ShotFraming};

use crate::components::{CameraFollow, CameraShake, Viewpoint};
use crate::config::SimulationConfig;
use crate::tween::TweenScheduler;
use crate::{DeterministicRng, OrchestrationSet};

/// Система: камера следует за target (высота камеры фиксирована)
pub fn camera_follow(
    config: Res<SimulationConfig>,
    time: Res<Time<Fixed>>,
    targets: Query<&Transform, Without<CameraFollow>>,
    mut cameras: Query<(&mut CameraFollow, &mut Transform)>,
) {
    let delta = time.delta_secs();

    for (mut follow, mut transform) in cameras.iter_mut() {
        if !follow.enabled {
            continue;
        }

        let Ok(target) = targets.get(follow.target) else {
            crate::log(&format!("CameraFollow: target {:?} is gone", follow.target));
            continue;
        };

        let desired = Vec3::new(
            target.translation.x + follow.offset.x,
            transform.translation.y,
            target.translation.z + follow.offset.z,
        );

        let mut velocity = follow.velocity;
        transform.translation = smooth_damp(
            transform.translation,
            desired,
            &mut velocity,
            config.camera.position_damping,
            config.camera.max_speed,
            delta,
        );
        follow.velocity = velocity;
    }
}

/// Система: тряска камеры
///
/// Каждый тик снимает прошлый offset и кладёт новый случайный, затухающий
/// к концу. По окончании камера возвращается в исходную точку.
/// Пока камеру ведёт tween, он пишет абсолютную позицию: offset не снимается
/// и не кладётся, тряска только догорает.
pub fn camera_shake(
    time: Res<Time<Fixed>>,
    tweens: Res<TweenScheduler>,
    mut rng: ResMut<DeterministicRng>,
    mut cameras: Query<(Entity, &mut CameraShake, &mut Transform), With<Viewpoint>>,
) {
    let delta = time.delta_secs();

    for (camera, mut shake, mut transform) in cameras.iter_mut() {
        if tweens.is_targeting(camera) {
            shake.applied = Vec3::ZERO;
            shake.remaining = (shake.remaining - delta).max(0.0);
            continue;
        }

        transform.translation -= shake.applied;
        shake.applied = Vec3::ZERO;

        if !shake.is_active() {
            continue;
        }

        let falloff = if shake.duration > 0.0 {
            (shake.remaining / shake.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let offset = Vec3::new(
            rng.rng.gen_range(-1.0..=1.0),
            rng.rng.gen_range(-1.0..=1.0),
            rng.rng.gen_range(-1.0..=1.0),
        ) * shake.intensity
            * falloff;

        transform.translation += offset;
        shake.applied = offset;
        shake.remaining = (shake.remaining - delta).max(0.0);
    }
}

/// Активная камера с наименьшим entity index (детерминированно)
pub fn active_viewpoint(world: &mut World) -> Option<Entity> {
    let mut query = world.query::<(Entity, &Viewpoint)>();
    query
        .iter(world)
        .filter(|(_, viewpoint)| viewpoint.active)
        .map(|(entity, _)| entity)
        .min_by_key(|entity| entity.index())
}

/// Camera Plugin (OrchestrationSet::Locomotion, после интеграции velocity)
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (camera_follow, camera_shake)
                .chain()
                .in_set(OrchestrationSet::Locomotion)
                .after(crate::steering::integrate_velocity),
        );
    }
}
