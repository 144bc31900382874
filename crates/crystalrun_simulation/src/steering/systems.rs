//! Locomotion systems: player input, companion follower, velocity integration.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::controller::{apply_planar, planar, rotate_towards, SteeringRates, SteeringState, DESIRED_SPEED_EPSILON};
use crate::components::{Follower, FreeLocomotion, MovementInput, Player, SteeringAuthority};
use crate::config::SimulationConfig;

/// Система: player locomotion от MovementInput
///
/// Скорость = lerp(walk, run, magnitude). Пока FreeLocomotion выключен
/// (хореография атаки) система игрока не трогает.
pub fn player_locomotion(
    config: Res<SimulationConfig>,
    time: Res<Time<Fixed>>,
    mut players: Query<
        (&MovementInput, &FreeLocomotion, &mut SteeringState, &mut Velocity, &mut Transform),
        With<Player>,
    >,
) {
    let delta = time.delta_secs();
    let locomotion = &config.locomotion;
    let rates = SteeringRates::new(locomotion.acceleration, locomotion.deceleration);

    for (input, free, mut steering, mut velocity, mut transform) in players.iter_mut() {
        if !free.enabled {
            continue;
        }

        let magnitude = input.magnitude.clamp(0.0, 1.0);
        let speed = locomotion.walk_speed + (locomotion.run_speed - locomotion.walk_speed) * magnitude;

        let planar_velocity = steering.update(input.direction, speed, rates, delta);
        apply_planar(&mut velocity.linvel, planar_velocity);

        transform.rotation = rotate_towards(transform.rotation, input.direction, locomotion.rotation_speed, delta);
    }
}

/// Система: компаньон следует за leader (free-roam)
///
/// Пока компаньоном владеет EncounterSession (SteeringAuthority::Encounter)
/// или locomotion выключен - не вмешиваемся.
pub fn follow_leader(
    config: Res<SimulationConfig>,
    time: Res<Time<Fixed>>,
    leaders: Query<&Transform, Without<Follower>>,
    mut followers: Query<(
        &Follower,
        &FreeLocomotion,
        &SteeringAuthority,
        &mut SteeringState,
        &mut Velocity,
        &mut Transform,
    )>,
) {
    let delta = time.delta_secs();
    let follow = &config.follower;
    let rates = SteeringRates::new(follow.acceleration, follow.deceleration);

    for (follower, free, authority, mut steering, mut velocity, mut transform) in followers.iter_mut() {
        if !free.enabled || !authority.is_free() {
            continue;
        }

        let Ok(leader) = leaders.get(follower.leader) else {
            crate::log_error(&format!("Follower: leader {:?} not found", follower.leader));
            continue;
        };

        let to_leader = planar(leader.translation - transform.translation);
        let direction = if to_leader.length() > follow.follow_distance {
            to_leader
        } else {
            Vec3::ZERO
        };

        let planar_velocity = steering.update(direction, follow.move_speed, rates, delta);
        apply_planar(&mut velocity.linvel, planar_velocity);

        // Смотрим по направлению текущей скорости
        if planar_velocity.length() > DESIRED_SPEED_EPSILON {
            transform.rotation = rotate_towards(transform.rotation, planar_velocity, follow.rotation_speed, delta);
        }
    }
}

/// Система интеграции velocity → Transform
///
/// Rapier step в headless не запускается. KinematicPositionBased тела двигает
/// только хореография (tweens), их velocity игнорируется.
pub fn integrate_velocity(
    time: Res<Time<Fixed>>,
    mut bodies: Query<(&Velocity, &RigidBody, &mut Transform)>,
) {
    let delta = time.delta_secs();

    for (velocity, body, mut transform) in bodies.iter_mut() {
        match body {
            RigidBody::Dynamic | RigidBody::KinematicVelocityBased => {
                transform.translation += velocity.linvel * delta;
            }
            RigidBody::KinematicPositionBased | RigidBody::Fixed => {}
        }
    }
}
