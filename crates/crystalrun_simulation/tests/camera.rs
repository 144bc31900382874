//! Integration tests: камера (shake поверх tween)

use approx::assert_relative_eq;
use bevy::prelude::*;
use crystalrun_simulation::scene::spawn_viewpoint;
use crystalrun_simulation::tween::{Ease, Sequence, Tween};
use crystalrun_simulation::{create_headless_app, CameraShake, SimulationPlugin, TweenScheduler};

#[test]
fn test_shake_during_camera_move_lands_on_target() {
    let mut app = create_headless_app(5);
    app.add_plugins(SimulationPlugin::default());

    let camera = spawn_viewpoint(app.world_mut(), Vec3::new(0.0, 8.0, 10.0), None);
    app.update();

    app.world_mut().get_mut::<CameraShake>(camera).unwrap().restart(0.5, 1.0);
    app.update();
    app.update();

    let target = Vec3::new(4.0, 3.0, -2.0);
    app.world_mut()
        .resource_mut::<TweenScheduler>()
        .start(Sequence::single(Tween::move_to(camera, target, 0.5).ease(Ease::OutQuad)));

    for _ in 0..90 {
        app.update();
    }

    let shake = app.world().get::<CameraShake>(camera).unwrap();
    assert!(!shake.is_active());
    assert_eq!(shake.applied, Vec3::ZERO);

    let position = app.world().get::<Transform>(camera).unwrap().translation;
    assert_relative_eq!(position.x, target.x, epsilon = 1e-4);
    assert_relative_eq!(position.y, target.y, epsilon = 1e-4);
    assert_relative_eq!(position.z, target.z, epsilon = 1e-4);
}
