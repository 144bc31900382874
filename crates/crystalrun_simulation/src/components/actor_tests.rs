//! Tests for actor/view components.

#[cfg(test)]
mod tests {
    use super::super::actor::{AnimatorParams, FreeLocomotion, SteeringAuthority};
    use super::super::view::{CameraShake, ScalarChannels};
    use bevy::prelude::Entity;

    #[test]
    fn test_free_locomotion_enabled_by_default() {
        assert!(FreeLocomotion::default().enabled);
    }

    #[test]
    fn test_steering_authority_default_is_free_roam() {
        assert!(SteeringAuthority::default().is_free());
        let owned = SteeringAuthority::Encounter {
            controller: Entity::from_raw(7),
        };
        assert!(!owned.is_free());
    }

    #[test]
    fn test_animator_flags_and_triggers() {
        let mut params = AnimatorParams::default();
        assert!(!params.get_bool("Run"));

        params.set_bool("Run", true);
        assert!(params.get_bool("Run"));

        params.set_trigger("Scared");
        assert!(params.has_trigger("Scared"));
        assert_eq!(params.take_triggers(), vec!["Scared".to_string()]);
        assert!(!params.has_trigger("Scared"));
    }

    #[test]
    fn test_scalar_channels() {
        let mut channels = ScalarChannels::default().with("fill", 0.0);
        assert_eq!(channels.get("fill"), Some(0.0));
        assert_eq!(channels.get("size"), None);

        channels.set("fill", 0.5);
        assert_eq!(channels.get("fill"), Some(0.5));
    }

    #[test]
    fn test_camera_shake_restart() {
        let mut shake = CameraShake::default();
        assert!(!shake.is_active());

        shake.restart(0.1, 0.1);
        assert!(shake.is_active());
        assert_eq!(shake.remaining, 0.1);
    }
}
