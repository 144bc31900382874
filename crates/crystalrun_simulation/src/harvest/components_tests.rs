//! Tests for stand-off geometry and session bookkeeping.

#[cfg(test)]
mod tests {
    use super::super::components::{
        stand_off_distance, EncounterPhase, EncounterSession, HarvestEncounter, PayoffStage,
    };
    use crate::config::HarvestConfig;
    use crate::error::OrchestrationError;
    use crate::zone::ZoneShape;
    use approx::assert_relative_eq;
    use bevy::prelude::*;

    #[test]
    fn test_stand_off_from_sphere_with_clearance() {
        let config = HarvestConfig {
            clearance: 0.5,
            ..Default::default()
        };
        let (stand_off, fallback) = stand_off_distance(&ZoneShape::sphere(4.0), &Transform::IDENTITY, &config);

        assert_relative_eq!(stand_off, 1.5);
        assert!(fallback.is_none());
    }

    #[test]
    fn test_stand_off_from_scaled_box_uses_larger_horizontal_extent() {
        let config = HarvestConfig::default();
        let owner = Transform::from_scale(Vec3::splat(2.0));
        let shape = ZoneShape::cuboid(Vec3::new(1.0, 10.0, 3.0));
        let (stand_off, _) = stand_off_distance(&shape, &owner, &config);

        // max(1, 3) * 2 * 0.5
        assert_relative_eq!(stand_off, 3.0);
    }

    #[test]
    fn test_stand_off_falls_back_for_capsule() {
        let config = HarvestConfig::default();
        let shape = ZoneShape::Capsule {
            center: Vec3::ZERO,
            radius: 1.0,
            half_height: 2.0,
        };
        let (stand_off, fallback) = stand_off_distance(&shape, &Transform::IDENTITY, &config);

        assert_relative_eq!(stand_off, config.fallback_radius * config.stand_off_factor);
        assert!(matches!(fallback, Some(OrchestrationError::GeometryFallback { .. })));
    }

    #[test]
    fn test_stand_off_never_negative() {
        let config = HarvestConfig {
            clearance: 10.0,
            ..Default::default()
        };
        let (stand_off, _) = stand_off_distance(&ZoneShape::sphere(1.0), &Transform::IDENTITY, &config);
        assert_eq!(stand_off, 0.0);
    }

    #[test]
    fn test_resolving_is_not_cancellable() {
        assert!(EncounterPhase::Approaching.is_cancellable());
        assert!(EncounterPhase::Aligning.is_cancellable());
        assert!(EncounterPhase::Channeling.is_cancellable());
        assert!(EncounterPhase::Stalled.is_cancellable());
        assert!(!EncounterPhase::Resolving(PayoffStage::Shrinking).is_cancellable());
        assert!(!EncounterPhase::Resolving(PayoffStage::Flying).is_cancellable());
    }

    #[test]
    fn test_session_ids_are_unique_and_stale_ids_miss() {
        let mut encounter = HarvestEncounter::new(HarvestConfig::default(), None);
        let resource = Entity::from_raw(7);

        let first = encounter.allocate_session_id();
        encounter.session = Some(EncounterSession::new(first, resource, 1.0));
        let second = encounter.allocate_session_id();
        assert_ne!(first, second);

        assert!(encounter.session_mut(first).is_some());
        assert!(encounter.session_mut(second).is_none());
        assert!(!encounter.is_idle());
    }
}
