//! Spatial zone monitor
//!
//! Зона = форма (sphere / box / capsule) + фильтр subject-ов, прикреплённая к entity.
//! Enter/exit события edge-triggered: одно событие на одно пересечение границы.

use bevy::prelude::*;

pub mod monitor;
pub mod shape;


pub use monitor::{update_zone_membership, Zone, ZoneDelta, ZoneEdge, ZoneEvent, ZoneMonitor};
pub use shape::{SubjectFilter, ZoneShape};

use crate::OrchestrationSet;

/// Zone Plugin
///
/// Регистрирует ZoneEvent и пересчёт членства в начале FixedUpdate тика.
pub struct ZonePlugin;

impl Plugin for ZonePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ZoneEvent>().add_systems(
            FixedUpdate,
            update_zone_membership.in_set(OrchestrationSet::Zones),
        );
    }
}
