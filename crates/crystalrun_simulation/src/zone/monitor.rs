//! Zone membership monitor (edge-triggered enter/exit).

use bevy::prelude::*;
use std::collections::BTreeSet;

use super::shape::{SubjectFilter, ZoneShape};
use crate::components::{ActorKind, ZoneSubject};

/// Зона, прикреплённая к entity
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(ZoneMonitor)]
pub struct Zone {
    pub shape: ZoneShape,
    pub filter: SubjectFilter,
}

/// Членство зоны с прошлого тика
///
/// Единственное скрытое состояние - множество "кто был внутри".
/// Никто кроме `update` его не трогает, каждый тик оно выводится из позиций.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ZoneMonitor {
    inside: BTreeSet<Entity>,
}

/// Изменения членства за один тик
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneDelta {
    pub entered: Vec<(Entity, ActorKind)>,
    pub exited: Vec<Entity>,
}

impl ZoneDelta {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

impl ZoneMonitor {
    /// Пересчитывает членство по позициям кандидатов
    ///
    /// Кандидат, которого нет в списке (despawned), считается вышедшим.
    pub fn update(
        &mut self,
        zone: &Zone,
        owner: &Transform,
        candidates: impl IntoIterator<Item = (Entity, ActorKind, Vec3)>,
    ) -> ZoneDelta {
        let mut now_inside = BTreeSet::new();
        let mut delta = ZoneDelta::default();

        for (entity, kind, position) in candidates {
            if !zone.filter.accepts(kind) || !zone.shape.contains(owner, position) {
                continue;
            }
            now_inside.insert(entity);
            if !self.inside.contains(&entity) {
                delta.entered.push((entity, kind));
            }
        }

        delta.exited = self.inside.difference(&now_inside).copied().collect();
        self.inside = now_inside;
        delta
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.inside.contains(&entity)
    }

    pub fn members(&self) -> impl Iterator<Item = Entity> + '_ {
        self.inside.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEdge {
    Entered,
    Exited,
}

/// Событие пересечения границы зоны
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneEvent {
    pub zone: Entity,
    pub subject: Entity,
    pub edge: ZoneEdge,
}

/// Система: пересчёт членства всех зон
///
/// Запускается первой в тике (OrchestrationSet::Zones), поэтому все FSM
/// видят один и тот же snapshot.
pub fn update_zone_membership(
    mut zones: Query<(Entity, &Zone, &Transform, &mut ZoneMonitor)>,
    subjects: Query<(Entity, &ZoneSubject, &Transform)>,
    mut zone_events: EventWriter<ZoneEvent>,
) {
    let candidates: Vec<(Entity, ActorKind, Vec3)> = subjects
        .iter()
        .map(|(entity, subject, transform)| (entity, subject.0, transform.translation))
        .collect();

    for (zone_entity, zone, transform, mut monitor) in zones.iter_mut() {
        // Зона не видит своего владельца
        let delta = monitor.update(
            zone,
            transform,
            candidates.iter().copied().filter(|(e, _, _)| *e != zone_entity),
        );

        for (subject, kind) in delta.entered {
            crate::log(&format!(
                "Zone {:?}: {} {:?} entered",
                zone_entity,
                kind.as_str(),
                subject
            ));
            zone_events.write(ZoneEvent {
                zone: zone_entity,
                subject,
                edge: ZoneEdge::Entered,
            });
        }

        for subject in delta.exited {
            crate::log(&format!("Zone {:?}: {:?} exited", zone_entity, subject));
            zone_events.write(ZoneEvent {
                zone: zone_entity,
                subject,
                edge: ZoneEdge::Exited,
            });
        }
    }
}
