//! Zone shapes + containment (entity-relative, oriented by owner Transform).

use bevy::prelude::*;

use crate::components::ActorKind;
use crate::error::OrchestrationError;

/// Форма зоны в локальных координатах владельца
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ZoneShape {
    Sphere { center: Vec3, radius: f32 },
    Box { center: Vec3, half_extents: Vec3 },
    /// Вертикальная капсула. Containment есть, stand-off геометрии нет
    Capsule {
        center: Vec3,
        radius: f32,
        half_height: f32,
    },
}

impl ZoneShape {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere {
            center: Vec3::ZERO,
            radius,
        }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box {
            center: Vec3::ZERO,
            half_extents,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZoneShape::Sphere { .. } => "sphere",
            ZoneShape::Box { .. } => "box",
            ZoneShape::Capsule { .. } => "capsule",
        }
    }

    /// Containment test: point в мировых координатах
    ///
    /// Point переводится в локальное пространство владельца (rotation + scale),
    /// поэтому box - это oriented box.
    pub fn contains(&self, owner: &Transform, point: Vec3) -> bool {
        let local = owner.compute_affine().inverse().transform_point3(point);

        match *self {
            ZoneShape::Sphere { center, radius } => local.distance_squared(center) <= radius * radius,
            ZoneShape::Box { center, half_extents } => {
                let d = (local - center).abs();
                d.x <= half_extents.x && d.y <= half_extents.y && d.z <= half_extents.z
            }
            ZoneShape::Capsule {
                center,
                radius,
                half_height,
            } => {
                let rel = local - center;
                let clamped_y = rel.y.clamp(-half_height, half_height);
                rel.distance_squared(Vec3::new(0.0, clamped_y, 0.0)) <= radius * radius
            }
        }
    }

    /// Эффективный горизонтальный радиус для stand-off
    ///
    /// Sphere: radius * scale.x. Box: max(half_x, half_z) * scale.x.
    /// Остальное → fallback + GeometryFallback.
    pub fn effective_radius(&self, owner: &Transform, fallback: f32) -> Result<f32, (f32, OrchestrationError)> {
        let scale = owner.scale.x;
        match *self {
            ZoneShape::Sphere { radius, .. } => Ok(radius * scale),
            ZoneShape::Box { half_extents, .. } => Ok(half_extents.x.max(half_extents.z) * scale),
            ZoneShape::Capsule { .. } => Err((
                fallback,
                OrchestrationError::GeometryFallback {
                    shape: self.name(),
                    fallback,
                },
            )),
        }
    }
}

/// На какие виды актёров реагирует зона
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub struct SubjectFilter {
    mask: u8,
}

impl SubjectFilter {
    pub fn only(kind: ActorKind) -> Self {
        Self::default().with(kind)
    }

    pub fn with(mut self, kind: ActorKind) -> Self {
        self.mask |= Self::bit(kind);
        self
    }

    pub fn accepts(&self, kind: ActorKind) -> bool {
        self.mask & Self::bit(kind) != 0
    }

    fn bit(kind: ActorKind) -> u8 {
        match kind {
            ActorKind::Player => 1,
            ActorKind::Companion => 1 << 1,
            ActorKind::Agent => 1 << 2,
        }
    }
}
