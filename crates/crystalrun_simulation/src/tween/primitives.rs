//! Tween primitives: target property, value, curve.

use bevy::prelude::*;

use super::ease::Ease;

/// Какое свойство двигает tween
///
/// Transform-каналы + произвольный числовой канал (`ScalarChannels`):
/// размер частиц, radial fill, счётчик баланса.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenTarget {
    Translation(Entity),
    Rotation(Entity),
    Scale(Entity),
    Scalar(Entity, &'static str),
}

impl TweenTarget {
    pub fn entity(&self) -> Entity {
        match *self {
            TweenTarget::Translation(e) | TweenTarget::Rotation(e) | TweenTarget::Scale(e) => e,
            TweenTarget::Scalar(e, _) => e,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenValue {
    Scalar(f32),
    Vec3(Vec3),
    Quat(Quat),
}

impl TweenValue {
    /// Интерполяция; при несовпадении типов остаёмся на `self`
    pub fn lerp(self, to: TweenValue, t: f32) -> TweenValue {
        match (self, to) {
            (TweenValue::Scalar(a), TweenValue::Scalar(b)) => TweenValue::Scalar(a + (b - a) * t),
            (TweenValue::Vec3(a), TweenValue::Vec3(b)) => TweenValue::Vec3(a.lerp(b, t)),
            // Back-ease выходит за [0, 1], slerp это переносит
            (TweenValue::Quat(a), TweenValue::Quat(b)) => TweenValue::Quat(a.slerp(b, t)),
            (from, _) => from,
        }
    }
}

/// Что происходит со значением за время tween
#[derive(Debug, Clone, PartialEq)]
pub enum TweenCurve {
    /// От значения на момент старта шага до `to`
    To(TweenValue),
    FromTo(TweenValue, TweenValue),
    /// Catmull-Rom через точки (translation)
    Path(Vec<Vec3>),
    /// Поворот на euler градусы (x, y, z) относительно стартовой rotation,
    /// больше 360° допустимо
    SpinBy(Vec3),
}

impl TweenCurve {
    /// Значение в момент eased t; `start` - захваченное стартовое значение
    pub fn sample(&self, start: TweenValue, t: f32) -> TweenValue {
        match self {
            TweenCurve::To(to) => start.lerp(*to, t),
            TweenCurve::FromTo(from, to) => from.lerp(*to, t),
            TweenCurve::Path(points) => TweenValue::Vec3(catmull_rom_path(points, t)),
            TweenCurve::SpinBy(degrees) => {
                let TweenValue::Quat(base) = start else {
                    return start;
                };
                let spin = Quat::from_euler(
                    EulerRot::YXZ,
                    (degrees.y * t).to_radians(),
                    (degrees.x * t).to_radians(),
                    (degrees.z * t).to_radians(),
                );
                TweenValue::Quat(base * spin)
            }
        }
    }
}

/// Позиция на Catmull-Rom сплайне через все точки (равные доли времени на сегмент)
pub fn catmull_rom_path(points: &[Vec3], t: f32) -> Vec3 {
    match points.len() {
        0 => Vec3::ZERO,
        1 => points[0],
        n => {
            let segments = (n - 1) as f32;
            let scaled = (t * segments).clamp(0.0, segments);
            let index = (scaled.floor() as usize).min(n - 2);
            let local = scaled - index as f32;

            let p1 = points[index];
            let p2 = points[index + 1];
            let p0 = if index == 0 { p1 } else { points[index - 1] };
            let p3 = if index + 2 < n { points[index + 2] } else { p2 };

            let t2 = local * local;
            let t3 = t2 * local;
            0.5 * ((2.0 * p1)
                + (p2 - p0) * local
                + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
        }
    }
}

/// Одна интерполяция
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub target: TweenTarget,
    pub curve: TweenCurve,
    pub duration: f32,
    pub ease: Ease,
    /// Задержка перед стартом (относительно места в sequence)
    pub delay: f32,
}

impl Tween {
    pub fn new(target: TweenTarget, curve: TweenCurve, duration: f32) -> Self {
        Self {
            target,
            curve,
            duration: duration.max(0.0),
            ease: Ease::default(),
            delay: 0.0,
        }
    }

    pub fn move_to(entity: Entity, to: Vec3, duration: f32) -> Self {
        Self::new(TweenTarget::Translation(entity), TweenCurve::To(TweenValue::Vec3(to)), duration)
    }

    pub fn rotate_to(entity: Entity, to: Quat, duration: f32) -> Self {
        Self::new(TweenTarget::Rotation(entity), TweenCurve::To(TweenValue::Quat(to)), duration)
    }

    pub fn scale_to(entity: Entity, to: Vec3, duration: f32) -> Self {
        Self::new(TweenTarget::Scale(entity), TweenCurve::To(TweenValue::Vec3(to)), duration)
    }

    pub fn scalar_to(entity: Entity, channel: &'static str, to: f32, duration: f32) -> Self {
        Self::new(
            TweenTarget::Scalar(entity, channel),
            TweenCurve::To(TweenValue::Scalar(to)),
            duration,
        )
    }

    pub fn path(entity: Entity, points: Vec<Vec3>, duration: f32) -> Self {
        Self::new(TweenTarget::Translation(entity), TweenCurve::Path(points), duration)
    }

    pub fn spin(entity: Entity, degrees: Vec3, duration: f32) -> Self {
        Self::new(TweenTarget::Rotation(entity), TweenCurve::SpinBy(degrees), duration)
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn delay(mut self, seconds: f32) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    /// Явное стартовое значение (иначе захватывается на старте шага)
    pub fn from(mut self, from: TweenValue) -> Self {
        if let TweenCurve::To(to) = self.curve {
            self.curve = TweenCurve::FromTo(from, to);
        }
        self
    }
}
