//! Tween scheduler: advances running sequences, kill без callback.

use bevy::prelude::*;
use std::collections::BTreeMap;

use super::primitives::{TweenTarget, TweenValue};
use super::sequence::{Sequence, SequenceCallback};
use crate::components::ScalarChannels;

/// Handle запущенной sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct SequenceHandle(u64);

/// Доступ scheduler-а к свойствам
///
/// `None` из read / `false` из write = target пропал, шаг завершается без записи.
pub trait TweenBackend {
    fn read(&self, target: TweenTarget) -> Option<TweenValue>;
    fn write(&mut self, target: TweenTarget, value: TweenValue) -> bool;
}

struct RunningSequence {
    sequence: Sequence,
    elapsed: f32,
}

impl RunningSequence {
    fn touches(&self, entity: Entity) -> bool {
        self.sequence.steps.iter().any(|step| step.tween.target.entity() == entity)
    }
}

/// Resource: все активные sequences
///
/// Продвигаются в порядке запуска (BTreeMap по handle) - детерминированно.
#[derive(Resource, Default)]
pub struct TweenScheduler {
    next_id: u64,
    running: BTreeMap<SequenceHandle, RunningSequence>,
}

/// Завершившаяся sequence + её callback
pub struct Completed {
    pub handle: SequenceHandle,
    pub callback: Option<SequenceCallback>,
}

impl TweenScheduler {
    pub fn start(&mut self, sequence: Sequence) -> SequenceHandle {
        let handle = SequenceHandle(self.next_id);
        self.next_id += 1;
        self.running.insert(
            handle,
            RunningSequence {
                sequence,
                elapsed: 0.0,
            },
        );
        handle
    }

    /// Остановить sequence. Идемпотентно, callback не вызывается никогда,
    /// последнее записанное значение остаётся как есть.
    pub fn kill(&mut self, handle: SequenceHandle) -> bool {
        self.running.remove(&handle).is_some()
    }

    /// Kill всех sequences, которые трогают entity
    pub fn kill_targeting(&mut self, entity: Entity) -> usize {
        let before = self.running.len();
        self.running.retain(|_, running| !running.touches(entity));
        before - self.running.len()
    }

    /// Есть ли живая sequence, которая пишет в entity
    pub fn is_targeting(&self, entity: Entity) -> bool {
        self.running.values().any(|running| running.touches(entity))
    }

    pub fn is_active(&self, handle: SequenceHandle) -> bool {
        self.running.contains_key(&handle)
    }

    pub fn active_count(&self) -> usize {
        self.running.len()
    }

    /// Продвигает все sequences на dt и возвращает завершившиеся
    ///
    /// Callbacks НЕ вызываются здесь: вызывающий запускает их после,
    /// когда у него снова есть `&mut World`.
    pub fn advance(&mut self, dt: f32, backend: &mut impl TweenBackend) -> Vec<Completed> {
        let mut done = Vec::new();

        for (handle, running) in self.running.iter_mut() {
            running.elapsed += dt;
            let elapsed = running.elapsed;

            for step in running.sequence.steps.iter_mut() {
                if step.finished || elapsed < step.start {
                    continue;
                }

                let start_value = match step.from {
                    Some(value) => value,
                    None => match backend.read(step.tween.target) {
                        Some(value) => {
                            step.from = Some(value);
                            value
                        }
                        None => {
                            step.finished = true;
                            continue;
                        }
                    },
                };

                let progress = if step.tween.duration > 0.0 {
                    ((elapsed - step.start) / step.tween.duration).clamp(0.0, 1.0)
                } else {
                    1.0
                };

                let value = step.tween.curve.sample(start_value, step.tween.ease.apply(progress));
                if !backend.write(step.tween.target, value) || progress >= 1.0 {
                    step.finished = true;
                }
            }

            let all_finished = running.sequence.steps.iter().all(|step| step.finished);
            if elapsed >= running.sequence.duration() && all_finished {
                done.push(*handle);
            }
        }

        done.into_iter()
            .filter_map(|handle| {
                self.running.remove(&handle).map(|mut running| Completed {
                    handle,
                    callback: running.sequence.on_complete.take(),
                })
            })
            .collect()
    }
}

/// Backend поверх World: Transform + ScalarChannels
pub struct WorldBackend<'w> {
    pub world: &'w mut World,
}

impl TweenBackend for WorldBackend<'_> {
    fn read(&self, target: TweenTarget) -> Option<TweenValue> {
        match target {
            TweenTarget::Translation(e) => self.world.get::<Transform>(e).map(|t| TweenValue::Vec3(t.translation)),
            TweenTarget::Rotation(e) => self.world.get::<Transform>(e).map(|t| TweenValue::Quat(t.rotation)),
            TweenTarget::Scale(e) => self.world.get::<Transform>(e).map(|t| TweenValue::Vec3(t.scale)),
            TweenTarget::Scalar(e, channel) => self
                .world
                .get::<ScalarChannels>(e)
                .and_then(|channels| channels.get(channel))
                .map(TweenValue::Scalar),
        }
    }

    fn write(&mut self, target: TweenTarget, value: TweenValue) -> bool {
        match (target, value) {
            (TweenTarget::Translation(e), TweenValue::Vec3(v)) => self
                .world
                .get_mut::<Transform>(e)
                .map(|mut t| t.translation = v)
                .is_some(),
            (TweenTarget::Rotation(e), TweenValue::Quat(q)) => self
                .world
                .get_mut::<Transform>(e)
                .map(|mut t| t.rotation = q)
                .is_some(),
            (TweenTarget::Scale(e), TweenValue::Vec3(v)) => self
                .world
                .get_mut::<Transform>(e)
                .map(|mut t| t.scale = v)
                .is_some(),
            (TweenTarget::Scalar(e, channel), TweenValue::Scalar(s)) => self
                .world
                .get_mut::<ScalarChannels>(e)
                .map(|mut channels| channels.set(channel, s))
                .is_some(),
            _ => false,
        }
    }
}

/// Система: продвинуть все tweens, затем вызвать callbacks завершившихся
///
/// Exclusive: callbacks получают `&mut World` (send_event, get_mut).
pub fn run_tweens(world: &mut World) {
    let delta = world.resource::<Time<Fixed>>().delta_secs();

    let completed = world.resource_scope(|world, mut scheduler: Mut<TweenScheduler>| {
        let mut backend = WorldBackend { world };
        scheduler.advance(delta, &mut backend)
    });

    for Completed { handle, callback } in completed {
        crate::log(&format!("Tween: sequence {:?} completed", handle));
        if let Some(callback) = callback {
            callback(world);
        }
    }
}
