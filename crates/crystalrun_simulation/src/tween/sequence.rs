//! Sequence: append / join composition with per-step delay and one completion callback.

use bevy::prelude::*;

use super::primitives::{Tween, TweenValue};

/// Completion callback, вызывается ровно один раз после последнего шага
pub type SequenceCallback = Box<dyn FnOnce(&mut World) + Send + Sync>;

pub(crate) struct SequenceStep {
    pub tween: Tween,
    /// Время старта внутри sequence (уже с delay)
    pub start: f32,
    /// Захваченное стартовое значение
    pub from: Option<TweenValue>,
    pub finished: bool,
}

/// Timeline из tween-ов
///
/// - `append` - после окончания всего предыдущего
/// - `join` - одновременно с последним append-нутым шагом
/// - `delay` у tween сдвигает его старт относительно этой точки
pub struct Sequence {
    pub(crate) steps: Vec<SequenceStep>,
    /// Конец timeline (куда встанет следующий append)
    cursor_end: f32,
    /// Старт последнего append (якорь для join)
    last_append_start: f32,
    pub(crate) on_complete: Option<SequenceCallback>,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
            .field("steps", &self.steps.len())
            .field("duration", &self.cursor_end)
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

impl Sequence {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            cursor_end: 0.0,
            last_append_start: 0.0,
            on_complete: None,
        }
    }

    /// Sequence из одного tween
    pub fn single(tween: Tween) -> Self {
        Self::new().append(tween)
    }

    pub fn append(mut self, tween: Tween) -> Self {
        let anchor = self.cursor_end;
        self.last_append_start = anchor;
        self.push(anchor, tween);
        self
    }

    pub fn join(mut self, tween: Tween) -> Self {
        let anchor = self.last_append_start;
        self.push(anchor, tween);
        self
    }

    /// Пауза в конце timeline
    pub fn append_interval(mut self, seconds: f32) -> Self {
        self.last_append_start = self.cursor_end;
        self.cursor_end += seconds.max(0.0);
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce(&mut World) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn duration(&self) -> f32 {
        self.cursor_end
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Старт шага по индексу (для проверки timeline)
    pub fn step_start(&self, index: usize) -> Option<f32> {
        self.steps.get(index).map(|step| step.start)
    }

    fn push(&mut self, anchor: f32, tween: Tween) {
        let start = anchor + tween.delay;
        self.cursor_end = self.cursor_end.max(start + tween.duration);
        self.steps.push(SequenceStep {
            tween,
            start,
            from: None,
            finished: false,
        });
    }
}
