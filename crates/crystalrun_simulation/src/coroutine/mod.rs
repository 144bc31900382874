//! Cooperative timer / coroutine driver
//!
//! Single-threaded, frame-stepped. Процедура = явный state enum + `resume` раз в тик:
//! - `Yield` - продолжить на следующем тике
//! - `Done` - удалить
//!
//! Отмена = drop процедуры в текущей точке приостановки: после `cancel`
//! ни одна строчка её кода больше не выполнится.

use bevy::prelude::*;
use std::collections::BTreeMap;

pub mod wait;


pub use wait::WaitSeconds;

use crate::OrchestrationSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureStep {
    Yield,
    Done,
}

/// Приостанавливаемая процедура над контекстом C
pub trait Procedure<C: ?Sized>: Send + Sync + 'static {
    /// Имя для логов
    fn label(&self) -> &'static str;

    /// Выполнить до следующей точки приостановки
    fn resume(&mut self, ctx: &mut C, dt: f32) -> ProcedureStep;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub struct ProcedureHandle(u64);

struct Slot<C: ?Sized> {
    procedure: Box<dyn Procedure<C>>,
    cancellable: bool,
}

/// Driver процедур
///
/// Порядок resume = порядок запуска. Внутри одного тика каждая процедура
/// доходит до своей следующей приостановки, без чередования.
pub struct CoroutineDriver<C: ?Sized> {
    next_id: u64,
    running: BTreeMap<ProcedureHandle, Slot<C>>,
}

impl<C: ?Sized> Default for CoroutineDriver<C> {
    fn default() -> Self {
        Self {
            next_id: 0,
            running: BTreeMap::new(),
        }
    }
}

impl<C: ?Sized + 'static> CoroutineDriver<C> {
    pub fn start(&mut self, procedure: impl Procedure<C>) -> ProcedureHandle {
        self.insert(Box::new(procedure), true)
    }

    /// Point of no return: `cancel` такую процедуру не останавливает
    pub fn start_uncancellable(&mut self, procedure: impl Procedure<C>) -> ProcedureHandle {
        self.insert(Box::new(procedure), false)
    }

    /// Отмена. Идемпотентна; `false` если уже нет или процедура неотменяемая
    pub fn cancel(&mut self, handle: ProcedureHandle) -> bool {
        match self.running.get(&handle) {
            Some(slot) if slot.cancellable => {
                let label = slot.procedure.label();
                self.running.remove(&handle);
                crate::log(&format!("Coroutine: cancelled {} ({:?})", label, handle));
                true
            }
            Some(slot) => {
                crate::log(&format!(
                    "Coroutine: {} ({:?}) is uncancellable, cancel ignored",
                    slot.procedure.label(),
                    handle
                ));
                false
            }
            None => false,
        }
    }

    pub fn is_running(&self, handle: ProcedureHandle) -> bool {
        self.running.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Один тик: resume каждой живой процедуры
    pub fn tick(&mut self, ctx: &mut C, dt: f32) {
        let handles: Vec<ProcedureHandle> = self.running.keys().copied().collect();

        for handle in handles {
            let Some(slot) = self.running.get_mut(&handle) else {
                continue;
            };

            if slot.procedure.resume(ctx, dt) == ProcedureStep::Done {
                let label = slot.procedure.label();
                self.running.remove(&handle);
                crate::log(&format!("Coroutine: {} ({:?}) finished", label, handle));
            }
        }
    }

    fn insert(&mut self, procedure: Box<dyn Procedure<C>>, cancellable: bool) -> ProcedureHandle {
        let handle = ProcedureHandle(self.next_id);
        self.next_id += 1;
        crate::log(&format!("Coroutine: started {} ({:?})", procedure.label(), handle));
        self.running.insert(
            handle,
            Slot {
                procedure,
                cancellable,
            },
        );
        handle
    }
}

/// Resource: процедуры над World
///
/// Процедуры резюмятся из exclusive системы, пока resource вынут из World
/// (resource_scope) - поэтому сами процедуры Coroutines трогать не могут.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct Coroutines(pub CoroutineDriver<World>);

/// Система: resume всех процедур (OrchestrationSet::Procedures)
pub fn run_procedures(world: &mut World) {
    let delta = world.resource::<Time<Fixed>>().delta_secs();
    world.resource_scope(|world, mut coroutines: Mut<Coroutines>| {
        coroutines.tick(world, delta);
    });
}

/// Coroutine Plugin
pub struct CoroutinePlugin;

impl Plugin for CoroutinePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Coroutines>()
            .add_systems(FixedUpdate, run_procedures.in_set(OrchestrationSet::Procedures));
    }
}
