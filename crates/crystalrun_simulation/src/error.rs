//! Ошибки оркестрации
//!
//! Ничего здесь не фатально: любая ошибка = "пропускаем шаг, держим прежнее состояние".
//! Политика degrade-gracefully собрана в `report()` / `OrReport`, а не размазана по системам.

use thiserror::Error;

use crate::logger;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestrationError {
    /// Ссылка на коллаборатора не задана или entity уже despawned
    #[error("missing collaborator `{what}` in step `{step}`")]
    MissingCollaborator {
        what: &'static str,
        step: &'static str,
    },

    /// Форма зоны без stand-off геометрии - берём hard-coded радиус
    #[error("zone shape `{shape}` has no stand-off geometry, using default radius {fallback}")]
    GeometryFallback { shape: &'static str, fallback: f32 },

    /// Событие пришло в состояние, которое его не ждёт
    #[error("event `{event}` ignored in state `{state}`")]
    InvalidTransition {
        event: &'static str,
        state: &'static str,
    },
}

impl OrchestrationError {
    pub fn missing(what: &'static str, step: &'static str) -> Self {
        Self::MissingCollaborator { what, step }
    }

    pub fn invalid(event: &'static str, state: &'static str) -> Self {
        Self::InvalidTransition { event, state }
    }

    pub fn level(&self) -> logger::LogLevel {
        match self {
            Self::MissingCollaborator { .. } => logger::LogLevel::Error,
            Self::GeometryFallback { .. } => logger::LogLevel::Warning,
            // Игнорируется молча, в лог только на debug
            Self::InvalidTransition { .. } => logger::LogLevel::Debug,
        }
    }

    pub fn report(&self) {
        logger::log_with_level(self.level(), &self.to_string());
    }
}

/// Превращает Option в Result с MissingCollaborator
pub fn require<T>(value: Option<T>, what: &'static str, step: &'static str) -> Result<T, OrchestrationError> {
    value.ok_or(OrchestrationError::MissingCollaborator { what, step })
}

/// `.or_report()` - логируем ошибку и отдаём `None` (шаг пропускается)
pub trait OrReport<T> {
    fn or_report(self) -> Option<T>;
}

impl<T> OrReport<T> for Result<T, OrchestrationError> {
    fn or_report(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                err.report();
                None
            }
        }
    }
}
