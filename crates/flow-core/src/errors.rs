//! Errores del core.
//!
//! La taxonomía distingue en qué fase (y en qué hilo) ocurrió el fallo:
//! - `ValidationFailure`: fase 1 (`extract_input`), hilo transaccional.
//! - `ComputationFailure`: fase 2 (`compute`), hilo del pool; viaja dentro
//!   del `ResultHandle` y nunca se relanza de forma síncrona.
//! - `RejectedExecution`: el invoker no aceptó la computación; síncrono.
//! - `ApplyFailure`: fase 3 (`apply_output`), hilo transaccional, después de
//!   que la computación ya tuvo éxito.
//! - `Aborted`: un panic en el hilo transaccional (extract, apply o el propio
//!   driver) cortó la unidad; el runtime lo reporta como fallo de esa unidad.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error al extraer el input desde el contexto de ejecución.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("{0}")]
pub struct ValidationFailure(pub String);

impl ValidationFailure {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Error al volcar el output sobre el contexto de ejecución.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("{0}")]
pub struct ApplyFailure(pub String);

impl ApplyFailure {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Estado terminal fallido de un `ResultHandle`.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ComputationFailure {
    #[error("{0}")]
    Failed(String),
    #[error("computation panicked: {0}")]
    Panicked(String),
    #[error("computation timed out after {0:?}")]
    TimedOut(Duration),
    #[error("worker dropped the computation before resolving it")]
    Abandoned,
}

impl ComputationFailure {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// El invoker no puede aceptar más trabajo.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum RejectedExecution {
    #[error("task invoker saturated (capacity {capacity})")]
    Saturated { capacity: usize },
    #[error("task invoker is shut down")]
    ShutDown,
}

/// Acceso tipado a variables del contexto.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum VariableError {
    #[error("variable '{0}' not found")]
    Missing(String),
    #[error("variable '{name}' has unexpected type: {detail}")]
    Type { name: String, detail: String },
}

impl From<VariableError> for ValidationFailure {
    fn from(err: VariableError) -> Self {
        Self(err.to_string())
    }
}

impl From<VariableError> for ApplyFailure {
    fn from(err: VariableError) -> Self {
        Self(err.to_string())
    }
}

/// Clasificación estable de fallos que el runtime usa para decidir
/// reintentos o compensación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    Validation,
    Computation,
    RejectedExecution,
    Apply,
    Aborted,
}

/// Error completo de una unidad de trabajo, tal como lo ve el runtime.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DelegateError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),
    #[error("computation failed: {0}")]
    Computation(#[from] ComputationFailure),
    #[error("async execution rejected: {0}")]
    Rejected(#[from] RejectedExecution),
    #[error("applying output failed: {0}")]
    Apply(#[from] ApplyFailure),
    #[error("unit of work aborted: {0}")]
    Aborted(String),
}

impl DelegateError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation(_) => FailureKind::Validation,
            Self::Computation(_) => FailureKind::Computation,
            Self::Rejected(_) => FailureKind::RejectedExecution,
            Self::Apply(_) => FailureKind::Apply,
            Self::Aborted(_) => FailureKind::Aborted,
        }
    }

    /// Solo la computación corre fuera del hilo transaccional.
    pub fn is_off_thread(&self) -> bool {
        matches!(self, Self::Computation(_))
    }
}

/// Fallos del runtime de referencia (no del contrato del delegate).
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreEngineError {
    #[error("invalid delegate state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("internal: {0}")]
    Internal(String),
}
