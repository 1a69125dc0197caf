//! Tipos de evento de una unidad de trabajo y estructura `ExecutionEvent`.
//!
//! El runtime emite un evento por cada frontera de fase. La secuencia de un
//! `execution_id` permite auditar en qué fase (y en qué hilo) terminó cada
//! unidad sin depender del estado mutable del runtime.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::FailureKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionEventKind {
    /// Primer evento de un `execution_id`. `attempt` empieza en 1.
    ExecutionStarted { delegate: String, activity_id: String, attempt: u32 },
    /// El input se extrajo y el invoker aceptó la computación.
    ComputationSubmitted { task_id: u64 },
    /// `on_result` terminó sin error. Terminal.
    OutputApplied,
    /// Fallo clasificado por fase. Terminal salvo que le siga `RetryScheduled`.
    ExecutionFailed { kind: FailureKind, message: String },
    /// La política de fallos pidió otro intento.
    RetryScheduled { attempt: u32, delay_ms: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionEvent {
    pub seq: u64, // asignado por EventStore in-memory (orden append)
    pub execution_id: Uuid,
    pub kind: ExecutionEventKind,
    pub ts: DateTime<Utc>,
}
