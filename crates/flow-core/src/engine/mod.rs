//! Runtime de referencia para delegates futuros.
//!
//! Provee el driver que ejecuta unidades de trabajo sobre un único hilo
//! transaccional y la costura de políticas de fallo.

pub mod policy;
pub mod runtime;

pub use policy::{FailureDecision, FailurePolicy, NoRetryPolicy};
pub use runtime::{DelegateRuntime, UnitOutcome};

pub use crate::event::{EventStore, ExecutionEvent, ExecutionEventKind, InMemoryEventStore};
