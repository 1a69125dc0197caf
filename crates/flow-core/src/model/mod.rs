//! Modelos neutrales: contexto de ejecución y snapshot de variables.

pub mod context;
pub mod snapshot;

pub use context::ExecutionContext;
pub use snapshot::{VariableMap, VariableSnapshot};
