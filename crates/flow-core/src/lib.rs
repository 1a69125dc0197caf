//! flow-core: contrato de ejecución asíncrona de delegates.
//!
//! Un delegate que corre dentro de una ejecución transaccional descarga el
//! trabajo caro en un pool sin que el worker toque nunca el contexto:
//! extraer input (síncrono) -> computar output (asíncrono) -> aplicar output
//! (síncrono).
pub mod delegate;
pub mod engine;
pub mod errors;
pub mod event;
pub mod invoker;
pub mod model;

pub use delegate::{DelegateState, FutureDelegate, MapBasedFutureDelegate, MappedFutureDelegate};
pub use engine::{DelegateRuntime, FailureDecision, FailurePolicy, NoRetryPolicy, UnitOutcome};
pub use errors::{ApplyFailure, ComputationFailure, CoreEngineError, DelegateError, FailureKind, RejectedExecution,
                 ValidationFailure, VariableError};
pub use event::{EventStore, ExecutionEvent, ExecutionEventKind, InMemoryEventStore};
pub use invoker::{InvokerConfig, Job, ResultHandle, TaskId, TaskInvoker, TaskInvokerExt, ThreadPoolTaskInvoker};
pub use model::{ExecutionContext, VariableMap, VariableSnapshot};
