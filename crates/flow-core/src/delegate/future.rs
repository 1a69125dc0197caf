use crate::errors::{ApplyFailure, DelegateError};
use crate::invoker::{ResultHandle, TaskInvoker};
use crate::model::ExecutionContext;

/// Contrato base que el runtime ve.
///
/// Ciclo por unidad de trabajo: `Created -> Executing -> (Resolved | Failed)`.
/// `begin_execution` se llama una vez y no debe esperar al resultado;
/// `on_result` se llama a lo sumo una vez, solo si el handle resolvió con
/// éxito, y de nuevo en un hilo transaccional.
pub trait FutureDelegate {
    type Output: Send + 'static;

    /// Nombre para eventos y logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn begin_execution(&self,
                       ctx: &ExecutionContext,
                       invoker: &dyn TaskInvoker)
                       -> Result<ResultHandle<Self::Output>, DelegateError>;

    fn on_result(&self, ctx: &mut ExecutionContext, output: Self::Output) -> Result<(), ApplyFailure>;
}
