use super::FutureDelegate;
use crate::errors::{ApplyFailure, ComputationFailure, DelegateError, ValidationFailure};
use crate::invoker::{ResultHandle, TaskInvoker, TaskInvokerExt};
use crate::model::ExecutionContext;

/// Delegate en tres fases.
///
/// `compute` no recibe `self` ni el contexto: su único dato es el input ya
/// extraído, así que la computación asíncrona no puede alcanzar el
/// `ExecutionContext` ni por accidente.
pub trait MappedFutureDelegate {
    type Input: Send + 'static;
    type Output: Send + 'static;

    /// Fase 1, hilo transaccional. Lee el contexto y produce un valor propio.
    fn extract_input(&self, ctx: &ExecutionContext) -> Result<Self::Input, ValidationFailure>;

    /// Fase 2, en un worker del invoker. No participa de la transacción.
    fn compute(input: Self::Input) -> Result<Self::Output, ComputationFailure>;

    /// Fase 3, hilo transaccional, con el valor exacto que devolvió `compute`.
    fn apply_output(&self, ctx: &mut ExecutionContext, output: Self::Output) -> Result<(), ApplyFailure>;
}

impl<D> FutureDelegate for D where D: MappedFutureDelegate + 'static
{
    type Output = D::Output;

    fn begin_execution(&self,
                       ctx: &ExecutionContext,
                       invoker: &dyn TaskInvoker)
                       -> Result<ResultHandle<Self::Output>, DelegateError> {
        // la extracción ocurre antes del submit, nunca dentro del closure
        let input = self.extract_input(ctx)?;
        let handle = invoker.submit(move || <D as MappedFutureDelegate>::compute(input))?;
        Ok(handle)
    }

    fn on_result(&self, ctx: &mut ExecutionContext, output: Self::Output) -> Result<(), ApplyFailure> {
        self.apply_output(ctx, output)
    }
}
