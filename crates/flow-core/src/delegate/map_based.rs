use super::MappedFutureDelegate;
use crate::errors::{ApplyFailure, ComputationFailure, ValidationFailure};
use crate::model::{ExecutionContext, VariableMap, VariableSnapshot};

/// Delegate cuyo input es un snapshot de solo lectura de todas las
/// variables y cuyo output son las variables a escribir de vuelta.
pub trait MapBasedFutureDelegate {
    fn compute(input: VariableSnapshot) -> Result<VariableMap, ComputationFailure>;
}

impl<D: MapBasedFutureDelegate> MappedFutureDelegate for D {
    type Input = VariableSnapshot;
    type Output = VariableMap;

    fn extract_input(&self, ctx: &ExecutionContext) -> Result<VariableSnapshot, ValidationFailure> {
        Ok(ctx.snapshot())
    }

    fn compute(input: VariableSnapshot) -> Result<VariableMap, ComputationFailure> {
        <D as MapBasedFutureDelegate>::compute(input)
    }

    fn apply_output(&self, ctx: &mut ExecutionContext, output: VariableMap) -> Result<(), ApplyFailure> {
        for (name, value) in output {
            ctx.set_raw_variable(name, value);
        }
        Ok(())
    }
}
