use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreEngineError;

/// Estado de una unidad de trabajo de un delegate.
///
/// Las transiciones válidas son:
/// - `Created` -> `Executing` (cuando `begin_execution` devuelve su handle)
/// - `Created` -> `Failed` (validación o rechazo, sin trabajo asíncrono)
/// - `Executing` -> `Resolved` (exactamente una llamada a `on_result`)
/// - `Executing` -> `Failed`
///
/// No se permiten reversiones; `Resolved` y `Failed` son terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelegateState {
    Created,
    Executing,
    Resolved,
    Failed,
}

impl DelegateState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Failed)
    }

    pub fn can_transition_to(self, next: DelegateState) -> bool {
        matches!((self, next),
                 (Self::Created, Self::Executing)
                 | (Self::Created, Self::Failed)
                 | (Self::Executing, Self::Resolved)
                 | (Self::Executing, Self::Failed))
    }

    pub fn transition(self, next: DelegateState) -> Result<DelegateState, CoreEngineError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreEngineError::InvalidTransition { from: self.to_string(),
                                                     to: next.to_string() })
        }
    }
}

impl fmt::Display for DelegateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "CREATED",
            Self::Executing => "EXECUTING",
            Self::Resolved => "RESOLVED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_are_allowed() {
        let s = DelegateState::Created.transition(DelegateState::Executing).unwrap();
        let s = s.transition(DelegateState::Resolved).unwrap();
        assert!(s.is_terminal());
        assert!(DelegateState::Created.transition(DelegateState::Failed).is_ok());
    }

    #[test]
    fn terminal_states_do_not_move() {
        for terminal in [DelegateState::Resolved, DelegateState::Failed] {
            for next in [DelegateState::Created, DelegateState::Executing, DelegateState::Resolved, DelegateState::Failed] {
                assert!(terminal.transition(next).is_err(), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn cannot_skip_executing() {
        let err = DelegateState::Created.transition(DelegateState::Resolved).unwrap_err();
        assert_eq!(err.to_string(), "invalid delegate state transition: CREATED -> RESOLVED");
        assert!(DelegateState::Executing.transition(DelegateState::Created).is_err());
    }
}
