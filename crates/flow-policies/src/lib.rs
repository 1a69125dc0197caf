//! flow-policies: políticas de fallo para el runtime de delegates.
//!
//! El core no reintenta nada. Estas políticas deciden, a partir del tipo de
//! fallo, si el runtime repite la unidad de trabajo. Solo `Computation`
//! ocurrió fuera del hilo transaccional, así que es el único tipo que la
//! política de reintentos considera recuperable.

use std::time::Duration;

use flow_core::{FailureDecision, FailureKind, FailurePolicy, NoRetryPolicy};
use log::debug;
use serde::{Deserialize, Serialize};

/// Parámetros de política soportados en v1.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "policy", content = "params")]
pub enum RetryParams {
    NoRetry,
    RetryOffThread(RetryOffThreadParams),
}

impl Default for RetryParams {
    fn default() -> Self {
        Self::NoRetry
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryOffThreadParams {
    /// Intentos totales, incluido el primero.
    pub max_attempts: u32,
    /// Espera base; el intento `n` espera `n * backoff_ms`.
    pub backoff_ms: u64,
}

impl Default for RetryOffThreadParams {
    fn default() -> Self {
        Self { max_attempts: 3,
               backoff_ms: 50 }
    }
}

/// Reintenta solo fallos de computación, con backoff lineal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryOffThreadPolicy {
    params: RetryOffThreadParams,
}

impl RetryOffThreadPolicy {
    pub fn new(params: RetryOffThreadParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RetryOffThreadParams {
        &self.params
    }
}

impl FailurePolicy for RetryOffThreadPolicy {
    fn id(&self) -> &'static str {
        "retry_off_thread"
    }

    fn decide(&self, kind: FailureKind, attempt: u32) -> FailureDecision {
        let decision = match kind {
            FailureKind::Computation if attempt < self.params.max_attempts => {
                let delay_ms = self.params.backoff_ms.saturating_mul(u64::from(attempt));
                FailureDecision::Retry { delay: Duration::from_millis(delay_ms) }
            }
            _ => FailureDecision::Fail,
        };
        debug!("{}: kind={kind:?} attempt={attempt} -> {decision:?}", self.id());
        decision
    }
}

/// Construye la política descrita por `params`.
pub fn policy_from_params(params: &RetryParams) -> Box<dyn FailurePolicy> {
    match params {
        RetryParams::NoRetry => Box::new(NoRetryPolicy),
        RetryParams::RetryOffThread(p) => Box::new(RetryOffThreadPolicy::new(p.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn retries_only_computation_failures() {
        let p = RetryOffThreadPolicy::new(RetryOffThreadParams { max_attempts: 3,
                                                                 backoff_ms: 10 });
        assert_eq!(p.decide(FailureKind::Computation, 1),
                   FailureDecision::Retry { delay: Duration::from_millis(10) });
        assert_eq!(p.decide(FailureKind::Computation, 2),
                   FailureDecision::Retry { delay: Duration::from_millis(20) });
        assert_eq!(p.decide(FailureKind::Computation, 3), FailureDecision::Fail);
        for kind in [FailureKind::Validation, FailureKind::RejectedExecution, FailureKind::Apply, FailureKind::Aborted] {
            assert_eq!(p.decide(kind, 1), FailureDecision::Fail);
        }
    }

    #[test]
    fn huge_backoff_saturates_instead_of_overflowing() {
        let p = RetryOffThreadPolicy::new(RetryOffThreadParams { max_attempts: 5,
                                                                 backoff_ms: u64::MAX / 2 + 1 });
        assert_eq!(p.decide(FailureKind::Computation, 2),
                   FailureDecision::Retry { delay: Duration::from_millis(u64::MAX) });
    }

    #[test]
    fn params_use_tagged_representation() {
        let params = RetryParams::RetryOffThread(RetryOffThreadParams::default());
        let v = serde_json::to_value(&params).unwrap();
        assert_eq!(v, json!({"policy": "RetryOffThread", "params": {"max_attempts": 3, "backoff_ms": 50}}));
        let back: RetryParams = serde_json::from_value(v).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn builds_policy_from_params() {
        assert_eq!(policy_from_params(&RetryParams::default()).id(), "no_retry");
        let boxed = policy_from_params(&RetryParams::RetryOffThread(RetryOffThreadParams::default()));
        assert_eq!(boxed.id(), "retry_off_thread");
        assert_eq!(boxed.decide(FailureKind::Apply, 1), FailureDecision::Fail);
    }
}
