use std::time::Duration;

use crate::errors::FailureKind;

/// Qué hace el runtime con una unidad que falló.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureDecision {
    /// Entregar el fallo al llamador.
    Fail,
    /// Repetir la unidad completa (las tres fases) tras `delay`.
    Retry { delay: Duration },
}

/// Contrato de políticas de fallo. El core nunca reintenta por su cuenta;
/// el runtime consulta la política con el tipo de fallo y el número de
/// intento (empezando en 1).
pub trait FailurePolicy {
    fn id(&self) -> &'static str;
    fn decide(&self, kind: FailureKind, attempt: u32) -> FailureDecision;
}

/// Política por defecto: nunca reintentar.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRetryPolicy;

impl FailurePolicy for NoRetryPolicy {
    fn id(&self) -> &'static str {
        "no_retry"
    }

    fn decide(&self, _kind: FailureKind, _attempt: u32) -> FailureDecision {
        FailureDecision::Fail
    }
}

impl<P: FailurePolicy + ?Sized> FailurePolicy for Box<P> {
    fn id(&self) -> &'static str {
        (**self).id()
    }

    fn decide(&self, kind: FailureKind, attempt: u32) -> FailureDecision {
        (**self).decide(kind, attempt)
    }
}
