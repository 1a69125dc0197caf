//! Contratos de delegates futuros.
//!
//! - `FutureDelegate`: contrato base de dos fases que invoca el runtime
//!   (`begin_execution` en el hilo transaccional, `on_result` cuando el
//!   handle resuelve).
//! - `MappedFutureDelegate`: refinamiento en tres fases (extraer, computar,
//!   aplicar) con composición fija; todo tipo que lo implementa es también
//!   un `FutureDelegate`.
//! - `MapBasedFutureDelegate`: caso común donde el input es un snapshot de
//!   variables y el output un mapa de variables a escribir.

mod future;
mod map_based;
mod mapped;
mod state;

pub use future::FutureDelegate;
pub use map_based::MapBasedFutureDelegate;
pub use mapped::MappedFutureDelegate;
pub use state::DelegateState;
