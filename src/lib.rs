//! futureflow
//!
//! Este crate actúa como fachada del workspace:
//! - Expone `config` para cargar la configuración desde el entorno.
//! - Expone `errors` para errores de arranque de la aplicación.
//! - Re-exporta `flow_core` (contrato de delegates) y `flow_policies`.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod errors;

pub use flow_core::*;
pub use flow_policies::{policy_from_params, RetryOffThreadParams, RetryOffThreadPolicy, RetryParams};

#[cfg(test)]
mod tests {
	use super::errors::CoreError;
	use super::*;

	#[test]
	fn config_error_tests() {
		let c = CoreError::Config("x".into()).to_string();
		assert_eq!(c, "Error de configuración: x");
	}

	#[test]
	fn engine_errors_convert() {
		let e: CoreError = CoreEngineError::Internal("fallo".into()).into();
		assert!(matches!(e, CoreError::Engine(CoreEngineError::Internal(_))));
	}
}
