use flow_core::CoreEngineError;
use thiserror::Error;

/// Errores de arranque y configuración de la aplicación.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error del motor: {0}")]
    Engine(#[from] CoreEngineError),
}
