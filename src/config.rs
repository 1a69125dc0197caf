//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) una sola vez y expone el resultado en
//! `CONFIG`. Un valor `FUTUREFLOW_*` mal formado es un `CoreError::Config`,
//! nunca un default silencioso.
//! También provee `create_invoker`/`create_runtime` para obtener el pool de
//! workers y el runtime de delegates ya configurados.
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use dotenvy::dotenv;
use flow_core::{DelegateRuntime, InvokerConfig, ThreadPoolTaskInvoker};
use flow_policies::{policy_from_params, RetryOffThreadParams, RetryParams};
use once_cell::sync::Lazy;

use crate::errors::CoreError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Pool de workers del task invoker.
    pub invoker: InvokerConfig,
    /// Política de reintentos del runtime.
    pub retry: RetryParams,
}

impl AppConfig {
    /// Lee `FUTUREFLOW_*`; las variables ausentes toman el valor por defecto.
    pub fn from_env() -> Result<Self, CoreError> {
        Lazy::force(&DOTENV_LOADED);
        Ok(Self { invoker: invoker_from_env()?,
                  retry: retry_from_env()? })
    }
}

fn env_value<T>(key: &str) -> Result<Option<T>, CoreError>
    where T: FromStr,
          T::Err: Display
{
    match env::var(key) {
        Ok(raw) => raw.trim()
                      .parse()
                      .map(Some)
                      .map_err(|e| CoreError::Config(format!("{key}='{raw}': {e}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(CoreError::Config(format!("{key}: {e}"))),
    }
}

fn invoker_from_env() -> Result<InvokerConfig, CoreError> {
    let mut cfg = InvokerConfig::default();
    if let Some(workers) = env_value::<usize>("FUTUREFLOW_WORKERS")? {
        if workers == 0 {
            return Err(CoreError::Config("FUTUREFLOW_WORKERS debe ser mayor que 0".into()));
        }
        cfg = cfg.worker_threads(workers);
    }
    if let Some(queue) = env_value("FUTUREFLOW_QUEUE_CAPACITY")? {
        cfg = cfg.queue_capacity(queue);
    }
    if let Some(prefix) = env_value::<String>("FUTUREFLOW_THREAD_PREFIX")? {
        cfg = cfg.thread_name_prefix(prefix);
    }
    if let Some(ms) = env_value("FUTUREFLOW_TIMEOUT_MS")? {
        cfg = cfg.timeout(Duration::from_millis(ms));
    }
    Ok(cfg)
}

/// `FUTUREFLOW_RETRY_MAX` > 1 activa reintentos de fallos de computación.
fn retry_from_env() -> Result<RetryParams, CoreError> {
    match env_value::<u32>("FUTUREFLOW_RETRY_MAX")? {
        Some(max_attempts) if max_attempts > 1 => {
            let backoff_ms =
                env_value("FUTUREFLOW_RETRY_BACKOFF_MS")?.unwrap_or(RetryOffThreadParams::default().backoff_ms);
            Ok(RetryParams::RetryOffThread(RetryOffThreadParams { max_attempts,
                                                                  backoff_ms }))
        }
        _ => Ok(RetryParams::NoRetry),
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<Result<AppConfig, CoreError>> = Lazy::new(AppConfig::from_env);

/// Configuración global, o el error con que falló su carga.
pub fn config() -> Result<&'static AppConfig, CoreError> {
    CONFIG.as_ref().map_err(Clone::clone)
}

/// Crea el invoker por defecto según la configuración cargada.
pub fn create_invoker() -> Result<ThreadPoolTaskInvoker, CoreError> {
    Ok(ThreadPoolTaskInvoker::new(config()?.invoker.clone())?)
}

/// Crea un runtime de delegates con invoker y política de `CONFIG`.
pub fn create_runtime() -> Result<DelegateRuntime, CoreError> {
    let invoker = Arc::new(create_invoker()?);
    Ok(DelegateRuntime::new(invoker)?.with_policy(policy_from_params(&config()?.retry)))
}
