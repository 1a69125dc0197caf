//! Configuración del invoker por defecto.
//! La lectura desde el entorno (`FUTUREFLOW_*`) vive en la fachada.

use std::time::Duration;

pub const DEFAULT_QUEUE_CAPACITY: usize = 64;
pub const DEFAULT_THREAD_PREFIX: &str = "flow-async";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokerConfig {
    /// Hilos del pool.
    pub worker_threads: usize,
    /// Trabajos aceptados además de los que ya están corriendo.
    pub queue_capacity: usize,
    pub thread_name_prefix: String,
    pub timeout: Option<Duration>,
}

impl Default for InvokerConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        Self { worker_threads: workers,
               queue_capacity: DEFAULT_QUEUE_CAPACITY,
               thread_name_prefix: DEFAULT_THREAD_PREFIX.to_string(),
               timeout: None }
    }
}

impl InvokerConfig {
    pub fn worker_threads(mut self, n: usize) -> Self {
        self.worker_threads = n.max(1);
        self
    }

    pub fn queue_capacity(mut self, n: usize) -> Self {
        self.queue_capacity = n;
        self
    }

    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Máximo de trabajos admitidos a la vez (corriendo + en cola).
    pub fn capacity(&self) -> usize {
        self.worker_threads + self.queue_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_setters() {
        let cfg = InvokerConfig::default().worker_threads(0)
                                          .queue_capacity(3)
                                          .thread_name_prefix("t")
                                          .timeout(Duration::from_millis(5));
        assert_eq!(cfg.worker_threads, 1);
        assert_eq!(cfg.capacity(), 4);
        assert_eq!(cfg.thread_name_prefix, "t");
        assert_eq!(cfg.timeout, Some(Duration::from_millis(5)));
    }
}
