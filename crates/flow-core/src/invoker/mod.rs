//! Task invoker: servicio de proceso que ejecuta computaciones fuera del
//! hilo transaccional y devuelve un `ResultHandle` por cada una.
//!
//! `TaskInvoker` es la costura object-safe (recibe trabajos ya empaquetados);
//! `TaskInvokerExt::submit` es la API tipada que usan los delegates.

mod config;
mod handle;
mod pool;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::errors::{ComputationFailure, RejectedExecution};

pub use config::{InvokerConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_THREAD_PREFIX};
pub use handle::ResultHandle;
pub use pool::ThreadPoolTaskInvoker;

/// Identificador de una computación enviada a un invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

type Delivery = Box<dyn FnOnce() + Send>;

/// Trabajo opaco listo para ejecutarse en un worker.
///
/// Separa la computación de la entrega del resultado al handle, de modo que
/// el invoker pueda liberar su capacidad antes de que el handle resuelva.
pub struct Job {
    inner: Box<dyn FnOnce() -> Delivery + Send>,
}

impl Job {
    fn new(inner: Box<dyn FnOnce() -> Delivery + Send>) -> Self {
        Self { inner }
    }

    pub fn run(self) {
        self.run_with(|| {})
    }

    /// Ejecuta la computación, luego `before_delivery`, y por último
    /// resuelve el handle asociado.
    pub fn run_with(self, before_delivery: impl FnOnce()) {
        let deliver = (self.inner)();
        before_delivery();
        deliver();
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").finish_non_exhaustive()
    }
}

/// Servicio thread-safe, sin estado por llamada.
pub trait TaskInvoker: Send + Sync {
    /// Encola un trabajo. No bloquea; si no hay capacidad falla de inmediato.
    fn spawn(&self, job: Job) -> Result<TaskId, RejectedExecution>;

    /// Límite de espera que se aplica a los handles creados por este invoker.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Deja de aceptar trabajo nuevo. Lo ya aceptado corre hasta terminar.
    fn shutdown(&self);

    fn is_shutdown(&self) -> bool;
}

pub trait TaskInvokerExt: TaskInvoker {
    /// Envía `computation` a un worker y devuelve el handle de su resultado.
    ///
    /// Un panic dentro de la computación se captura como
    /// `ComputationFailure::Panicked`.
    fn submit<T, F>(&self, computation: F) -> Result<ResultHandle<T>, RejectedExecution>
        where T: Send + 'static,
              F: FnOnce() -> Result<T, ComputationFailure> + Send + 'static
    {
        let (tx, rx) = oneshot::channel();
        let job = Job::new(Box::new(move || {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(computation)) {
                Ok(res) => res,
                Err(payload) => Err(ComputationFailure::Panicked(panic_message(payload.as_ref()))),
            };
            let deliver: Delivery = Box::new(move || {
                // el receptor pudo haberse descartado (timeout)
                let _ = tx.send(outcome);
            });
            deliver
        }));
        let task_id = self.spawn(job)?;
        Ok(ResultHandle::new(task_id, rx, self.timeout()))
    }
}

impl<I: TaskInvoker + ?Sized> TaskInvokerExt for I {}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    /// Invoker manual: guarda los trabajos y los corre cuando el test lo pide.
    #[derive(Default)]
    struct ManualInvoker {
        queue: Mutex<Vec<Job>>,
        next: AtomicU64,
        closed: AtomicBool,
    }

    impl ManualInvoker {
        fn run_all(&self) {
            let jobs: Vec<Job> = self.queue.lock().unwrap().drain(..).collect();
            for job in jobs {
                job.run();
            }
        }
    }

    impl TaskInvoker for ManualInvoker {
        fn spawn(&self, job: Job) -> Result<TaskId, RejectedExecution> {
            if self.closed.load(Ordering::SeqCst) {
                return Err(RejectedExecution::ShutDown);
            }
            self.queue.lock().unwrap().push(job);
            Ok(TaskId(self.next.fetch_add(1, Ordering::SeqCst)))
        }

        fn shutdown(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }

        fn is_shutdown(&self) -> bool {
            self.closed.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn handle_stays_pending_until_job_runs() {
        let invoker = ManualInvoker::default();
        let handle = invoker.submit(|| Ok(21 * 2)).unwrap();
        let handle = handle.try_result().expect_err("nothing ran yet");
        invoker.run_all();
        assert_eq!(handle.try_result().ok(), Some(Ok(42)));
    }

    #[test]
    fn panic_is_captured_into_handle() {
        let invoker = ManualInvoker::default();
        let handle = invoker.submit::<i32, _>(|| panic!("kaboom")).unwrap();
        invoker.run_all();
        assert_eq!(handle.try_result().ok(), Some(Err(ComputationFailure::Panicked("kaboom".into()))));
    }

    #[test]
    fn dropped_job_resolves_as_abandoned() {
        let invoker = ManualInvoker::default();
        let handle = invoker.submit(|| Ok(1)).unwrap();
        invoker.queue.lock().unwrap().clear();
        assert_eq!(handle.try_result().ok(), Some(Err(ComputationFailure::Abandoned)));
    }

    #[test]
    fn works_through_trait_object() {
        let invoker = ManualInvoker::default();
        let dyn_invoker: &dyn TaskInvoker = &invoker;
        let handle = dyn_invoker.submit(|| Ok("done")).unwrap();
        invoker.run_all();
        assert_eq!(handle.try_result().ok(), Some(Ok("done")));
        invoker.shutdown();
        assert_eq!(dyn_invoker.submit(|| Ok(())).err(), Some(RejectedExecution::ShutDown));
    }
}
