use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::{InvokerConfig, Job, TaskId, TaskInvoker};
use crate::errors::{CoreEngineError, RejectedExecution};

/// Invoker por defecto sobre un pool `rayon` propio.
///
/// La admisión está acotada a `worker_threads + queue_capacity` trabajos
/// simultáneos; por encima de eso `spawn` rechaza con `Saturated` en lugar
/// de encolar sin límite.
pub struct ThreadPoolTaskInvoker {
    pool: ThreadPool,
    capacity: usize,
    in_flight: Arc<AtomicUsize>,
    closed: AtomicBool,
    next_id: AtomicU64,
    timeout: Option<Duration>,
}

impl ThreadPoolTaskInvoker {
    pub fn new(config: InvokerConfig) -> Result<Self, CoreEngineError> {
        let prefix = config.thread_name_prefix.clone();
        let pool = ThreadPoolBuilder::new().num_threads(config.worker_threads)
                                           .thread_name(move |i| format!("{prefix}-{i}"))
                                           .build()
                                           .map_err(|e| CoreEngineError::Internal(format!("worker pool: {e}")))?;
        info!("task invoker started: workers={} capacity={} timeout={:?}",
              config.worker_threads,
              config.capacity(),
              config.timeout);
        Ok(Self { pool,
                  capacity: config.capacity(),
                  in_flight: Arc::new(AtomicUsize::new(0)),
                  closed: AtomicBool::new(false),
                  next_id: AtomicU64::new(0),
                  timeout: config.timeout })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Trabajos aceptados que todavía no entregaron su resultado.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl TaskInvoker for ThreadPoolTaskInvoker {
    fn spawn(&self, job: Job) -> Result<TaskId, RejectedExecution> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RejectedExecution::ShutDown);
        }
        let capacity = self.capacity;
        if self.in_flight
               .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < capacity).then_some(n + 1))
               .is_err()
        {
            warn!("task invoker saturated: capacity={capacity}");
            return Err(RejectedExecution::Saturated { capacity });
        }

        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let in_flight = Arc::clone(&self.in_flight);
        self.pool.spawn(move || {
                     debug!("{id} running on {:?}", std::thread::current().name());
                     // la capacidad se libera antes de resolver el handle
                     job.run_with(|| {
                            in_flight.fetch_sub(1, Ordering::AcqRel);
                        });
                 });
        Ok(id)
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            info!("task invoker shut down: in_flight={}", self.in_flight());
        }
    }

    fn is_shutdown(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
