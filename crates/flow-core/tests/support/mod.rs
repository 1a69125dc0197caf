#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use flow_core::{InvokerConfig, Job, RejectedExecution, TaskId, TaskInvoker, ThreadPoolTaskInvoker};

/// Fase observada y el hilo donde ocurrió.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseRecord {
    pub phase: &'static str,
    pub thread: ThreadId,
}

/// Registro compartido de fases. Viaja dentro del input para que la
/// computación pueda anotar sin tocar el contexto.
#[derive(Debug, Default)]
pub struct Recorder {
    records: Mutex<Vec<PhaseRecord>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn mark(&self, phase: &'static str) {
        self.records.lock().unwrap().push(PhaseRecord { phase,
                                                        thread: thread::current().id() });
    }

    pub fn phases(&self) -> Vec<&'static str> {
        self.records.lock().unwrap().iter().map(|r| r.phase).collect()
    }

    pub fn count(&self, phase: &str) -> usize {
        self.records.lock().unwrap().iter().filter(|r| r.phase == phase).count()
    }

    pub fn thread_of(&self, phase: &str) -> Option<ThreadId> {
        self.records.lock().unwrap().iter().find(|r| r.phase == phase).map(|r| r.thread)
    }
}

/// Invoker que cuenta cuántos trabajos recibió antes de delegar.
pub struct CountingInvoker<I: TaskInvoker> {
    pub inner: I,
    pub spawned: AtomicUsize,
}

impl<I: TaskInvoker> CountingInvoker<I> {
    pub fn new(inner: I) -> Self {
        Self { inner,
               spawned: AtomicUsize::new(0) }
    }

    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }
}

impl<I: TaskInvoker> TaskInvoker for CountingInvoker<I> {
    fn spawn(&self, job: Job) -> Result<TaskId, RejectedExecution> {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        self.inner.spawn(job)
    }

    fn timeout(&self) -> Option<Duration> {
        self.inner.timeout()
    }

    fn shutdown(&self) {
        self.inner.shutdown()
    }

    fn is_shutdown(&self) -> bool {
        self.inner.is_shutdown()
    }
}

/// Invoker sin capacidad: rechaza todo.
pub struct SaturatedInvoker;

impl TaskInvoker for SaturatedInvoker {
    fn spawn(&self, _job: Job) -> Result<TaskId, RejectedExecution> {
        Err(RejectedExecution::Saturated { capacity: 0 })
    }

    fn shutdown(&self) {}

    fn is_shutdown(&self) -> bool {
        false
    }
}

pub fn pool(workers: usize) -> ThreadPoolTaskInvoker {
    ThreadPoolTaskInvoker::new(InvokerConfig::default().worker_threads(workers)
                                                       .thread_name_prefix("it-pool")).expect("pool")
}
