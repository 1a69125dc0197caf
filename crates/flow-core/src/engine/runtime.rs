//! Driver de unidades de trabajo.
//!
//! El hilo que llama a `run_until_idle`/`execute` es el hilo transaccional:
//! un runtime tokio `current_thread` conduce ahí todas las unidades con
//! `join_all`, de modo que cada `begin_execution` y cada `on_result` corre en
//! ese hilo. Mientras una computación corre en el pool, la unidad queda
//! suspendida en `ResultHandle::resolve` y el hilo atiende a las demás
//! unidades; al resolver, la continuación vuelve al mismo hilo.

use std::cell::{Ref, RefCell};
use std::panic::AssertUnwindSafe;
use std::rc::Rc;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::{join_all, LocalBoxFuture};
use futures::FutureExt;
use log::{debug, error, warn};
use tokio::runtime::{Builder, Runtime};
use uuid::Uuid;

use super::policy::{FailureDecision, FailurePolicy, NoRetryPolicy};
use crate::delegate::{DelegateState, FutureDelegate};
use crate::errors::{CoreEngineError, DelegateError};
use crate::event::{EventStore, ExecutionEvent, ExecutionEventKind, InMemoryEventStore};
use crate::invoker::{panic_message, TaskInvoker};
use crate::model::ExecutionContext;

/// Resultado de una unidad de trabajo, con su contexto devuelto al llamador.
#[derive(Debug)]
pub struct UnitOutcome {
    pub execution_id: Uuid,
    pub context: ExecutionContext,
    pub result: Result<(), DelegateError>,
    /// Intentos realizados (1 si no hubo reintentos).
    pub attempts: u32,
}

impl UnitOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Lo que cada unidad necesita del runtime, clonado al programarla.
struct UnitDriver<E: EventStore> {
    invoker: Arc<dyn TaskInvoker>,
    policy: Rc<dyn FailurePolicy>,
    events: Rc<RefCell<E>>,
    states: Arc<DashMap<Uuid, DelegateState>>,
}

impl<E: EventStore> UnitDriver<E> {
    fn emit(&self, execution_id: Uuid, kind: ExecutionEventKind) {
        self.events.borrow_mut().append_kind(execution_id, kind);
    }

    fn advance(&self, execution_id: Uuid, next: DelegateState) {
        let mut entry = self.states.entry(execution_id).or_insert(DelegateState::Created);
        match entry.transition(next) {
            Ok(state) => *entry = state,
            Err(e) => {
                error!("execution {execution_id}: {e}");
                debug_assert!(false, "execution {execution_id}: {e}");
            }
        }
    }

    fn fail(&self, execution_id: Uuid, err: DelegateError) -> DelegateError {
        self.advance(execution_id, DelegateState::Failed);
        self.emit(execution_id,
                  ExecutionEventKind::ExecutionFailed { kind: err.kind(),
                                                        message: err.to_string() });
        err
    }

    /// Cierra una unidad cortada por un panic. El estado puede ser cualquiera
    /// de los no terminales, así que no pasa por `advance`.
    fn abort(&self, execution_id: Uuid, message: String) -> DelegateError {
        error!("execution {execution_id}: panicked on the transactional thread: {message}");
        {
            let mut entry = self.states.entry(execution_id).or_insert(DelegateState::Created);
            if !entry.is_terminal() {
                *entry = DelegateState::Failed;
            }
        }
        let err = DelegateError::Aborted(message);
        self.emit(execution_id,
                  ExecutionEventKind::ExecutionFailed { kind: err.kind(),
                                                        message: err.to_string() });
        err
    }

    /// Nunca propaga un panic: el contexto vuelve siempre al llamador.
    async fn drive<D: FutureDelegate>(self, delegate: Rc<D>, mut ctx: ExecutionContext) -> UnitOutcome {
        let execution_id = ctx.execution_id();
        let mut attempts = 1;
        let run = AssertUnwindSafe(self.run_attempts(delegate.as_ref(), &mut ctx, &mut attempts)).catch_unwind()
                                                                                                  .await;
        let result = match run {
            Ok(result) => result,
            Err(payload) => Err(self.abort(execution_id, panic_message(payload.as_ref()))),
        };
        UnitOutcome { execution_id,
                      context: ctx,
                      result,
                      attempts }
    }

    async fn run_attempts<D: FutureDelegate + ?Sized>(&self,
                                                      delegate: &D,
                                                      ctx: &mut ExecutionContext,
                                                      attempt: &mut u32)
                                                      -> Result<(), DelegateError> {
        let execution_id = ctx.execution_id();
        loop {
            let err = match self.attempt(delegate, ctx, *attempt).await {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            match self.policy.decide(err.kind(), *attempt) {
                FailureDecision::Retry { delay } => {
                    warn!("execution {execution_id}: attempt {attempt} failed ({err}); retrying in {delay:?} (policy={})",
                          self.policy.id());
                    *attempt += 1;
                    let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
                    self.emit(execution_id,
                              ExecutionEventKind::RetryScheduled { attempt: *attempt,
                                                                   delay_ms });
                    tokio::time::sleep(delay).await;
                }
                FailureDecision::Fail => {
                    error!("execution {execution_id}: failed after {attempt} attempt(s): {err}");
                    return Err(err);
                }
            }
        }
    }

    /// Un intento completo: cada intento es una máquina de estados nueva.
    async fn attempt<D: FutureDelegate + ?Sized>(&self,
                                                 delegate: &D,
                                                 ctx: &mut ExecutionContext,
                                                 attempt: u32)
                                                 -> Result<(), DelegateError> {
        let execution_id = ctx.execution_id();
        self.states.insert(execution_id, DelegateState::Created);
        self.emit(execution_id,
                  ExecutionEventKind::ExecutionStarted { delegate: delegate.name().to_string(),
                                                         activity_id: ctx.activity_id().to_string(),
                                                         attempt });

        let handle = match delegate.begin_execution(ctx, self.invoker.as_ref()) {
            Ok(handle) => handle,
            Err(err) => return Err(self.fail(execution_id, err)),
        };
        self.advance(execution_id, DelegateState::Executing);
        self.emit(execution_id,
                  ExecutionEventKind::ComputationSubmitted { task_id: handle.task_id().0 });
        debug!("execution {execution_id}: {} submitted", handle.task_id());

        let output = match handle.resolve().await {
            Ok(output) => output,
            Err(failure) => return Err(self.fail(execution_id, failure.into())),
        };

        debug!("execution {execution_id}: applying output");
        if let Err(err) = delegate.on_result(ctx, output) {
            return Err(self.fail(execution_id, err.into()));
        }
        self.advance(execution_id, DelegateState::Resolved);
        self.emit(execution_id, ExecutionEventKind::OutputApplied);
        Ok(())
    }
}

/// Runtime de referencia: programa unidades de trabajo y las conduce hasta
/// un estado terminal.
pub struct DelegateRuntime<E: EventStore + 'static = InMemoryEventStore> {
    rt: Runtime,
    invoker: Arc<dyn TaskInvoker>,
    policy: Rc<dyn FailurePolicy>,
    events: Rc<RefCell<E>>,
    states: Arc<DashMap<Uuid, DelegateState>>,
    pending: Vec<LocalBoxFuture<'static, UnitOutcome>>,
}

impl DelegateRuntime<InMemoryEventStore> {
    /// Crea un runtime con store de eventos en memoria.
    pub fn new(invoker: Arc<dyn TaskInvoker>) -> Result<Self, CoreEngineError> {
        Self::with_event_store(invoker, InMemoryEventStore::default())
    }
}

impl<E: EventStore + 'static> DelegateRuntime<E> {
    pub fn with_event_store(invoker: Arc<dyn TaskInvoker>, event_store: E) -> Result<Self, CoreEngineError> {
        let rt = Builder::new_current_thread().enable_time()
                                              .build()
                                              .map_err(|e| CoreEngineError::Internal(format!("runtime: {e}")))?;
        Ok(Self { rt,
                  invoker,
                  policy: Rc::new(NoRetryPolicy),
                  events: Rc::new(RefCell::new(event_store)),
                  states: Arc::new(DashMap::new()),
                  pending: Vec::new() })
    }

    /// Política de fallos para las unidades programadas a partir de ahora.
    pub fn with_policy(mut self, policy: impl FailurePolicy + 'static) -> Self {
        self.policy = Rc::new(policy);
        self
    }

    fn driver(&self) -> UnitDriver<E> {
        UnitDriver { invoker: Arc::clone(&self.invoker),
                     policy: Rc::clone(&self.policy),
                     events: Rc::clone(&self.events),
                     states: Arc::clone(&self.states) }
    }

    /// Programa una unidad de trabajo. No ejecuta nada hasta `run_until_idle`.
    pub fn schedule<D: FutureDelegate + 'static>(&mut self, delegate: Rc<D>, ctx: ExecutionContext) -> Uuid {
        let execution_id = ctx.execution_id();
        self.states.insert(execution_id, DelegateState::Created);
        let unit = self.driver().drive(delegate, ctx).boxed_local();
        self.pending.push(unit);
        execution_id
    }

    /// Conduce todas las unidades programadas hasta un estado terminal y
    /// devuelve sus resultados en orden de programación, uno por unidad.
    ///
    /// El panic de una unidad se reporta como `DelegateError::Aborted` en su
    /// propio `UnitOutcome`; las demás siguen hasta el final.
    pub fn run_until_idle(&mut self) -> Vec<UnitOutcome> {
        let pending = std::mem::take(&mut self.pending);
        self.rt.block_on(join_all(pending))
    }

    /// Ejecuta una sola unidad hasta su fin.
    pub fn execute<D: FutureDelegate + 'static>(&mut self,
                                                delegate: Rc<D>,
                                                ctx: ExecutionContext)
                                                -> UnitOutcome {
        self.states.insert(ctx.execution_id(), DelegateState::Created);
        let drive = self.driver().drive(delegate, ctx);
        self.rt.block_on(drive)
    }

    pub fn invoker(&self) -> &Arc<dyn TaskInvoker> {
        &self.invoker
    }

    pub fn state_of(&self, execution_id: Uuid) -> Option<DelegateState> {
        self.states.get(&execution_id).map(|s| *s)
    }

    /// Tabla de estados compartible con otros hilos (monitoreo).
    pub fn states(&self) -> Arc<DashMap<Uuid, DelegateState>> {
        Arc::clone(&self.states)
    }

    pub fn event_store(&self) -> Ref<'_, E> {
        self.events.borrow()
    }

    pub fn list_events_for(&self, execution_id: Uuid) -> Vec<ExecutionEvent> {
        self.events.borrow().list(execution_id)
    }
}
