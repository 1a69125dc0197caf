use std::time::Duration;

use tokio::sync::oneshot::{self, error::TryRecvError};

use super::TaskId;
use crate::errors::ComputationFailure;

/// Resultado pendiente de una computación asíncrona.
///
/// Resuelve exactamente una vez: el emisor `oneshot` se consume al enviar y
/// todos los métodos de observación consumen el handle.
#[derive(Debug)]
pub struct ResultHandle<T> {
    task_id: TaskId,
    rx: oneshot::Receiver<Result<T, ComputationFailure>>,
    timeout: Option<Duration>,
}

impl<T> ResultHandle<T> {
    pub(crate) fn new(task_id: TaskId,
                      rx: oneshot::Receiver<Result<T, ComputationFailure>>,
                      timeout: Option<Duration>)
                      -> Self {
        Self { task_id, rx, timeout }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Espera (sin bloquear el hilo) a que la computación termine.
    ///
    /// Con timeout configurado, vencido el plazo resuelve a
    /// `ComputationFailure::TimedOut`; la computación no se cancela y su
    /// resultado tardío se descarta.
    pub async fn resolve(self) -> Result<T, ComputationFailure> {
        let Self { rx, timeout, .. } = self;
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(received) => received.unwrap_or(Err(ComputationFailure::Abandoned)),
                Err(_) => Err(ComputationFailure::TimedOut(limit)),
            },
            None => rx.await.unwrap_or(Err(ComputationFailure::Abandoned)),
        }
    }

    /// Consulta sin esperar. Si aún está pendiente devuelve el handle.
    pub fn try_result(mut self) -> Result<Result<T, ComputationFailure>, Self> {
        match self.rx.try_recv() {
            Ok(res) => Ok(res),
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Closed) => Ok(Err(ComputationFailure::Abandoned)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    fn handle(timeout: Option<Duration>) -> (oneshot::Sender<Result<u8, ComputationFailure>>, ResultHandle<u8>) {
        let (tx, rx) = oneshot::channel();
        (tx, ResultHandle::new(TaskId(1), rx, timeout))
    }

    #[test]
    fn resolve_stays_pending_until_sent() {
        let (tx, h) = handle(None);
        let mut fut = task::spawn(h.resolve());
        assert_pending!(fut.poll());
        tx.send(Ok(9)).unwrap();
        assert!(fut.is_woken());
        assert_ready_eq!(fut.poll(), Ok(9));
    }

    #[test]
    fn dropped_sender_is_abandoned() {
        let (tx, h) = handle(None);
        drop(tx);
        assert_eq!(tokio_test::block_on(h.resolve()), Err(ComputationFailure::Abandoned));
    }

    #[test]
    fn try_result_returns_handle_while_pending() {
        let (tx, h) = handle(None);
        let h = h.try_result().unwrap_err();
        assert_eq!(h.task_id(), TaskId(1));
        tx.send(Err(ComputationFailure::failed("boom"))).unwrap();
        assert_eq!(h.try_result().unwrap(), Err(ComputationFailure::failed("boom")));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_resolves_to_timed_out() {
        let (_tx, h) = handle(Some(Duration::from_millis(30)));
        assert_eq!(h.resolve().await, Err(ComputationFailure::TimedOut(Duration::from_millis(30))));
    }
}
