//! The worker pool itself.

use std::sync::Arc;

use {
    async_trait::async_trait,
    futures::FutureExt,
    std::panic::AssertUnwindSafe,
    tokio::{
        sync::{Mutex as AsyncMutex, mpsc},
        task::JoinHandle,
    },
    tokio_util::sync::CancellationToken,
    tracing::{Instrument, debug, error, info},
};

use {
    bookline_common::{Event, RequestContext},
    bookline_sessions::ChatLocks,
};

use crate::error::{Error, Result};

/// Queue capacity per worker.
const QUEUE_DEPTH_PER_WORKER: usize = 10;

/// Handles one classified inbound event. Implementations run synchronously
/// within their worker; blocking downstream calls occupy that worker.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, ctx: RequestContext, event: Event) -> anyhow::Result<()>;
}

/// Cloneable intake side of the queue, given to the receiver task.
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::Sender<Event>,
    cancel: CancellationToken,
}

impl QueueHandle {
    /// Enqueue an event. Blocks (backpressure) while the queue is full;
    /// fails once the dispatcher has been stopped.
    pub async fn submit(&self, event: Event) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Stopped);
        }
        self.tx.send(event).await.map_err(|_| Error::Stopped)
    }

    /// Resolves when shutdown begins; the receiver task exits on this and
    /// drops its handle so the queue can close.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

/// Bounded pool of N workers draining one shared queue.
pub struct Dispatcher {
    tx: mpsc::Sender<Event>,
    cancel: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Spawn `workers` workers over a queue of `workers × 10` slots.
    #[must_use]
    pub fn new(handler: Arc<dyn EventHandler>, locks: Arc<ChatLocks>, workers: usize) -> Self {
        let workers = workers.max(1);
        let (tx, rx) = mpsc::channel::<Event>(workers * QUEUE_DEPTH_PER_WORKER);
        let rx = Arc::new(AsyncMutex::new(rx));
        let cancel = CancellationToken::new();

        let handles = (0..workers)
            .map(|worker| {
                let rx = Arc::clone(&rx);
                let handler = Arc::clone(&handler);
                let locks = Arc::clone(&locks);
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    run_worker(worker, rx, handler, locks, cancel).await;
                })
            })
            .collect();

        info!(workers, "dispatcher started");
        Self {
            tx,
            cancel,
            workers: handles,
        }
    }

    /// Intake handle for the receiver task.
    #[must_use]
    pub fn queue(&self) -> QueueHandle {
        QueueHandle {
            tx: self.tx.clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Cooperative shutdown: stop intake, then wait for the workers, which
    /// drain every already-buffered event and finish in-flight handlers.
    /// Returns once the last worker has exited.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        drop(self.tx);
        for handle in self.workers {
            // A worker that panicked outside the isolation boundary is
            // already logged by the runtime; nothing useful to do here.
            let _ = handle.await;
        }
        info!("dispatcher stopped");
    }
}

async fn run_worker(
    worker: usize,
    rx: Arc<AsyncMutex<mpsc::Receiver<Event>>>,
    handler: Arc<dyn EventHandler>,
    locks: Arc<ChatLocks>,
    cancel: CancellationToken,
) {
    debug!(worker, "worker started");
    loop {
        // Hold the receiver lock only while claiming the next event. After a
        // stop signal the already-buffered backlog is still drained; only an
        // empty (or closed) queue releases the worker.
        let event = {
            let mut rx = rx.lock().await;
            if cancel.is_cancelled() {
                rx.try_recv().ok()
            } else {
                tokio::select! {
                    event = rx.recv() => event,
                    () = cancel.cancelled() => rx.try_recv().ok(),
                }
            }
        };
        let Some(event) = event else {
            debug!(worker, "queue drained, worker stopping");
            return;
        };

        let chat_id = event.chat_id();
        let ctx = RequestContext::new();
        let span = ctx.span();
        debug!(worker, chat_id, request_id = ctx.request_id(), "event claimed");

        // Serialize all handling for this chat: the store only makes single
        // get/set calls atomic, not a load-then-store sequence.
        let _chat_guard = locks.lock(chat_id).await;

        let outcome = AssertUnwindSafe(handler.handle(ctx.clone(), event))
            .catch_unwind()
            .instrument(span)
            .await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(
                    worker,
                    chat_id,
                    request_id = ctx.request_id(),
                    error = format!("{e:#}"),
                    "event handler failed"
                );
            }
            Err(panic) => {
                error!(
                    worker,
                    chat_id,
                    request_id = ctx.request_id(),
                    panic = panic_message(&panic),
                    "event handler panicked"
                );
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
