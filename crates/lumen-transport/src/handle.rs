use crate::backend::BackendOpener;
use crate::connection::ConnectionState;
use crate::error::TransportError;
use crate::job::WriteJob;
use crate::status::{Counters, QueryStatus};
use crate::writer::Writer;
use lumen_codec::Address;
use lumen_events::EventBus;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Bound on the number of in-flight write jobs. Producers await their own
/// job's completion, so this is headroom rather than a backpressure knob
/// callers need to tune.
pub const QUEUE_CAPACITY: usize = 1024;

/// Cheaply cloneable front door to the transport. Every producer (resolver,
/// session controller, animation engine) enqueues through the same handle,
/// which is what gives the FIFO its total order (`spec.md` §5).
#[derive(Clone)]
pub struct TransportHandle {
    tx: mpsc::Sender<WriteJob>,
    state: Arc<RwLock<ConnectionState>>,
    counters: Arc<Counters>,
    queue_depth: Arc<AtomicI64>,
}

impl TransportHandle {
    /// Enqueue a fully framed packet and await its completion.
    pub async fn enqueue(&self, addr: Address, packet: Vec<u8>) -> Result<(), TransportError> {
        let (completion, rx) = oneshot::channel();
        self.queue_depth.fetch_add(1, Ordering::Relaxed);
        if self
            .tx
            .send(WriteJob {
                addr,
                packet,
                completion,
            })
            .await
            .is_err()
        {
            self.queue_depth.fetch_sub(1, Ordering::Relaxed);
            return Err(TransportError::Closed);
        }
        self.counters.jobs_enqueued.fetch_add(1, Ordering::Relaxed);
        rx.await.unwrap_or(Err(TransportError::Closed))
    }

    pub fn query_status(&self) -> QueryStatus {
        QueryStatus {
            state: *self.state.read().expect("connection state poisoned"),
            queue_depth: self.queue_depth.load(Ordering::Relaxed),
            counters: self.counters.snapshot(),
        }
    }
}

/// Spawn the writer task and return a handle to it plus its `JoinHandle`.
pub fn spawn(opener: Arc<dyn BackendOpener>, simulated: bool, events: EventBus) -> (TransportHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    let state = Arc::new(RwLock::new(ConnectionState::Closed));
    let counters = Arc::new(Counters::default());
    let queue_depth = Arc::new(AtomicI64::new(0));

    let writer = Writer::new(
        rx,
        opener,
        state.clone(),
        counters.clone(),
        queue_depth.clone(),
        events,
        simulated,
    );
    let join = tokio::spawn(writer.run());

    (
        TransportHandle {
            tx,
            state,
            counters,
            queue_depth,
        },
        join,
    )
}
