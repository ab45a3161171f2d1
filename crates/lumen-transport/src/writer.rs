//! The single writer task: the FIFO at the heart of the transport
//! (`spec.md` §4.4, §9 "Single-writer serial").

use crate::backend::{BackendOpener, SerialBackend};
use crate::connection::{ConnectionState, ReconnectPolicy};
use crate::job::WriteJob;
use crate::status::Counters;
use lumen_events::{EventBus, WireEvent};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Inter-packet gap inserted between successive jobs so devices have time
/// to process a command before the next one arrives.
pub const INTER_PACKET_GAP: Duration = Duration::from_millis(10);

pub struct Writer {
    rx: mpsc::Receiver<WriteJob>,
    opener: Arc<dyn BackendOpener>,
    backend: Option<Box<dyn SerialBackend>>,
    state: Arc<RwLock<ConnectionState>>,
    counters: Arc<Counters>,
    queue_depth: Arc<AtomicI64>,
    events: EventBus,
    simulated: bool,
    reconnect_policy: ReconnectPolicy,
}

impl Writer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rx: mpsc::Receiver<WriteJob>,
        opener: Arc<dyn BackendOpener>,
        state: Arc<RwLock<ConnectionState>>,
        counters: Arc<Counters>,
        queue_depth: Arc<AtomicI64>,
        events: EventBus,
        simulated: bool,
    ) -> Self {
        Writer {
            rx,
            opener,
            backend: None,
            state,
            counters,
            queue_depth,
            events,
            simulated,
            reconnect_policy: ReconnectPolicy::default(),
        }
    }

    fn set_state(&self, new_state: ConnectionState) {
        let mut guard = self.state.write().expect("connection state poisoned");
        if *guard != new_state {
            debug!(target: "transport.connection", from = ?*guard, to = ?new_state, "state_transition");
            *guard = new_state;
        }
    }

    fn current_state(&self) -> ConnectionState {
        *self.state.read().expect("connection state poisoned")
    }

    async fn try_open(&mut self) -> bool {
        let opener = self.opener.clone();
        let result = tokio::task::spawn_blocking(move || opener.open()).await;
        match result {
            Ok(Ok(backend)) => {
                self.backend = Some(backend);
                true
            }
            Ok(Err(err)) => {
                warn!(target: "transport.connection", %err, "open_failed");
                false
            }
            Err(join_err) => {
                warn!(target: "transport.connection", %join_err, "open_task_panicked");
                false
            }
        }
    }

    /// Ensure the backend is open, running the bounded exponential
    /// reconnect schedule if necessary. Returns `false` if every attempt
    /// was exhausted.
    async fn ensure_open(&mut self) -> bool {
        if self.current_state() == ConnectionState::Open {
            return true;
        }

        self.set_state(ConnectionState::Opening);
        if self.try_open().await {
            self.set_state(ConnectionState::Open);
            return true;
        }

        self.set_state(ConnectionState::Reconnecting);
        for attempt in 0..self.reconnect_policy.max_attempts {
            let delay = self.reconnect_policy.delay_for(attempt);
            tokio::time::sleep(delay).await;
            self.counters.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
            if self.try_open().await {
                self.counters
                    .reconnect_successes
                    .fetch_add(1, Ordering::Relaxed);
                self.set_state(ConnectionState::Open);
                info!(target: "transport.connection", attempt, "reconnect_succeeded");
                return true;
            }
        }

        warn!(target: "transport.connection", attempts = self.reconnect_policy.max_attempts, "reconnect_abandoned");
        self.set_state(ConnectionState::Closed);
        false
    }

    async fn write_job(&mut self, packet: &[u8]) -> std::io::Result<()> {
        let mut backend = self
            .backend
            .take()
            .expect("ensure_open guarantees a backend is present");
        let bytes = packet.to_vec();
        let (backend, result) = tokio::task::spawn_blocking(move || {
            let result = backend.write_all(&bytes).and_then(|_| backend.flush());
            (backend, result)
        })
        .await
        .expect("writer blocking task panicked");
        self.backend = Some(backend);
        result
    }

    pub async fn run(mut self) {
        info!(target: "transport", simulated = self.simulated, "writer_started");
        while let Some(job) = self.rx.recv().await {
            self.queue_depth.fetch_sub(1, Ordering::Relaxed);

            if !self.ensure_open().await {
                let _ = job.completion.send(Err(crate::error::TransportError::Closed));
                continue;
            }

            match self.write_job(&job.packet).await {
                Ok(()) => {
                    self.counters.jobs_completed.fetch_add(1, Ordering::Relaxed);
                    self.events.publish_frame(WireEvent {
                        addr: job.addr,
                        bytes: job.packet,
                        simulated: self.simulated,
                    });
                    let _ = job.completion.send(Ok(()));
                }
                Err(err) => {
                    warn!(target: "transport", %err, "write_failed_entering_reconnect");
                    self.backend = None;
                    self.set_state(ConnectionState::Reconnecting);
                    let _ = job
                        .completion
                        .send(Err(crate::error::TransportError::Io(err.to_string())));
                }
            }

            tokio::time::sleep(INTER_PACKET_GAP).await;
        }

        self.set_state(ConnectionState::Closing);
        self.backend = None;
        self.set_state(ConnectionState::Closed);
        info!(target: "transport", "writer_stopped");
    }
}
