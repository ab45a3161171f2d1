//! Event types and a broadcast bus used to fan out every emitted frame (and
//! every session transition) to independent observers — the simulator and
//! an eventual audit-log collaborator (`spec.md` §4.4, §4.6).
//!
//! The donor's `core-events` crate wires a single-consumer `mpsc` channel
//! from producers into one event loop. Here there are *multiple*,
//! independent consumers of the same stream (the simulator mirrors state;
//! an audit log just records), so the channel is generalized to a
//! `tokio::sync::broadcast` — same "bounded channel, producers never block
//! on slow consumers" shape, sized the same way.

use lumen_codec::Address;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Default broadcast channel capacity. A slow/absent subscriber can lag and
/// drop old frames rather than block the transport's single writer.
pub const EVENT_CHANNEL_CAP: usize = 4096;

pub static FRAMES_EMITTED: AtomicU64 = AtomicU64::new(0);
pub static FRAMES_LIVE: AtomicU64 = AtomicU64::new(0);
pub static FRAMES_SIMULATED: AtomicU64 = AtomicU64::new(0);
pub static EVENT_LAG_DROPS: AtomicU64 = AtomicU64::new(0);

/// One frame as observed leaving the transport, carrying the original bytes
/// (already framed + checksummed) and whether it went to the real device or
/// the simulation sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireEvent {
    pub addr: Address,
    pub bytes: Vec<u8>,
    pub simulated: bool,
}

/// A session controller transition, broadcast for audit purposes
/// (`spec.md` §6, "session event log").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { agent: String },
    LoggedOut { agent: String },
}

#[derive(Debug, Clone)]
pub enum Event {
    Frame(WireEvent),
    Session(SessionEvent),
}

/// Fan-out bus: producers (transport, session controller) publish; any
/// number of consumers (simulator, audit log, diagnostics) subscribe.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAP)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        EventBus { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publish a frame event. Never blocks; if nobody is subscribed the
    /// send is a no-op.
    pub fn publish_frame(&self, event: WireEvent) {
        FRAMES_EMITTED.fetch_add(1, Ordering::Relaxed);
        if event.simulated {
            FRAMES_SIMULATED.fetch_add(1, Ordering::Relaxed);
        } else {
            FRAMES_LIVE.fetch_add(1, Ordering::Relaxed);
        }
        trace!(target: "events.frame", addr = event.addr.0, simulated = event.simulated, len = event.bytes.len(), "frame_published");
        let _ = self.tx.send(Event::Frame(event));
    }

    pub fn publish_session(&self, event: SessionEvent) {
        let _ = self.tx.send(Event::Session(event));
    }
}

/// Drain a broadcast receiver into owned `WireEvent`s, silently skipping
/// lag (dropped-frame) notifications rather than treating them as fatal —
/// a lagging diagnostic subscriber must never back-pressure the transport.
pub async fn recv_frame(rx: &mut broadcast::Receiver<Event>) -> Option<WireEvent> {
    loop {
        match rx.recv().await {
            Ok(Event::Frame(frame)) => return Some(frame),
            Ok(Event::Session(_)) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                EVENT_LAG_DROPS.fetch_add(skipped, Ordering::Relaxed);
                warn!(target: "events.bus", skipped, "subscriber_lagged");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}
