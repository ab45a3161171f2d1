use crate::fixture::FixtureState;
use ahash::AHashMap;
use lumen_codec::{decode_frame, frame, Address};
use lumen_events::{Event, EventBus, WireEvent};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tracing::trace;

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Mirrors every frame the transport emits into a virtual fixture table, so
/// clients can exercise the full pipeline without hardware attached
/// (`spec.md` §4.8).
#[derive(Clone, Default)]
pub struct Simulator {
    fixtures: Arc<RwLock<AHashMap<Address, FixtureState>>>,
}

impl Simulator {
    pub fn new() -> Self {
        Simulator::default()
    }

    /// Subscribe to `events` and mirror every frame until the bus is
    /// dropped. Returns a handle to the background task.
    pub fn spawn(&self, events: &EventBus) -> JoinHandle<()> {
        let fixtures = self.fixtures.clone();
        let mut rx = events.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(Event::Frame(frame)) => apply_frame(&fixtures, &frame),
                    Ok(Event::Session(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Apply a single already-observed frame directly, bypassing the event
    /// bus. Used by tests and by callers replaying a recorded schedule.
    pub fn apply(&self, event: &WireEvent) {
        apply_frame(&self.fixtures, event);
    }

    pub fn fixture(&self, addr: Address) -> Option<FixtureState> {
        self.fixtures
            .read()
            .expect("fixture table poisoned")
            .get(&addr)
            .copied()
    }

    pub fn all(&self) -> Vec<(Address, FixtureState)> {
        self.fixtures
            .read()
            .expect("fixture table poisoned")
            .iter()
            .map(|(addr, state)| (*addr, *state))
            .collect()
    }

    pub fn filter(&self, predicate: impl Fn(Address) -> bool) -> Vec<(Address, FixtureState)> {
        self.fixtures
            .read()
            .expect("fixture table poisoned")
            .iter()
            .filter(|(addr, _)| predicate(**addr))
            .map(|(addr, state)| (*addr, *state))
            .collect()
    }

    pub fn reset(&self) {
        self.fixtures
            .write()
            .expect("fixture table poisoned")
            .clear();
    }
}

fn apply_frame(fixtures: &RwLock<AHashMap<Address, FixtureState>>, event: &WireEvent) {
    for raw in frame::decode_all(&event.bytes) {
        let Ok(decoded) = decode_frame(&raw) else {
            continue;
        };
        // Checksum mismatches are mirrored leniently; the simulator is a
        // diagnostic aid, not a protocol enforcer.
        trace!(addr = decoded.addr.0, opcode = decoded.opcode, checksum_ok = decoded.checksum_ok, "simulator_apply");

        let mut table = fixtures.write().expect("fixture table poisoned");
        let targets: Vec<Address> = if decoded.addr.is_broadcast() {
            table.keys().copied().collect()
        } else {
            vec![decoded.addr]
        };

        for addr in targets {
            let state = table.entry(addr).or_insert_with(FixtureState::off);
            apply_opcode(state, decoded.opcode, &decoded.params);
            state.last_updated = now_millis();
        }
    }
}

fn apply_opcode(state: &mut FixtureState, opcode: u8, params: &[u8]) {
    match opcode {
        0x20 => {
            state.on = true;
            state.r = 255;
            state.g = 255;
            state.b = 255;
            state.level = 255;
        }
        0x21 => {
            state.on = false;
            state.r = 0;
            state.g = 0;
            state.b = 0;
            state.level = 0;
        }
        0x22 => {
            let level = params.first().copied().unwrap_or(0);
            state.level = level;
            state.r = level;
            state.g = level;
            state.b = level;
            state.on = level > 0;
        }
        0x23 => {
            let level = params.first().copied().unwrap_or(0);
            state.level = level;
            state.r = level;
            state.g = level;
            state.b = level;
            state.on = level > 0;
        }
        0x2C => {
            if params.len() >= 3 {
                state.r = params[0];
                state.g = params[1];
                state.b = params[2];
                state.level = *params.iter().max().unwrap_or(&0);
                state.on = state.level > 0;
            }
        }
        0x31 => {
            if params.len() >= 9 {
                state.r = params[0];
                state.g = params[3];
                state.b = params[6];
                state.level = state.r.max(state.g).max(state.b);
                state.on = state.level > 0;
            }
        }
        _ => {}
    }
}
