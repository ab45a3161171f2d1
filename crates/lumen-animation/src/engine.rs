//! Cooperative ambient animation loop (`spec.md` §4.7). Mirrors the donor's
//! `core-input::async_service` shape: a `running` flag checked at every
//! suspension point, and a `Notify` that lets cancellation interrupt an
//! in-progress sleep instead of waiting it out.

use crate::sequence::{Direction, Sequence, SequenceKind};
use lumen_codec::{build_packet, plan_rgb, Address, ChannelFade, Command};
use lumen_inventory::InventoryStore;
use lumen_transport::TransportHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

fn scale_channel(channel: u8, intensity: u8) -> u8 {
    ((channel as u16) * (intensity as u16) / 255) as u8
}

fn scale_rgb(color: (u8, u8, u8), intensity: u8) -> (u8, u8, u8) {
    (
        scale_channel(color.0, intensity),
        scale_channel(color.1, intensity),
        scale_channel(color.2, intensity),
    )
}

/// Waits `duration` unless `stop` is notified first. Returns `false` if the
/// wait was cut short by a cancellation.
async fn sleep_or_stop(duration: Duration, stop: &Notify) -> bool {
    tokio::select! {
        biased;
        _ = stop.notified() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

/// Enqueue `packets` in order, bailing out early (and reporting the early
/// exit) the moment `running` is cleared or the transport is closed.
async fn emit_all(
    transport: &TransportHandle,
    packets: Vec<(Address, Vec<u8>)>,
    running: &AtomicBool,
) -> bool {
    for (addr, packet) in packets {
        if !running.load(Ordering::Relaxed) {
            return false;
        }
        if transport.enqueue(addr, packet).await.is_err() {
            return false;
        }
    }
    running.load(Ordering::Relaxed)
}

/// Drives exactly one ambient sequence; either stopped, or running the one
/// sequence passed to [`AnimationEngine::start`].
pub struct AnimationEngine {
    inventory: Arc<dyn InventoryStore>,
    transport: TransportHandle,
    session_active: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AnimationEngine {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        transport: TransportHandle,
        session_active: Arc<AtomicBool>,
    ) -> Self {
        AnimationEngine {
            inventory,
            transport,
            session_active,
            running: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(Notify::new()),
            task: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start `sequence`. A no-op (returns `false`) if a session is active or
    /// a sequence is already running (`spec.md` §4.7, "mutual exclusion").
    pub fn start(&self, sequence: Sequence) -> bool {
        if self.session_active.load(Ordering::Relaxed) {
            debug!(sequence = %sequence.id, "animation_start_rejected_session_active");
            return false;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            debug!(sequence = %sequence.id, "animation_start_rejected_already_running");
            return false;
        }

        let inventory = self.inventory.clone();
        let transport = self.transport.clone();
        let running = self.running.clone();
        let stop = self.stop.clone();
        let sequence_id = sequence.id.clone();

        info!(sequence = %sequence_id, "animation_started");
        let handle = tokio::spawn(async move {
            run_sequence(sequence, inventory, transport, running.clone(), stop).await;
            running.store(false, Ordering::SeqCst);
            info!(sequence = %sequence_id, "animation_stopped");
        });
        *self.task.lock().expect("animation task lock poisoned") = Some(handle);
        true
    }

    /// Clear the running flag and wake any in-progress sleep. The task
    /// observes this at its next suspension point and exits without
    /// emitting further packets (already-enqueued packets may still reach
    /// the wire — see `spec.md` §5).
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            self.stop.notify_one();
        }
    }
}

async fn run_sequence(
    sequence: Sequence,
    inventory: Arc<dyn InventoryStore>,
    transport: TransportHandle,
    running: Arc<AtomicBool>,
    stop: Arc<Notify>,
) {
    match sequence.kind {
        SequenceKind::Static { color, intensity } => {
            run_static(&inventory, &transport, &running, &stop, color, intensity).await
        }
        SequenceKind::Loop { steps } => {
            run_loop(&inventory, &transport, &running, &stop, &steps).await
        }
        SequenceKind::Wave {
            direction,
            color,
            fade_ms,
            inter_floor_delay,
            hold,
            pause,
            repeat,
        } => {
            run_wave(
                &inventory,
                &transport,
                &running,
                &stop,
                direction,
                color,
                fade_ms,
                inter_floor_delay,
                hold,
                pause,
                repeat,
            )
            .await
        }
        SequenceKind::Chase {
            tail_length,
            tick,
            color,
        } => run_chase(&inventory, &transport, &running, &stop, tail_length, tick, color).await,
        SequenceKind::Breathe {
            min_intensity,
            max_intensity,
            color,
            half_period,
        } => {
            run_breathe(
                &inventory,
                &transport,
                &running,
                &stop,
                min_intensity,
                max_intensity,
                color,
                half_period,
            )
            .await
        }
    }
}

fn all_fixtures(inventory: &Arc<dyn InventoryStore>) -> Vec<Address> {
    inventory
        .apartments_ordered()
        .into_iter()
        .flat_map(|apt| apt.fixtures)
        .collect()
}

fn fixtures_on_floor(inventory: &Arc<dyn InventoryStore>, floor: u16) -> Vec<Address> {
    inventory
        .apartments_on_floor(floor)
        .into_iter()
        .flat_map(|apt| apt.fixtures)
        .collect()
}

fn level_packets(fixtures: &[Address], color: (u8, u8, u8)) -> Vec<(Address, Vec<u8>)> {
    fixtures
        .iter()
        .map(|&addr| {
            let command = Command::RgbLevel {
                r: color.0,
                g: color.1,
                b: color.2,
            };
            (addr, build_packet(addr, &command))
        })
        .collect()
}

fn fade_packets(
    fixtures: &[Address],
    from: (u8, u8, u8),
    to: (u8, u8, u8),
    duration_ms: u32,
) -> Vec<(Address, Vec<u8>)> {
    let plans = plan_rgb(from, to, duration_ms);
    fixtures
        .iter()
        .map(|&addr| {
            let command = Command::RgbFade([
                ChannelFade::new(to.0, plans[0].interval, plans[0].step),
                ChannelFade::new(to.1, plans[1].interval, plans[1].step),
                ChannelFade::new(to.2, plans[2].interval, plans[2].step),
            ]);
            (addr, build_packet(addr, &command))
        })
        .collect()
}

async fn run_static(
    inventory: &Arc<dyn InventoryStore>,
    transport: &TransportHandle,
    running: &AtomicBool,
    stop: &Notify,
    color: (u8, u8, u8),
    intensity: u8,
) {
    let fixtures = all_fixtures(inventory);
    if fixtures.is_empty() {
        stop.notified().await;
        return;
    }
    let scaled = scale_rgb(color, intensity);
    if !emit_all(transport, level_packets(&fixtures, scaled), running).await {
        return;
    }
    // Hold indefinitely; the only way out is an external stop().
    stop.notified().await;
}

async fn run_loop(
    inventory: &Arc<dyn InventoryStore>,
    transport: &TransportHandle,
    running: &AtomicBool,
    stop: &Notify,
    steps: &[crate::sequence::LoopStep],
) {
    if steps.is_empty() {
        stop.notified().await;
        return;
    }
    let fixtures = all_fixtures(inventory);
    if fixtures.is_empty() {
        stop.notified().await;
        return;
    }

    let mut index = 0usize;
    loop {
        if !running.load(Ordering::Relaxed) {
            return;
        }
        let step = steps[index % steps.len()];
        let scaled = scale_rgb(step.color, step.intensity);
        if !emit_all(transport, level_packets(&fixtures, scaled), running).await {
            return;
        }
        if !sleep_or_stop(step.hold, stop).await {
            return;
        }
        index = index.wrapping_add(1);
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_wave(
    inventory: &Arc<dyn InventoryStore>,
    transport: &TransportHandle,
    running: &AtomicBool,
    stop: &Notify,
    direction: Direction,
    color: (u8, u8, u8),
    fade_ms: u32,
    inter_floor_delay: Duration,
    hold: Duration,
    pause: Duration,
    repeat: bool,
) {
    let mut floors = inventory.floors_descending();
    if floors.is_empty() {
        stop.notified().await;
        return;
    }
    if direction == Direction::Up {
        floors.reverse();
    }

    loop {
        if !running.load(Ordering::Relaxed) {
            return;
        }

        for &floor in &floors {
            let fixtures = fixtures_on_floor(inventory, floor);
            if !emit_all(transport, fade_packets(&fixtures, (0, 0, 0), color, fade_ms), running).await
            {
                return;
            }
            if !sleep_or_stop(inter_floor_delay, stop).await {
                return;
            }
        }

        if !sleep_or_stop(hold, stop).await {
            return;
        }

        for &floor in floors.iter().rev() {
            let fixtures = fixtures_on_floor(inventory, floor);
            if !emit_all(transport, fade_packets(&fixtures, color, (0, 0, 0), fade_ms), running).await
            {
                return;
            }
            if !sleep_or_stop(inter_floor_delay, stop).await {
                return;
            }
        }

        if !repeat {
            running.store(false, Ordering::SeqCst);
            return;
        }
        if !sleep_or_stop(pause, stop).await {
            return;
        }
    }
}

async fn run_chase(
    inventory: &Arc<dyn InventoryStore>,
    transport: &TransportHandle,
    running: &AtomicBool,
    stop: &Notify,
    tail_length: usize,
    tick: Duration,
    color: (u8, u8, u8),
) {
    let apartments = inventory.apartments_ordered();
    if apartments.is_empty() || tail_length == 0 {
        stop.notified().await;
        return;
    }
    let len = apartments.len();
    let mut head = 0usize;

    loop {
        if !running.load(Ordering::Relaxed) {
            return;
        }

        let mut packets = Vec::new();
        for (idx, apartment) in apartments.iter().enumerate() {
            let distance = (head + len - idx) % len;
            let brightness = if distance < tail_length {
                (255 - (distance * 255 / tail_length)) as u8
            } else {
                0
            };
            let scaled = scale_rgb(color, brightness);
            for &addr in &apartment.fixtures {
                let command = Command::RgbLevel {
                    r: scaled.0,
                    g: scaled.1,
                    b: scaled.2,
                };
                packets.push((addr, build_packet(addr, &command)));
            }
        }
        if !emit_all(transport, packets, running).await {
            return;
        }
        if !sleep_or_stop(tick, stop).await {
            return;
        }
        head = (head + 1) % len;
    }
}

async fn run_breathe(
    inventory: &Arc<dyn InventoryStore>,
    transport: &TransportHandle,
    running: &AtomicBool,
    stop: &Notify,
    min_intensity: u8,
    max_intensity: u8,
    color: (u8, u8, u8),
    half_period: Duration,
) {
    let fixtures = all_fixtures(inventory);
    if fixtures.is_empty() {
        stop.notified().await;
        return;
    }

    const TICK: Duration = Duration::from_millis(50); // ~20 Hz
    let ticks_per_half = (half_period.as_millis() / TICK.as_millis()).max(1) as u64;
    let span = max_intensity.saturating_sub(min_intensity) as i64;

    let mut tick_index: u64 = 0;
    loop {
        if !running.load(Ordering::Relaxed) {
            return;
        }

        let phase = tick_index % (2 * ticks_per_half);
        let intensity = if phase <= ticks_per_half {
            min_intensity as i64 + span * phase as i64 / ticks_per_half as i64
        } else {
            let down = phase - ticks_per_half;
            max_intensity as i64 - span * down as i64 / ticks_per_half as i64
        };
        let scaled = scale_rgb(color, intensity.clamp(0, 255) as u8);
        if !emit_all(transport, level_packets(&fixtures, scaled), running).await {
            return;
        }
        if !sleep_or_stop(TICK, stop).await {
            return;
        }
        tick_index = tick_index.wrapping_add(1);
    }
}
