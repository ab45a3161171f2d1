//! Two-state session machine (`spec.md` §4.6): idle ↔ active, toggled by
//! external login/logout calls. This is the only component allowed to
//! start or stop [`AnimationEngine`] during normal operation.

use crate::error::SessionError;
use lumen_animation::{AnimationEngine, Sequence};
use lumen_codec::{build_packet, plan, Command};
use lumen_events::{EventBus, SessionEvent};
use lumen_inventory::InventoryStore;
use lumen_transport::TransportHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Fade-out duration used for the login fade-down's per-fixture `FADE`
/// packets; assumes the fixture was at full brightness beforehand, matching
/// the resolver's documented "assume the opposite extreme" convention for
/// fades that have no level feedback to start from.
const LOGIN_FADE_MS: u32 = 500;

pub struct SessionController {
    inventory: Arc<dyn InventoryStore>,
    transport: TransportHandle,
    events: EventBus,
    animation: AnimationEngine,
    active: Arc<AtomicBool>,
    inter_floor_delay: Duration,
    ambient_enabled: bool,
    ambient_sequence_id: Option<String>,
}

impl SessionController {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        transport: TransportHandle,
        events: EventBus,
        inter_floor_delay: Duration,
        ambient_enabled: bool,
        ambient_sequence_id: Option<String>,
    ) -> Self {
        let active = Arc::new(AtomicBool::new(false));
        let animation = AnimationEngine::new(inventory.clone(), transport.clone(), active.clone());
        SessionController {
            inventory,
            transport,
            events,
            animation,
            active,
            inter_floor_delay,
            ambient_enabled,
            ambient_sequence_id,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub fn animation(&self) -> &AnimationEngine {
        &self.animation
    }

    /// idle → active: cancel any running animation, then run a deterministic
    /// top-to-bottom fade-down. Reports success only once every fixture has
    /// been sent its fade-to-0 packet.
    pub async fn login(&self, agent: impl Into<String>) -> Result<(), SessionError> {
        let agent = agent.into();
        self.active.store(true, Ordering::SeqCst);
        self.animation.stop();

        let mut floors = self.inventory.floors_descending();
        floors.sort_unstable_by(|a, b| b.cmp(a));
        let fade = plan(255, 0, LOGIN_FADE_MS);

        for floor in floors {
            let apartments = self.inventory.apartments_on_floor(floor);
            for apartment in apartments {
                for addr in apartment.fixtures {
                    let command = Command::Fade {
                        level: 0,
                        interval: fade.interval,
                        step: fade.step,
                    };
                    self.transport.enqueue(addr, build_packet(addr, &command)).await?;
                }
            }
            if self.inter_floor_delay > Duration::ZERO {
                tokio::time::sleep(self.inter_floor_delay).await;
            }
        }

        info!(agent = %agent, "session_login");
        self.events.publish_session(SessionEvent::LoggedIn { agent });
        Ok(())
    }

    /// active → idle: resume the configured ambient sequence, if any.
    pub async fn logout(&self, agent: impl Into<String>) -> Result<(), SessionError> {
        let agent = agent.into();
        self.active.store(false, Ordering::SeqCst);

        info!(agent = %agent, "session_logout");
        self.events.publish_session(SessionEvent::LoggedOut { agent });

        if self.ambient_enabled {
            if let Some(sequence) = self
                .ambient_sequence_id
                .as_deref()
                .and_then(Sequence::by_id)
            {
                self.animation.start(sequence);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_codec::Address;
    use lumen_events::recv_frame;
    use lumen_inventory::{Apartment, FloorGroup, FloorGroupId, InMemoryInventory};
    use lumen_transport::{spawn, SimulationOpener};

    fn fixture_inventory() -> Arc<InMemoryInventory> {
        let inv = Arc::new(InMemoryInventory::new());
        inv.insert_floor_group(FloorGroup {
            id: FloorGroupId::from("floor-10"),
            floor: 10,
            tower: "A".into(),
        });
        inv.insert_floor_group(FloorGroup {
            id: FloorGroupId::from("floor-9"),
            floor: 9,
            tower: "A".into(),
        });
        inv.insert_apartment(Apartment::new("A-1001", 10, "floor-10", 1, vec![Address::new(1)]));
        inv.insert_apartment(Apartment::new("A-901", 9, "floor-9", 1, vec![Address::new(2)]));
        inv
    }

    #[tokio::test]
    async fn login_fades_down_highest_floor_first() {
        let inventory = fixture_inventory();
        let events = EventBus::new(64);
        let mut observer = events.subscribe();
        let (transport, _join) = spawn(Arc::new(SimulationOpener), true, events.clone());

        let controller = SessionController::new(
            inventory,
            transport,
            events,
            Duration::from_millis(1),
            false,
            None,
        );

        controller.login("agent-1").await.unwrap();
        assert!(controller.is_active());

        let first = recv_frame(&mut observer).await.unwrap();
        let second = recv_frame(&mut observer).await.unwrap();
        assert_eq!(first.addr, Address::new(1));
        assert_eq!(second.addr, Address::new(2));
    }

    #[tokio::test]
    async fn logout_starts_ambient_when_enabled() {
        let inventory = fixture_inventory();
        let events = EventBus::new(64);
        let (transport, _join) = spawn(Arc::new(SimulationOpener), true, events.clone());

        let controller = SessionController::new(
            inventory,
            transport,
            events,
            Duration::from_millis(1),
            true,
            Some("still-dim".into()),
        );

        controller.logout("agent-1").await.unwrap();
        tokio::task::yield_now().await;
        assert!(!controller.is_active());
        assert!(controller.animation().is_running());
    }

    #[tokio::test]
    async fn logout_stays_idle_when_ambient_disabled() {
        let inventory = fixture_inventory();
        let events = EventBus::new(64);
        let (transport, _join) = spawn(Arc::new(SimulationOpener), true, events.clone());

        let controller = SessionController::new(
            inventory,
            transport,
            events,
            Duration::from_millis(1),
            false,
            None,
        );

        controller.logout("agent-1").await.unwrap();
        assert!(!controller.animation().is_running());
    }
}
