//! Facade aggregating every core component into the external request
//! surface from `spec.md` §6.

use crate::entity::EntityKind;
use crate::error::LumenError;
use crate::status::Status;
use lumen_animation::Sequence;
use lumen_codec::{build_packet, decode_frame, frame, plan, plan_rgb, Address, ChannelFade, Command};
use lumen_inventory::{ApartmentId, FloorGroupId, InventoryStore, State};
use lumen_resolver::{BatchOutcome, Intent, Overrides, Resolver};
use lumen_session::SessionController;
use lumen_simulator::Simulator;
use lumen_transport::TransportHandle;
use std::sync::Arc;

pub struct LumenModel {
    inventory: Arc<dyn InventoryStore>,
    transport: TransportHandle,
    resolver: Resolver,
    session: SessionController,
    simulator: Simulator,
    default_fade_ms: u32,
}

impl LumenModel {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        transport: TransportHandle,
        resolver: Resolver,
        session: SessionController,
        simulator: Simulator,
        default_fade_ms: u32,
    ) -> Self {
        LumenModel {
            inventory,
            transport,
            resolver,
            session,
            simulator,
            default_fade_ms,
        }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    fn parse_fixture_addr(id: &str) -> Result<Address, LumenError> {
        id.parse::<u16>()
            .map(Address::new)
            .map_err(|_| LumenError::BadRange)
    }

    /// `light_entity(kind, id, state, intensity?, fade_ms?, rgb?)`.
    pub async fn light_entity(
        &self,
        kind: EntityKind,
        id: &str,
        state: &str,
        intensity: Option<u8>,
        fade_ms: Option<u32>,
        rgb: Option<(u8, u8, u8)>,
    ) -> Result<(), LumenError> {
        let state: State = state.parse().map_err(LumenError::from)?;
        let overrides = Overrides {
            intensity,
            fade_ms,
            rgb,
        };

        match kind {
            EntityKind::Apartment => {
                self.resolver
                    .apply(Intent::LightApartment {
                        id: ApartmentId::from(id),
                        state,
                        overrides,
                    })
                    .await
                    .map_err(LumenError::from)
            }
            EntityKind::FloorGroup => self
                .resolver
                .apply(Intent::LightFloorGroup {
                    id: FloorGroupId::from(id),
                    state,
                    overrides,
                })
                .await
                .map_err(LumenError::from),
            EntityKind::Fixture => {
                let addr = Self::parse_fixture_addr(id)?;
                self.light_fixture(addr, state, overrides).await
            }
        }
    }

    async fn light_fixture(
        &self,
        addr: Address,
        state: State,
        overrides: Overrides,
    ) -> Result<(), LumenError> {
        let defaults = state.default_tuple();
        let color = overrides.rgb.unwrap_or(defaults.rgb);
        let intensity = overrides.intensity.unwrap_or(defaults.intensity);
        let scale = |c: u8| ((c as u16) * (intensity as u16) / 255) as u8;
        let scaled = (scale(color.0), scale(color.1), scale(color.2));
        let fade_ms = overrides.fade_ms.unwrap_or(self.default_fade_ms);

        let command = if fade_ms > 0 {
            let plans = plan_rgb((0, 0, 0), scaled, fade_ms);
            Command::RgbFade([
                ChannelFade::new(scaled.0, plans[0].interval, plans[0].step),
                ChannelFade::new(scaled.1, plans[1].interval, plans[1].step),
                ChannelFade::new(scaled.2, plans[2].interval, plans[2].step),
            ])
        } else {
            Command::RgbLevel {
                r: scaled.0,
                g: scaled.1,
                b: scaled.2,
            }
        };
        self.transport
            .enqueue(addr, build_packet(addr, &command))
            .await
            .map_err(LumenError::from)
    }

    /// `light_batch(items)`: a list of (apartment id, state, overrides),
    /// resolved per item without aborting on individual failure.
    pub async fn light_batch(
        &self,
        items: Vec<(String, String, Overrides)>,
    ) -> Result<Vec<BatchOutcome>, LumenError> {
        let mut resolved = Vec::with_capacity(items.len());
        for (id, state, overrides) in items {
            let state: State = state.parse().map_err(LumenError::from)?;
            resolved.push((ApartmentId::from(id.as_str()), state, overrides));
        }
        Ok(self.resolver.light_batch(resolved).await)
    }

    /// `off_entity(kind, id)`.
    pub async fn off_entity(&self, kind: EntityKind, id: &str) -> Result<(), LumenError> {
        match kind {
            EntityKind::Apartment => self
                .resolver
                .apply(Intent::OffApartment {
                    id: ApartmentId::from(id),
                })
                .await
                .map_err(LumenError::from),
            EntityKind::FloorGroup => {
                let apartments = self.inventory.apartments_in_group(&FloorGroupId::from(id));
                if apartments.is_empty() {
                    return Err(LumenError::NotFound);
                }
                for apartment in apartments {
                    self.resolver
                        .apply(Intent::OffApartment { id: apartment.id })
                        .await
                        .map_err(LumenError::from)?;
                }
                Ok(())
            }
            EntityKind::Fixture => {
                let addr = Self::parse_fixture_addr(id)?;
                let fade = plan(255, 0, self.default_fade_ms);
                let command = Command::Fade {
                    level: 0,
                    interval: fade.interval,
                    step: fade.step,
                };
                self.transport
                    .enqueue(addr, build_packet(addr, &command))
                    .await
                    .map_err(LumenError::from)
            }
        }
    }

    pub async fn off_all(&self) -> Result<(), LumenError> {
        self.resolver.apply(Intent::OffAll).await.map_err(LumenError::from)
    }

    pub async fn on_all(&self, intensity: Option<u8>) -> Result<(), LumenError> {
        self.resolver
            .apply(Intent::OnAll { intensity })
            .await
            .map_err(LumenError::from)
    }

    pub async fn login(&self, agent: impl Into<String>) -> Result<(), LumenError> {
        self.session.login(agent).await.map_err(LumenError::from)
    }

    pub async fn logout(&self, agent: impl Into<String>) -> Result<(), LumenError> {
        self.session.logout(agent).await.map_err(LumenError::from)
    }

    /// `send_raw_frame`: enqueue an already-encoded wire packet verbatim.
    /// The destination address used for telemetry/events is recovered by
    /// decoding the frame first; a truncated frame or one that fails its
    /// checksum is reported rather than silently enqueued (`spec.md` §7,
    /// "decode errors on the diagnostic path are reported but never crash
    /// the process").
    pub async fn send_raw_frame(&self, bytes: Vec<u8>) -> Result<(), LumenError> {
        let raw = frame::decode_all(&bytes);
        let raw = raw.first().ok_or(LumenError::DecodeTruncated)?;
        let decoded = decode_frame(raw).map_err(LumenError::from)?;
        if !decoded.checksum_ok {
            return Err(LumenError::DecodeBadChecksum);
        }
        self.transport
            .enqueue(decoded.addr, bytes)
            .await
            .map_err(LumenError::from)
    }

    pub fn query_status(&self) -> Status {
        Status {
            transport: self.transport.query_status(),
            session_active: self.session.is_active(),
            animation_running: self.session.animation().is_running(),
        }
    }

    /// Start the configured ambient sequence directly (used at boot, before
    /// any client has logged in — the session controller otherwise only
    /// starts ambient on logout).
    pub fn start_ambient(&self, sequence_id: &str) -> bool {
        match Sequence::by_id(sequence_id) {
            Some(sequence) => self.session.animation().start(sequence),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_codec::Address;
    use lumen_events::EventBus;
    use lumen_inventory::{Apartment, FloorGroup, FloorGroupId, InMemoryInventory};
    use lumen_transport::{spawn, SimulationOpener};
    use std::time::Duration;

    fn fixture_model() -> LumenModel {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.insert_floor_group(FloorGroup {
            id: FloorGroupId::from("floor-9"),
            floor: 9,
            tower: "A".into(),
        });
        inventory.insert_apartment(Apartment::new(
            "A-901",
            9,
            "floor-9",
            1,
            vec![Address::new(1)],
        ));

        let events = EventBus::new(64);
        let (transport, _join) = spawn(Arc::new(SimulationOpener), true, events.clone());
        let resolver = Resolver::new(inventory.clone(), transport.clone(), 255, 1000);
        let session = SessionController::new(
            inventory.clone(),
            transport.clone(),
            events.clone(),
            Duration::from_millis(1),
            false,
            None,
        );
        let simulator = Simulator::new();
        simulator.spawn(&events);

        LumenModel::new(inventory, transport, resolver, session, simulator, 1000)
    }

    #[tokio::test]
    async fn light_entity_rejects_unknown_state() {
        let model = fixture_model();
        let result = model
            .light_entity(EntityKind::Apartment, "A-901", "LEASED", None, None, None)
            .await;
        assert!(matches!(result, Err(LumenError::BadState)));
    }

    #[tokio::test]
    async fn light_entity_apartment_reaches_simulator() {
        let model = fixture_model();
        model
            .light_entity(EntityKind::Apartment, "A-901", "SOLD", None, Some(0), None)
            .await
            .unwrap();
        tokio::task::yield_now().await;
        let state = model.simulator().fixture(Address::new(1)).unwrap();
        assert!(state.on);
    }

    #[tokio::test]
    async fn light_entity_fixture_bypasses_inventory() {
        let model = fixture_model();
        model
            .light_entity(EntityKind::Fixture, "42", "SOLD", None, Some(0), None)
            .await
            .unwrap();
        tokio::task::yield_now().await;
        assert!(model.simulator().fixture(Address::new(42)).unwrap().on);
    }

    #[tokio::test]
    async fn off_entity_floor_group_not_found() {
        let model = fixture_model();
        let result = model.off_entity(EntityKind::FloorGroup, "no-such-group").await;
        assert!(matches!(result, Err(LumenError::NotFound)));
    }

    #[tokio::test]
    async fn login_then_logout_round_trips() {
        let model = fixture_model();
        model.login("agent-1").await.unwrap();
        assert!(model.query_status().session_active);
        model.logout("agent-1").await.unwrap();
        assert!(!model.query_status().session_active);
    }

    #[tokio::test]
    async fn send_raw_frame_reaches_transport() {
        let model = fixture_model();
        let packet = build_packet(Address::new(7), &Command::On);
        model.send_raw_frame(packet).await.unwrap();
        tokio::task::yield_now().await;
        assert!(model.simulator().fixture(Address::new(7)).unwrap().on);
    }

    #[tokio::test]
    async fn send_raw_frame_reports_bad_checksum() {
        let model = fixture_model();
        let mut packet = build_packet(Address::new(7), &Command::On);
        let checksum_idx = packet.len() - 2;
        packet[checksum_idx] ^= 0xFF;
        let result = model.send_raw_frame(packet).await;
        assert!(matches!(result, Err(LumenError::DecodeBadChecksum)));
    }

    #[tokio::test]
    async fn send_raw_frame_reports_truncated_frame() {
        let model = fixture_model();
        let result = model.send_raw_frame(vec![0xC0, 0xC0]).await;
        assert!(matches!(result, Err(LumenError::DecodeTruncated)));
    }
}
