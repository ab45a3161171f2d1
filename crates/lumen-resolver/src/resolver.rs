use crate::dispatch::{broadcast, light, off};
use crate::error::ResolveError;
use crate::intent::{Intent, Overrides};
use crate::lastlevel::{AssumeZero, LastLevelSource};
use lumen_inventory::{ApartmentId, InventoryStore, State};
use lumen_transport::TransportHandle;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Orchestrates intent resolution: looks entities up in the inventory, hands
/// them to the pure `dispatch` functions, and enqueues the resulting packets
/// onto the transport in order. State is only persisted back to the
/// inventory once every packet for an intent has been successfully enqueued,
/// so a partial failure never leaves the inventory claiming a state the bus
/// never actually reached (`spec.md` §7).
pub struct Resolver {
    inventory: Arc<dyn InventoryStore>,
    transport: TransportHandle,
    default_intensity: u8,
    default_fade_ms: u32,
    last_level: Arc<dyn LastLevelSource>,
}

/// Per-item outcome of a batch light operation; the batch itself never
/// aborts early on a single item's failure.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub id: ApartmentId,
    pub result: Result<(), ResolveError>,
}

impl Resolver {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        transport: TransportHandle,
        default_intensity: u8,
        default_fade_ms: u32,
    ) -> Self {
        Resolver {
            inventory,
            transport,
            default_intensity,
            default_fade_ms,
            last_level: Arc::new(AssumeZero),
        }
    }

    pub fn with_last_level_source(mut self, source: Arc<dyn LastLevelSource>) -> Self {
        self.last_level = source;
        self
    }

    async fn enqueue_all(&self, packets: Vec<(lumen_codec::Address, Vec<u8>)>) -> Result<(), ResolveError> {
        for (addr, packet) in packets {
            self.transport.enqueue(addr, packet).await?;
        }
        Ok(())
    }

    #[instrument(skip(self, overrides))]
    async fn light_one(
        &self,
        id: &ApartmentId,
        state: State,
        overrides: Overrides,
    ) -> Result<(), ResolveError> {
        let apartment = self.inventory.apartment(id).ok_or(ResolveError::NotFound)?;
        let packets = light::build_apartment_packets(
            &apartment,
            state,
            &overrides,
            self.default_fade_ms,
            self.last_level.as_ref(),
        )?;
        self.enqueue_all(packets).await?;
        self.inventory.set_persisted_state(id, state);
        Ok(())
    }

    /// Apply an [`Intent`], enqueueing every packet it expands to. For
    /// [`Intent::Batch`] this still runs item-by-item (use
    /// [`Resolver::light_batch`] directly when per-item failures must not
    /// abort the rest).
    pub async fn apply(&self, intent: Intent) -> Result<(), ResolveError> {
        match intent {
            Intent::LightApartment {
                id,
                state,
                overrides,
            } => self.light_one(&id, state, overrides).await,
            Intent::LightFloorGroup {
                id,
                state,
                overrides,
            } => {
                let apartments = self.inventory.apartments_in_group(&id);
                if apartments.is_empty() {
                    return Err(ResolveError::NotFound);
                }
                for apartment in &apartments {
                    let packets = light::build_apartment_packets(
                        apartment,
                        state,
                        &overrides,
                        self.default_fade_ms,
                        self.last_level.as_ref(),
                    )?;
                    self.enqueue_all(packets).await?;
                }
                for apartment in &apartments {
                    self.inventory.set_persisted_state(&apartment.id, state);
                }
                Ok(())
            }
            Intent::Batch(items) => {
                let outcomes = self.light_batch(items).await;
                outcomes
                    .into_iter()
                    .find_map(|outcome| outcome.result.err())
                    .map_or(Ok(()), Err)
            }
            Intent::OffApartment { id } => {
                let apartment = self.inventory.apartment(&id).ok_or(ResolveError::NotFound)?;
                let packets =
                    off::build_off_packets(&apartment, self.default_fade_ms, self.last_level.as_ref())?;
                self.enqueue_all(packets).await?;
                self.inventory.set_persisted_state(&id, State::Off);
                Ok(())
            }
            Intent::OffAll => {
                let (addr, packet) = broadcast::build_off_all();
                self.transport.enqueue(addr, packet).await?;
                Ok(())
            }
            Intent::OnAll { intensity } => {
                let (addr, packet) =
                    broadcast::build_on_all(intensity.unwrap_or(self.default_intensity));
                self.transport.enqueue(addr, packet).await?;
                Ok(())
            }
        }
    }

    /// Light every item in a batch independently; one item's failure never
    /// stops the rest from being attempted (`spec.md` §4.5, "batch requests
    /// are best-effort per item").
    pub async fn light_batch(
        &self,
        items: Vec<(ApartmentId, State, Overrides)>,
    ) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(items.len());
        for (id, state, overrides) in items {
            let result = self.light_one(&id, state, overrides).await;
            if let Err(ref err) = result {
                warn!(apartment = %id, error = %err, "batch item failed");
            }
            outcomes.push(BatchOutcome { id, result });
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_codec::Address;
    use lumen_events::EventBus;
    use lumen_inventory::{FloorGroup, FloorGroupId, InMemoryInventory};
    use lumen_transport::{spawn, SimulationOpener};

    fn fixture_resolver() -> (Resolver, InventoryHandle) {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.insert_floor_group(FloorGroup {
            id: FloorGroupId::from("floor-9"),
            floor: 9,
            tower: "A".into(),
        });
        inventory.insert_apartment(lumen_inventory::Apartment::new(
            "A-901",
            9,
            "floor-9",
            1,
            vec![Address::new(1)],
        ));
        inventory.insert_apartment(lumen_inventory::Apartment::new(
            "A-902",
            9,
            "floor-9",
            2,
            vec![],
        ));

        let events = EventBus::new(64);
        let (transport, _join) = spawn(Arc::new(SimulationOpener), true, events);
        let resolver = Resolver::new(inventory.clone(), transport, 255, 1000);
        (resolver, InventoryHandle(inventory))
    }

    struct InventoryHandle(Arc<InMemoryInventory>);

    #[tokio::test]
    async fn light_apartment_persists_state_on_success() {
        let (resolver, inventory) = fixture_resolver();
        resolver
            .apply(Intent::LightApartment {
                id: ApartmentId::from("A-901"),
                state: State::Sold,
                overrides: Overrides::default(),
            })
            .await
            .unwrap();
        let apt = inventory.0.apartment(&ApartmentId::from("A-901")).unwrap();
        assert_eq!(apt.persisted_state, Some(State::Sold));
    }

    #[tokio::test]
    async fn light_apartment_with_no_fixtures_does_not_persist() {
        let (resolver, inventory) = fixture_resolver();
        let result = resolver
            .apply(Intent::LightApartment {
                id: ApartmentId::from("A-902"),
                state: State::Sold,
                overrides: Overrides::default(),
            })
            .await;
        assert!(matches!(result, Err(ResolveError::NoAddresses)));
        let apt = inventory.0.apartment(&ApartmentId::from("A-902")).unwrap();
        assert_eq!(apt.persisted_state, None);
    }

    #[tokio::test]
    async fn unknown_apartment_is_not_found() {
        let (resolver, _inventory) = fixture_resolver();
        let result = resolver
            .apply(Intent::LightApartment {
                id: ApartmentId::from("nope"),
                state: State::Sold,
                overrides: Overrides::default(),
            })
            .await;
        assert!(matches!(result, Err(ResolveError::NotFound)));
    }

    #[tokio::test]
    async fn batch_collects_per_item_outcomes_without_aborting() {
        let (resolver, _inventory) = fixture_resolver();
        let outcomes = resolver
            .light_batch(vec![
                (ApartmentId::from("A-901"), State::Sold, Overrides::default()),
                (ApartmentId::from("A-902"), State::Sold, Overrides::default()),
                (ApartmentId::from("nope"), State::Sold, Overrides::default()),
            ])
            .await;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].result.is_ok());
        assert!(matches!(outcomes[1].result, Err(ResolveError::NoAddresses)));
        assert!(matches!(outcomes[2].result, Err(ResolveError::NotFound)));
    }

    #[tokio::test]
    async fn off_all_reaches_transport() {
        let (resolver, _inventory) = fixture_resolver();
        resolver.apply(Intent::OffAll).await.unwrap();
    }
}
