//! Read-mostly inventory tables, exposed through a narrow trait so the core
//! never needs to own the storage implementation (`spec.md` §9, "Inventory
//! joins").

use crate::types::{Apartment, ApartmentId, FloorGroup, FloorGroupId, State};
use ahash::AHashMap;
use std::sync::RwLock;

/// Read interface the resolver and session controller consume. Kept narrow
/// on purpose: everything here is either a lookup or the one mutation the
/// resolver performs (persisting an apartment's last-applied state).
pub trait InventoryStore: Send + Sync {
    fn apartment(&self, id: &ApartmentId) -> Option<Apartment>;
    fn floor_group(&self, id: &FloorGroupId) -> Option<FloorGroup>;
    fn apartments_in_group(&self, id: &FloorGroupId) -> Vec<Apartment>;
    /// Distinct floor numbers with at least one apartment, highest first —
    /// the order the session controller's login fade-down walks.
    fn floors_descending(&self) -> Vec<u16>;
    fn apartments_on_floor(&self, floor: u16) -> Vec<Apartment>;
    fn set_persisted_state(&self, id: &ApartmentId, state: State);
    /// Every apartment in a stable order (floor descending, then id), used
    /// by the animation engine's chase sequence to walk a flat fixture list.
    fn apartments_ordered(&self) -> Vec<Apartment> {
        let mut all: Vec<Apartment> = self
            .floors_descending()
            .into_iter()
            .flat_map(|floor| self.apartments_on_floor(floor))
            .collect();
        all.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        all.sort_by(|a, b| b.floor.cmp(&a.floor));
        all
    }
}

/// A plain in-process inventory, populated once at startup. The file-based
/// import described in `spec.md` §1 is an external collaborator; this type
/// is the read/write surface it (or a test) populates through.
#[derive(Default)]
pub struct InMemoryInventory {
    apartments: RwLock<AHashMap<ApartmentId, Apartment>>,
    floor_groups: RwLock<AHashMap<FloorGroupId, FloorGroup>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_floor_group(&self, group: FloorGroup) {
        self.floor_groups
            .write()
            .expect("floor group table poisoned")
            .insert(group.id.clone(), group);
    }

    pub fn insert_apartment(&self, apartment: Apartment) {
        self.apartments
            .write()
            .expect("apartment table poisoned")
            .insert(apartment.id.clone(), apartment);
    }
}

impl InventoryStore for InMemoryInventory {
    fn apartment(&self, id: &ApartmentId) -> Option<Apartment> {
        self.apartments
            .read()
            .expect("apartment table poisoned")
            .get(id)
            .cloned()
    }

    fn floor_group(&self, id: &FloorGroupId) -> Option<FloorGroup> {
        self.floor_groups
            .read()
            .expect("floor group table poisoned")
            .get(id)
            .cloned()
    }

    fn apartments_in_group(&self, id: &FloorGroupId) -> Vec<Apartment> {
        self.apartments
            .read()
            .expect("apartment table poisoned")
            .values()
            .filter(|apt| &apt.floor_group == id)
            .cloned()
            .collect()
    }

    fn floors_descending(&self) -> Vec<u16> {
        let apartments = self.apartments.read().expect("apartment table poisoned");
        let mut floors: Vec<u16> = apartments.values().map(|apt| apt.floor).collect();
        floors.sort_unstable();
        floors.dedup();
        floors.reverse();
        floors
    }

    fn apartments_on_floor(&self, floor: u16) -> Vec<Apartment> {
        self.apartments
            .read()
            .expect("apartment table poisoned")
            .values()
            .filter(|apt| apt.floor == floor)
            .cloned()
            .collect()
    }

    fn set_persisted_state(&self, id: &ApartmentId, state: State) {
        if let Some(apt) = self
            .apartments
            .write()
            .expect("apartment table poisoned")
            .get_mut(id)
        {
            apt.persisted_state = Some(state);
        }
    }
}
