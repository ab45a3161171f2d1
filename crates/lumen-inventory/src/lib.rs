//! Read-mostly inventory tables and configuration (`spec.md` §3, §6).

pub mod config;
pub mod store;
pub mod types;

pub use config::{ConfigFile, ConfigKey};
pub use store::{InMemoryInventory, InventoryStore};
pub use types::{Apartment, ApartmentId, FloorGroup, FloorGroupId, State, StateDefault, UnknownState};
