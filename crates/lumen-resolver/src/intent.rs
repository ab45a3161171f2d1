use lumen_inventory::{ApartmentId, FloorGroupId, State};

/// Per-call overrides layered on top of a state's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    pub intensity: Option<u8>,
    pub fade_ms: Option<u32>,
    pub rgb: Option<(u8, u8, u8)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    LightApartment {
        id: ApartmentId,
        state: State,
        overrides: Overrides,
    },
    LightFloorGroup {
        id: FloorGroupId,
        state: State,
        overrides: Overrides,
    },
    Batch(Vec<(ApartmentId, State, Overrides)>),
    OffApartment {
        id: ApartmentId,
    },
    OffAll,
    OnAll {
        intensity: Option<u8>,
    },
}
