//! Core entity types (`spec.md` §3): fixture addressing is reused from
//! `lumen-codec`; everything else — apartments, floor groups, and the
//! closed state enumeration — lives here.

use lumen_codec::Address;
use std::fmt;
use std::str::FromStr;

/// Stable string identifier for an apartment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApartmentId(pub String);

impl fmt::Display for ApartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ApartmentId {
    fn from(s: &str) -> Self {
        ApartmentId(s.to_string())
    }
}

/// Stable string identifier for a floor group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FloorGroupId(pub String);

impl fmt::Display for FloorGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FloorGroupId {
    fn from(s: &str) -> Self {
        FloorGroupId(s.to_string())
    }
}

/// The closed set of lighting states. Unknown strings are rejected at the
/// API boundary via [`State::from_str`] / [`TryFrom<&str>`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Available,
    Sold,
    Reserved,
    Unavailable,
    Selected,
    Off,
}

/// Default `(r, g, b, intensity)` tuple and human description for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDefault {
    pub rgb: (u8, u8, u8),
    pub intensity: u8,
    pub description: &'static str,
}

impl State {
    pub const ALL: [State; 6] = [
        State::Available,
        State::Sold,
        State::Reserved,
        State::Unavailable,
        State::Selected,
        State::Off,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            State::Available => "AVAILABLE",
            State::Sold => "SOLD",
            State::Reserved => "RESERVED",
            State::Unavailable => "UNAVAILABLE",
            State::Selected => "SELECTED",
            State::Off => "OFF",
        }
    }

    /// Default color + intensity + human description for this state.
    pub fn default_tuple(self) -> StateDefault {
        match self {
            State::Available => StateDefault {
                rgb: (0, 255, 0),
                intensity: 255,
                description: "unit available for sale",
            },
            State::Sold => StateDefault {
                rgb: (255, 0, 0),
                intensity: 255,
                description: "unit sold",
            },
            State::Reserved => StateDefault {
                rgb: (255, 165, 0),
                intensity: 200,
                description: "unit under reservation",
            },
            State::Unavailable => StateDefault {
                rgb: (80, 80, 80),
                intensity: 120,
                description: "unit not offered",
            },
            State::Selected => StateDefault {
                rgb: (0, 150, 255),
                intensity: 255,
                description: "unit currently highlighted by a client",
            },
            State::Off => StateDefault {
                rgb: (0, 0, 0),
                intensity: 0,
                description: "unit light disabled",
            },
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown state {0:?}")]
pub struct UnknownState(());

impl FromStr for State {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(State::Available),
            "SOLD" => Ok(State::Sold),
            "RESERVED" => Ok(State::Reserved),
            "UNAVAILABLE" => Ok(State::Unavailable),
            "SELECTED" => Ok(State::Selected),
            "OFF" => Ok(State::Off),
            _ => Err(UnknownState(())),
        }
    }
}

impl TryFrom<&str> for State {
    type Error = UnknownState;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An apartment's fixtures, ordered by light index starting at 1 (index is
/// implied by position: `fixtures[0]` is light 1, the apartment's primary
/// address).
#[derive(Debug, Clone)]
pub struct Apartment {
    pub id: ApartmentId,
    pub floor: u16,
    pub floor_group: FloorGroupId,
    pub unit_position: u16,
    pub fixtures: Vec<Address>,
    pub persisted_state: Option<State>,
}

impl Apartment {
    pub fn new(
        id: impl Into<ApartmentId>,
        floor: u16,
        floor_group: impl Into<FloorGroupId>,
        unit_position: u16,
        fixtures: Vec<Address>,
    ) -> Self {
        Apartment {
            id: id.into(),
            floor,
            floor_group: floor_group.into(),
            unit_position,
            fixtures,
            persisted_state: None,
        }
    }

    /// The lowest-indexed (primary) fixture address, if any are associated.
    pub fn primary_address(&self) -> Option<Address> {
        self.fixtures.first().copied()
    }
}

impl From<String> for ApartmentId {
    fn from(s: String) -> Self {
        ApartmentId(s)
    }
}

impl From<String> for FloorGroupId {
    fn from(s: String) -> Self {
        FloorGroupId(s)
    }
}

/// A floor group: the apartments sharing a floor within a tower.
#[derive(Debug, Clone)]
pub struct FloorGroup {
    pub id: FloorGroupId,
    pub floor: u16,
    pub tower: String,
}
