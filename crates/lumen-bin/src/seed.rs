//! Hardcoded demo inventory. File-based apartment import is an external
//! collaborator (`spec.md` §1); this crate only needs something to light
//! up when run standalone, so it seeds a small building by hand, the same
//! shape the core crates' own fixture builders use in their tests.

use lumen_codec::Address;
use lumen_inventory::{Apartment, FloorGroup, FloorGroupId, InMemoryInventory};

pub fn demo_building() -> InMemoryInventory {
    let inventory = InMemoryInventory::new();

    let floors: [(u16, &str, &[(&str, u16, &[u16])]); 2] = [
        (
            10,
            "tower-a-floor-10",
            &[("A-1001", 1, &[101]), ("A-1002", 2, &[102, 103])],
        ),
        (9, "tower-a-floor-9", &[("A-901", 1, &[104])]),
    ];

    for (floor, group_id, apartments) in floors {
        inventory.insert_floor_group(FloorGroup {
            id: FloorGroupId::from(group_id),
            floor,
            tower: "A".into(),
        });
        for (id, unit_position, fixtures) in apartments {
            inventory.insert_apartment(Apartment::new(
                *id,
                floor,
                group_id,
                *unit_position,
                fixtures.iter().map(|&addr| Address::new(addr)).collect(),
            ));
        }
    }

    inventory
}
