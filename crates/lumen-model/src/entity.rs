/// The kinds of entity `light_entity`/`off_entity` can target (`spec.md`
/// §6's external request surface table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Apartment,
    FloorGroup,
    /// A raw fixture address, bypassing the apartment/floor-group
    /// abstraction entirely — there is no resolver table join involved.
    Fixture,
}
