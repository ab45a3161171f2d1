use crate::error::ResolveError;
use crate::lastlevel::LastLevelSource;
use lumen_codec::{build_packet, plan, Address, Command};
use lumen_inventory::Apartment;

/// Expand "turn this apartment off" into one `FADE`-to-zero packet per
/// fixture, planned from whatever the last-level source reports (the
/// documented default assumes zero, which degenerates the plan to a no-op
/// `(1, 1)` fade — see [`crate::lastlevel::AssumeZero`]).
pub fn build_off_packets(
    apartment: &Apartment,
    default_fade_ms: u32,
    last_level: &dyn LastLevelSource,
) -> Result<Vec<(Address, Vec<u8>)>, ResolveError> {
    if apartment.fixtures.is_empty() {
        return Err(ResolveError::NoAddresses);
    }

    let mut packets = Vec::with_capacity(apartment.fixtures.len());
    for &addr in &apartment.fixtures {
        let start = last_level.last_level(addr);
        let fade = plan(start, 0, default_fade_ms);
        let command = Command::Fade {
            level: 0,
            interval: fade.interval,
            step: fade.step,
        };
        packets.push((addr, build_packet(addr, &command)));
    }
    Ok(packets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lastlevel::AssumeZero;

    #[test]
    fn no_fixtures_is_an_error() {
        let apt = Apartment::new("A-1", 9, "floor-9", 1, vec![]);
        let result = build_off_packets(&apt, 1000, &AssumeZero);
        assert!(matches!(result, Err(ResolveError::NoAddresses)));
    }

    #[test]
    fn emits_fade_opcode_per_fixture() {
        let apt = Apartment::new(
            "A-1",
            9,
            "floor-9",
            1,
            vec![Address::new(1), Address::new(2)],
        );
        let packets = build_off_packets(&apt, 1000, &AssumeZero).unwrap();
        assert_eq!(packets.len(), 2);
        for (_, bytes) in &packets {
            assert_eq!(bytes[3], 0x23);
        }
    }
}
