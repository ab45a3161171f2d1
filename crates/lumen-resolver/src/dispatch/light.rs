use crate::error::ResolveError;
use crate::intent::Overrides;
use crate::lastlevel::LastLevelSource;
use lumen_codec::{build_packet, plan_rgb, Address, ChannelFade, Command};
use lumen_inventory::{Apartment, State};

fn scale_channel(channel: u8, intensity: u8) -> u8 {
    ((channel as u16) * (intensity as u16) / 255) as u8
}

/// Expand "light this apartment" into one packet per associated fixture.
/// Pure: takes an already-looked-up [`Apartment`] and returns the packets
/// to enqueue, or [`ResolveError::NoAddresses`] if it has none.
pub fn build_apartment_packets(
    apartment: &Apartment,
    state: State,
    overrides: &Overrides,
    default_fade_ms: u32,
    last_level: &dyn LastLevelSource,
) -> Result<Vec<(Address, Vec<u8>)>, ResolveError> {
    if apartment.fixtures.is_empty() {
        return Err(ResolveError::NoAddresses);
    }

    let defaults = state.default_tuple();
    let color = overrides.rgb.unwrap_or(defaults.rgb);
    let intensity = overrides.intensity.unwrap_or(defaults.intensity);
    let scaled = (
        scale_channel(color.0, intensity),
        scale_channel(color.1, intensity),
        scale_channel(color.2, intensity),
    );
    let fade_ms = overrides.fade_ms.unwrap_or(default_fade_ms);

    let mut packets = Vec::with_capacity(apartment.fixtures.len());
    for &addr in &apartment.fixtures {
        let command = if fade_ms > 0 {
            let start = last_level.last_rgb(addr);
            let plans = plan_rgb(start, scaled, fade_ms);
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
        packets.push((addr, build_packet(addr, &command)));
    }
    Ok(packets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lastlevel::AssumeZero;
    use lumen_codec::Address;

    fn apartment_with(fixtures: Vec<Address>) -> Apartment {
        Apartment::new("A-1", 9, "floor-9", 1, fixtures)
    }

    #[test]
    fn no_fixtures_is_an_error() {
        let apt = apartment_with(vec![]);
        let result = build_apartment_packets(
            &apt,
            State::Available,
            &Overrides::default(),
            1000,
            &AssumeZero,
        );
        assert!(matches!(result, Err(ResolveError::NoAddresses)));
    }

    #[test]
    fn one_packet_per_fixture() {
        let apt = apartment_with(vec![Address::new(1), Address::new(2)]);
        let packets = build_apartment_packets(
            &apt,
            State::Available,
            &Overrides::default(),
            1000,
            &AssumeZero,
        )
        .unwrap();
        assert_eq!(packets.len(), 2);
    }

    #[test]
    fn zero_fade_uses_rgb_level_not_rgb_fade() {
        let apt = apartment_with(vec![Address::new(1)]);
        let overrides = Overrides {
            fade_ms: Some(0),
            ..Default::default()
        };
        let packets =
            build_apartment_packets(&apt, State::Sold, &overrides, 1000, &AssumeZero).unwrap();
        // RGB_LEVEL opcode is 0x2C; the packet's 4th byte (after addr hi/lo + opcode marker) is it.
        assert_eq!(packets[0].1[3], 0x2C);
    }

    #[test]
    fn positive_fade_uses_rgb_fade_opcode() {
        let apt = apartment_with(vec![Address::new(1)]);
        let packets = build_apartment_packets(
            &apt,
            State::Sold,
            &Overrides::default(),
            1000,
            &AssumeZero,
        )
        .unwrap();
        assert_eq!(packets[0].1[3], 0x31);
    }

    #[test]
    fn rgb_override_replaces_state_default_color() {
        let apt = apartment_with(vec![Address::new(1)]);
        let overrides = Overrides {
            rgb: Some((10, 20, 30)),
            fade_ms: Some(0),
            intensity: Some(255),
        };
        let packets =
            build_apartment_packets(&apt, State::Off, &overrides, 1000, &AssumeZero).unwrap();
        assert_eq!(&packets[0].1[4..7], &[10, 20, 30]);
    }
}
