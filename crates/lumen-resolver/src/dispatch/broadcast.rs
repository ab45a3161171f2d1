use lumen_codec::{build_packet, Address, Command};

/// A single `OFF` packet addressed to the bus-wide broadcast address.
pub fn build_off_all() -> (Address, Vec<u8>) {
    let addr = Address::BROADCAST;
    (addr, build_packet(addr, &Command::Off))
}

/// A single `LEVEL` packet addressed to the bus-wide broadcast address.
pub fn build_on_all(intensity: u8) -> (Address, Vec<u8>) {
    let addr = Address::BROADCAST;
    (addr, build_packet(addr, &Command::Level(intensity)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_all_targets_broadcast_address() {
        let (addr, bytes) = build_off_all();
        assert_eq!(addr, Address::BROADCAST);
        assert_eq!(bytes[3], 0x21);
    }

    #[test]
    fn on_all_targets_broadcast_address_with_level() {
        let (addr, bytes) = build_on_all(200);
        assert_eq!(addr, Address::BROADCAST);
        assert_eq!(bytes[3], 0x22);
        assert_eq!(bytes[4], 200);
    }
}
