//! XOR checksum over pre-framing payload bytes.

/// XOR every byte of `payload`, reduced to 8 bits.
pub fn compute(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Split `pre_framing` (payload followed by its checksum byte) back into
/// `(payload, checksum_ok)`. `pre_framing` must be non-empty; the last byte
/// is taken as the claimed checksum and compared against the XOR of
/// everything before it.
pub fn verify(pre_framing: &[u8]) -> Option<(&[u8], bool)> {
    let (&claimed, payload) = pre_framing.split_last()?;
    let ok = compute(payload) == claimed;
    Some((payload, ok))
}

/// Append the computed checksum to `payload`, producing the pre-framing
/// byte sequence ready for [`crate::frame::encode`].
pub fn append(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.extend_from_slice(payload);
    out.push(compute(payload));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_is_xor_of_all_bytes() {
        let payload = [0x00, 0x64, 0x2C, 0xFF, 0x80, 0x40];
        assert_eq!(compute(&payload), 0x17);
    }

    #[test]
    fn append_then_verify_round_trips() {
        let payload = [0x00, 0x05, 0x20];
        let framed = append(&payload);
        let (recovered, ok) = verify(&framed).unwrap();
        assert!(ok);
        assert_eq!(recovered, &payload);
    }

    #[test]
    fn verify_detects_corruption() {
        let payload = [0x00, 0x05, 0x20];
        let mut framed = append(&payload);
        *framed.last_mut().unwrap() ^= 0xFF;
        let (_, ok) = verify(&framed).unwrap();
        assert!(!ok);
    }

    #[test]
    fn verify_rejects_empty_input() {
        assert!(verify(&[]).is_none());
    }
}
