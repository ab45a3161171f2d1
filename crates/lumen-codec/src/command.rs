//! Command opcodes and payload layouts (`spec.md` §4.2).
//!
//! All numeric fields are clamped into their documented ranges before
//! encoding; out-of-range values are coerced rather than rejected, so
//! resolver math (intensity scaling, fade planning) can never fail at the
//! encoder.

use crate::address::Address;
use crate::{checksum, frame};

/// A single RGB channel's planned fade, as produced by [`crate::fade::plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelFade {
    pub level: u8,
    pub interval: u8,
    pub step: u8,
}

impl ChannelFade {
    pub fn new(level: u8, interval: u8, step: u8) -> Self {
        ChannelFade {
            level,
            interval: interval.clamp(1, 255),
            step: step.clamp(1, 127),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    On,
    Off,
    Level(u8),
    Fade {
        level: u8,
        interval: u8,
        step: u8,
    },
    RgbLevel {
        r: u8,
        g: u8,
        b: u8,
    },
    Flash {
        steps: u16,
        interval_a: u16,
        interval_b: u16,
        level_a: u8,
        level_b: u8,
    },
    RgbFade([ChannelFade; 3]),
    PaddSet(Address),
    PaddErase,
}

impl Command {
    pub const fn opcode(&self) -> u8 {
        match self {
            Command::On => 0x20,
            Command::Off => 0x21,
            Command::Level(_) => 0x22,
            Command::Fade { .. } => 0x23,
            Command::RgbLevel { .. } => 0x2C,
            Command::Flash { .. } => 0x2E,
            Command::RgbFade(_) => 0x31,
            Command::PaddSet(_) => 0x25,
            Command::PaddErase => 0x26,
        }
    }

    /// Encode the payload bytes after `addr` + opcode, clamping every field
    /// into its documented range.
    pub fn payload(&self) -> Vec<u8> {
        match *self {
            Command::On | Command::Off | Command::PaddErase => Vec::new(),
            Command::Level(level) => vec![level],
            Command::Fade {
                level,
                interval,
                step,
            } => vec![level, interval.clamp(1, 255), step.clamp(1, 127)],
            Command::RgbLevel { r, g, b } => vec![r, g, b],
            Command::Flash {
                steps,
                interval_a,
                interval_b,
                level_a,
                level_b,
            } => {
                let steps = steps.clamp(2, 65535);
                let interval_a = interval_a.clamp(1, 65535);
                let interval_b = interval_b.clamp(1, 65535);
                let mut out = Vec::with_capacity(8);
                out.extend_from_slice(&steps.to_be_bytes());
                out.extend_from_slice(&interval_a.to_be_bytes());
                out.extend_from_slice(&interval_b.to_be_bytes());
                out.push(level_a);
                out.push(level_b);
                out
            }
            Command::RgbFade(channels) => {
                let mut out = Vec::with_capacity(9);
                for ch in channels {
                    out.push(ch.level);
                    out.push(ch.interval.clamp(1, 255));
                    out.push(ch.step.clamp(1, 127));
                }
                out
            }
            Command::PaddSet(addr) => vec![addr.high(), addr.low()],
        }
    }
}

/// Build the full, checksummed, framed wire packet for `command` directed
/// at `addr`.
pub fn build_packet(addr: Address, command: &Command) -> Vec<u8> {
    let mut payload = Vec::with_capacity(3 + 9);
    payload.push(addr.high());
    payload.push(addr.low());
    payload.push(command.opcode());
    payload.extend(command.payload());

    let pre_framing = checksum::append(&payload);
    frame::encode(&pre_framing)
}

/// Decoded form of a wire packet's address + opcode + raw payload, used for
/// diagnostics and by the simulator. Checksum mismatches are reported but
/// never panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub addr: Address,
    pub opcode: u8,
    pub params: Vec<u8>,
    pub checksum_ok: bool,
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame too short to contain an address and opcode")]
    Truncated,
}

/// Decode one already-unstuffed, checksum-included frame (as produced by
/// [`frame::decode_all`]) into its address, opcode, and remaining params.
pub fn decode_frame(pre_framing: &[u8]) -> Result<DecodedFrame, DecodeError> {
    let (payload, checksum_ok) = checksum::verify(pre_framing).ok_or(DecodeError::Truncated)?;
    if payload.len() < 3 {
        return Err(DecodeError::Truncated);
    }
    let addr = Address::from_bytes(payload[0], payload[1]);
    let opcode = payload[2];
    let params = payload[3..].to_vec();
    Ok(DecodedFrame {
        addr,
        opcode,
        params,
        checksum_ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_packet_for_address_five() {
        let framed = build_packet(Address::new(5), &Command::On);
        assert_eq!(framed, vec![0xC0, 0x00, 0x05, 0x20, 0x25, 0xC0]);
    }

    #[test]
    fn rgb_level_packet_at_address_100() {
        let framed = build_packet(
            Address::new(100),
            &Command::RgbLevel {
                r: 255,
                g: 128,
                b: 64,
            },
        );
        assert_eq!(
            framed,
            vec![0xC0, 0x00, 0x64, 0x2C, 0xFF, 0x80, 0x40, 0x17, 0xC0]
        );
    }

    #[test]
    fn fade_packet_matches_worked_planner_example() {
        let plan = crate::fade::plan(0, 255, 500);
        let framed = build_packet(
            Address::new(100),
            &Command::Fade {
                level: 255,
                interval: plan.interval,
                step: plan.step,
            },
        );
        // pre-framing payload (before checksum): 00 64 23 FF 01 06
        assert_eq!(
            &framed[1..7],
            &[0x00, 0x64, 0x23, 0xFF, 0x01, 0x06]
        );
    }

    #[test]
    fn decode_recovers_on_packet() {
        let framed = build_packet(Address::new(5), &Command::On);
        let frames = frame::decode_all(&framed);
        assert_eq!(frames.len(), 1);
        let decoded = decode_frame(&frames[0]).unwrap();
        assert_eq!(decoded.addr, Address::new(5));
        assert_eq!(decoded.opcode, 0x20);
        assert!(decoded.params.is_empty());
        assert!(decoded.checksum_ok);
    }

    #[test]
    fn decode_flags_bad_checksum_without_erroring() {
        let mut framed = build_packet(Address::new(5), &Command::On);
        // Corrupt the checksum byte (second to last, before closing delimiter).
        let idx = framed.len() - 2;
        framed[idx] ^= 0xFF;
        let frames = frame::decode_all(&framed);
        let decoded = decode_frame(&frames[0]).unwrap();
        assert!(!decoded.checksum_ok);
    }

    #[test]
    fn flash_payload_clamps_steps_minimum() {
        let cmd = Command::Flash {
            steps: 0,
            interval_a: 0,
            interval_b: 0,
            level_a: 10,
            level_b: 20,
        };
        let payload = cmd.payload();
        assert_eq!(&payload[0..2], &2u16.to_be_bytes());
        assert_eq!(&payload[2..4], &1u16.to_be_bytes());
        assert_eq!(&payload[4..6], &1u16.to_be_bytes());
    }

    #[test]
    fn rgb_fade_payload_is_nine_bytes() {
        let cmd = Command::RgbFade([
            ChannelFade::new(255, 1, 6),
            ChannelFade::new(128, 200, 0),
            ChannelFade::new(64, 0, 50),
        ]);
        let payload = cmd.payload();
        assert_eq!(payload.len(), 9);
        // Channel b's step of 0 clamps up to 1, channel c's interval of 0 clamps up to 1.
        assert_eq!(payload[5], 1);
        assert_eq!(payload[6], 64);
        assert_eq!(payload[7], 1);
    }
}
