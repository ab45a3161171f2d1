//! Pure wire codec for the lighting bus: framing, checksum, command
//! encoding, address packing, and fade-parameter planning. No I/O, no
//! shared state — everything here is a pure function over byte slices.

pub mod address;
pub mod checksum;
pub mod command;
pub mod fade;
pub mod frame;

pub use address::Address;
pub use command::{build_packet, decode_frame, ChannelFade, Command, DecodeError, DecodedFrame};
pub use fade::{plan, plan_rgb, FadePlan};
