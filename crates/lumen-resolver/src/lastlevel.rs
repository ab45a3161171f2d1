use lumen_codec::Address;

/// Source of "current level" used when planning a fade. The resolver's
/// documented default assumes every fixture starts from zero (`spec.md` §9,
/// "Open question — source ambiguity") because no live level feedback is
/// read back from the device (`spec.md` §1, "device is write-only"). A
/// caller with its own level cache can supply a different implementation.
pub trait LastLevelSource: Send + Sync {
    fn last_rgb(&self, addr: Address) -> (u8, u8, u8);
    fn last_level(&self, addr: Address) -> u8;
}

/// The documented default: always plan fades from zero.
pub struct AssumeZero;

impl LastLevelSource for AssumeZero {
    fn last_rgb(&self, _addr: Address) -> (u8, u8, u8) {
        (0, 0, 0)
    }

    fn last_level(&self, _addr: Address) -> u8 {
        0
    }
}
