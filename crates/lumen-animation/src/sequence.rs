use std::time::Duration;

/// Direction a wave sequence travels through the floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy)]
pub struct LoopStep {
    pub color: (u8, u8, u8),
    pub intensity: u8,
    pub hold: Duration,
}

#[derive(Debug, Clone)]
pub enum SequenceKind {
    Static {
        color: (u8, u8, u8),
        intensity: u8,
    },
    Loop {
        steps: Vec<LoopStep>,
    },
    Wave {
        direction: Direction,
        color: (u8, u8, u8),
        fade_ms: u32,
        inter_floor_delay: Duration,
        hold: Duration,
        pause: Duration,
        repeat: bool,
    },
    Chase {
        tail_length: usize,
        tick: Duration,
        color: (u8, u8, u8),
    },
    Breathe {
        min_intensity: u8,
        max_intensity: u8,
        color: (u8, u8, u8),
        half_period: Duration,
    },
}

/// A named, fully-parameterized ambient pattern. There is no scripting
/// language behind this — the catalog in [`Sequence::by_id`] is the entire
/// universe of sequences a configuration's `ambient_sequence_id` can select.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub id: String,
    pub kind: SequenceKind,
}

impl Sequence {
    pub fn new(id: impl Into<String>, kind: SequenceKind) -> Self {
        Sequence { id: id.into(), kind }
    }

    /// Resolve a configured `ambient_sequence_id` to a built-in sequence.
    pub fn by_id(id: &str) -> Option<Sequence> {
        match id {
            "wave-up" => Some(Sequence::new(
                id,
                SequenceKind::Wave {
                    direction: Direction::Up,
                    color: (0, 120, 255),
                    fade_ms: 1500,
                    inter_floor_delay: Duration::from_millis(300),
                    hold: Duration::from_secs(2),
                    pause: Duration::from_secs(1),
                    repeat: true,
                },
            )),
            "wave-down" => Some(Sequence::new(
                id,
                SequenceKind::Wave {
                    direction: Direction::Down,
                    color: (0, 120, 255),
                    fade_ms: 1500,
                    inter_floor_delay: Duration::from_millis(300),
                    hold: Duration::from_secs(2),
                    pause: Duration::from_secs(1),
                    repeat: true,
                },
            )),
            "chase" => Some(Sequence::new(
                id,
                SequenceKind::Chase {
                    tail_length: 4,
                    tick: Duration::from_millis(200),
                    color: (255, 255, 255),
                },
            )),
            "breathe" => Some(Sequence::new(
                id,
                SequenceKind::Breathe {
                    min_intensity: 10,
                    max_intensity: 200,
                    color: (0, 80, 160),
                    half_period: Duration::from_secs(3),
                },
            )),
            "still-dim" => Some(Sequence::new(
                id,
                SequenceKind::Static {
                    color: (40, 40, 60),
                    intensity: 30,
                },
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_id_resolves_to_none() {
        assert!(Sequence::by_id("not-a-real-sequence").is_none());
    }

    #[test]
    fn known_ids_resolve() {
        for id in ["wave-up", "wave-down", "chase", "breathe", "still-dim"] {
            assert!(Sequence::by_id(id).is_some(), "{id} should resolve");
        }
    }
}
