use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SubmissionId);

/// One of the two upload positions that must both be filled before a combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotId {
    Slot1,
    Slot2,
}

impl SlotId {
    pub const ALL: [SlotId; 2] = [SlotId::Slot1, SlotId::Slot2];

    /// Multipart part name carrying this slot's file.
    pub fn part_name(self) -> &'static str {
        match self {
            SlotId::Slot1 => crate::protocol::IMAGE1_PART,
            SlotId::Slot2 => crate::protocol::IMAGE2_PART,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SlotId::Slot1 => "Image 1",
            SlotId::Slot2 => "Image 2",
        }
    }

    pub fn index(self) -> usize {
        match self {
            SlotId::Slot1 => 0,
            SlotId::Slot2 => 1,
        }
    }
}
