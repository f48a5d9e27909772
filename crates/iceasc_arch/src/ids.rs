//! Opaque ID newtypes for chip database entities.
//!
//! Each ID is a `u32` index into one of the [`ChipDb`](crate::ChipDb) tables
//! and is only meaningful together with the database that produced it.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// A routing or bel-pin wire.
    WireId
);

define_id!(
    /// A programmable interconnect point between two wires.
    PipId
);

define_id!(
    /// A bel, the physical site a cell is placed on.
    BelId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn raw_roundtrip_and_order() {
        assert_eq!(WireId::from_raw(42).as_raw(), 42);
        let set: BTreeSet<_> = [PipId::from_raw(3), PipId::from_raw(1), PipId::from_raw(3)]
            .into_iter()
            .collect();
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![PipId::from_raw(1), PipId::from_raw(3)]);
    }

    #[test]
    fn serde_roundtrip() {
        let id = BelId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let back: BelId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
