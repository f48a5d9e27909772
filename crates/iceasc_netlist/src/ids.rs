//! Opaque ID newtypes for netlist entities.
//!
//! [`CellId`] and [`NetId`] are `u32` arena indices into a
//! [`Context`](crate::Context). They are `Copy`, `Hash`, and
//! `Serialize`/`Deserialize`.

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

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Handle of a cell in a netlist context.
    CellId
);

define_id!(
    /// Handle of a net in a netlist context.
    NetId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        assert_eq!(CellId::from_raw(42).as_raw(), 42);
        assert_eq!(NetId::from_raw(7).to_string(), "7");
    }

    #[test]
    fn serde_roundtrip() {
        let id = NetId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let back: NetId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
