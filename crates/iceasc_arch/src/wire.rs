//! Wire classification and naming.

use iceasc_common::Ident;
use serde::{Deserialize, Serialize};

/// Type tag of a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireKind {
    /// Miscellaneous fabric wire (e.g. `fabout`).
    General,
    /// Local track feeding bel inputs.
    Local,
    /// Span-4 routing track.
    Span,
    /// One of the eight global networks.
    Global,
    /// Logic cell input before the fixed LUT connection.
    LutffIn,
    /// Logic cell input as seen by the LUT.
    LutffInLut,
    /// Logic cell output.
    LutffOut,
    /// Logic cell carry output.
    LutffCout,
    /// Carry input of the first logic cell in a tile.
    CarryIn,
    /// Shared clock, clock-enable or set/reset wire of a tile.
    Clock,
    /// A wire attached directly to a bel pin.
    BelPin,
}

/// Database record for one wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireInfo {
    /// Tile column.
    pub x: u32,
    /// Tile row.
    pub y: u32,
    /// Interned tile-local name.
    pub name: Ident,
    /// Type tag.
    pub kind: WireKind,
}

/// Formats a full wire name, `X{x}/Y{y}/{local}`.
pub fn format_wire_name(x: u32, y: u32, local: &str) -> String {
    format!("X{x}/Y{y}/{local}")
}

/// Splits a full wire name into its coordinates and tile-local part.
pub fn split_wire_name(name: &str) -> Option<(u32, u32, &str)> {
    let rest = name.strip_prefix('X')?;
    let (x, rest) = rest.split_once('/')?;
    let rest = rest.strip_prefix('Y')?;
    let (y, local) = rest.split_once('/')?;
    if local.is_empty() {
        return None;
    }
    Some((x.parse().ok()?, y.parse().ok()?, local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_and_format() {
        assert_eq!(
            split_wire_name("X3/Y12/lutff_4/in_1"),
            Some((3, 12, "lutff_4/in_1"))
        );
        assert_eq!(format_wire_name(3, 12, "lutff_4/in_1"), "X3/Y12/lutff_4/in_1");
    }

    #[test]
    fn split_rejects_garbage() {
        assert_eq!(split_wire_name("3/12/x"), None);
        assert_eq!(split_wire_name("X3/Yq/x"), None);
        assert_eq!(split_wire_name("X3/Y1/"), None);
        assert_eq!(split_wire_name("X-1/Y1/a"), None);
    }
}
