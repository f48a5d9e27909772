//! Programmable interconnect points and their control bits.

use crate::ids::WireId;
use serde::{Deserialize, Serialize};

/// One control bit of a pip: the value it must hold for the pip to be on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConfigBit {
    /// Tile column.
    pub x: u32,
    /// Tile row.
    pub y: u32,
    /// Configuration row inside the tile.
    pub row: u8,
    /// Configuration column inside the tile.
    pub col: u8,
    /// Required value.
    pub value: bool,
}

/// Position of a pip inside its destination mux.
///
/// The mux occupies one enable bit at `col` followed by `sel_bits` select
/// bits (least significant first). The pip is on when the enable bit is set
/// and the select field equals `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipControl {
    /// Configuration row of the mux.
    pub row: u8,
    /// Column of the enable bit.
    pub col: u8,
    /// Number of select bits.
    pub sel_bits: u8,
    /// Candidate index of this pip.
    pub index: u8,
}

impl PipControl {
    /// Expands the control into concrete bits in tile (x, y).
    pub fn bits(&self, x: u32, y: u32) -> Vec<ConfigBit> {
        let mut bits = Vec::with_capacity(1 + self.sel_bits as usize);
        bits.push(ConfigBit {
            x,
            y,
            row: self.row,
            col: self.col,
            value: true,
        });
        for b in 0..self.sel_bits {
            bits.push(ConfigBit {
                x,
                y,
                row: self.row,
                col: self.col + 1 + b,
                value: (self.index >> b) & 1 == 1,
            });
        }
        bits
    }
}

/// Database record for one pip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipInfo {
    /// Source (uphill) wire.
    pub src: WireId,
    /// Destination (downhill) wire.
    pub dst: WireId,
    /// Mux position; `None` for fixed pips.
    pub control: Option<PipControl>,
}

impl PipInfo {
    /// Whether the pip has no control bits.
    pub fn is_fixed(&self) -> bool {
        self.control.is_none()
    }
}

/// Separator between source and destination in a pip name.
pub const PIP_SEPARATOR: &str = ".->";

/// Select-field width for a mux with `candidates` inputs.
pub fn select_width(candidates: usize) -> u8 {
    if candidates <= 1 {
        0
    } else {
        (usize::BITS - (candidates - 1).leading_zeros()) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_widths() {
        assert_eq!(select_width(1), 0);
        assert_eq!(select_width(2), 1);
        assert_eq!(select_width(4), 2);
        assert_eq!(select_width(5), 3);
        assert_eq!(select_width(8), 3);
    }

    #[test]
    fn control_bits_encode_index() {
        let control = PipControl {
            row: 3,
            col: 14,
            sel_bits: 3,
            index: 5,
        };
        let bits = control.bits(1, 2);
        let values: Vec<_> = bits.iter().map(|b| (b.col, b.value)).collect();
        assert_eq!(values, vec![(14, true), (15, true), (16, false), (17, true)]);
        assert!(bits.iter().all(|b| b.row == 3 && b.x == 1 && b.y == 2));
    }

    #[test]
    fn single_bit_control() {
        let control = PipControl {
            row: 1,
            col: 50,
            sel_bits: 0,
            index: 0,
        };
        assert_eq!(control.bits(0, 0).len(), 1);
    }
}
