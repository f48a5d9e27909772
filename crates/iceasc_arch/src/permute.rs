//! Site-dependent LUT input permutation.
//!
//! The upper four logic cells of a tile see their LUT inputs in a different
//! physical order than the logical `I0..I3`. Truth tables are rewritten
//! through [`LutPermutation::encode`] on the way to the bitstream and through
//! [`LutPermutation::decode`] on the way back.

use crate::chip::Family;

/// A permutation of the four LUT inputs.
///
/// `map[j]` is the physical input that logical input `j` lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LutPermutation {
    map: [u8; 4],
}

impl LutPermutation {
    /// The identity permutation.
    pub const IDENTITY: LutPermutation = LutPermutation { map: [0, 1, 2, 3] };

    /// The permutation used by logic cell `z` on `family`.
    pub fn for_site(family: Family, z: u32) -> Self {
        if z < 4 {
            return Self::IDENTITY;
        }
        match family {
            Family::F5k => Self { map: [0, 1, 3, 2] },
            Family::F384 | Family::F1k | Family::F8k => Self { map: [1, 0, 2, 3] },
        }
    }

    /// The inverse permutation.
    pub fn inverse(self) -> Self {
        let mut map = [0u8; 4];
        for (logical, &physical) in self.map.iter().enumerate() {
            map[physical as usize] = logical as u8;
        }
        Self { map }
    }

    fn apply(self, table: u16) -> u16 {
        let mut out = 0u16;
        for index in 0..16u16 {
            if table & (1 << index) == 0 {
                continue;
            }
            let mut permuted = 0u16;
            for (logical, &physical) in self.map.iter().enumerate() {
                if index & (1 << logical) != 0 {
                    permuted |= 1 << physical;
                }
            }
            out |= 1 << permuted;
        }
        out
    }

    /// Rewrites a logical truth table into physical input order.
    pub fn encode(self, table: u16) -> u16 {
        self.apply(table)
    }

    /// Rewrites a physical truth table back into logical input order.
    pub fn decode(self, table: u16) -> u16 {
        self.inverse().apply(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_half_is_identity() {
        for z in 0..4 {
            assert_eq!(LutPermutation::for_site(Family::F1k, z), LutPermutation::IDENTITY);
            assert_eq!(LutPermutation::for_site(Family::F5k, z).encode(0x1234), 0x1234);
        }
    }

    #[test]
    fn swap_moves_single_input_function() {
        // f = I0 is 0xAAAA; with inputs 0/1 swapped it becomes f = I1
        let perm = LutPermutation::for_site(Family::F8k, 6);
        assert_eq!(perm.encode(0xAAAA), 0xCCCC);
        assert_eq!(perm.decode(0xCCCC), 0xAAAA);
        // on UltraPlus inputs 2/3 swap: f = I2 (0xF0F0) becomes f = I3
        let perm = LutPermutation::for_site(Family::F5k, 4);
        assert_eq!(perm.encode(0xF0F0), 0xFF00);
        assert_eq!(perm.encode(0xAAAA), 0xAAAA);
    }

    #[test]
    fn inverse_composes_to_identity() {
        let perm = LutPermutation { map: [2, 0, 3, 1] };
        for table in [0x0001u16, 0x8000, 0x6996, 0x1234, 0xfe01] {
            assert_eq!(perm.decode(perm.encode(table)), table);
        }
        assert_eq!(perm.inverse().inverse(), perm);
    }
}
