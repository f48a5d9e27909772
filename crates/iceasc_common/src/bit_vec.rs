//! Packed 2-state bit vectors.
//!
//! Used for LUT truth tables, block RAM init words and any other
//! configuration value wider than a machine word.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bits stored per backing word.
const BITS_PER_WORD: u32 = 64;

/// A fixed-width vector of bits, index 0 being the least significant.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitVector {
    width: u32,
    data: Vec<u64>,
}

/// Error produced when parsing a bit vector from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitVectorParseError {
    /// A character outside the allowed digit set was found.
    #[error("invalid digit '{digit}' at position {position}")]
    InvalidDigit {
        /// The offending character.
        digit: char,
        /// Zero-based character position in the input.
        position: usize,
    },
    /// The input encodes a set bit beyond the requested width.
    #[error("value does not fit in {width} bits")]
    Overflow {
        /// The requested width.
        width: u32,
    },
}

impl BitVector {
    /// Creates an all-zero vector of the given width.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Creates a vector from the low `width` bits of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `width > 64`.
    pub fn from_u64(width: u32, value: u64) -> Self {
        assert!(width <= BITS_PER_WORD, "from_u64 width {width} exceeds 64");
        let mut v = Self::new(width);
        if width > 0 {
            v.data[0] = value & low_mask(width);
        }
        v
    }

    /// Returns the number of bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> bool {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = self.data[(index / BITS_PER_WORD) as usize];
        (word >> (index % BITS_PER_WORD)) & 1 == 1
    }

    /// Sets the bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: bool) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = &mut self.data[(index / BITS_PER_WORD) as usize];
        let bit = 1u64 << (index % BITS_PER_WORD);
        if value {
            *word |= bit;
        } else {
            *word &= !bit;
        }
    }

    /// Returns the low 64 bits as an integer.
    pub fn to_u64(&self) -> u64 {
        self.data.first().copied().unwrap_or(0)
    }

    /// Returns `true` if no bit is set.
    pub fn is_all_zero(&self) -> bool {
        self.data.iter().all(|w| *w == 0)
    }

    /// Returns the number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.data.iter().map(|w| w.count_ones()).sum()
    }

    /// Iterates over all bits from index 0 upwards.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.width).map(move |i| self.get(i))
    }

    /// Parses a binary string written most significant bit first.
    ///
    /// The resulting width equals the string length.
    pub fn from_binary_str(s: &str) -> Result<Self, BitVectorParseError> {
        let width = s.chars().count() as u32;
        let mut v = Self::new(width);
        for (position, digit) in s.chars().enumerate() {
            let bit = match digit {
                '0' => false,
                '1' => true,
                _ => return Err(BitVectorParseError::InvalidDigit { digit, position }),
            };
            v.set(width - 1 - position as u32, bit);
        }
        Ok(v)
    }

    /// Renders the vector as a binary string, most significant bit first.
    pub fn to_binary_string(&self) -> String {
        (0..self.width)
            .rev()
            .map(|i| if self.get(i) { '1' } else { '0' })
            .collect()
    }

    /// Parses a hexadecimal string written most significant digit first into
    /// a vector of `width` bits.
    ///
    /// Leading digits may carry zero bits beyond `width`; a set bit past the
    /// width is an overflow.
    pub fn from_hex_str(width: u32, s: &str) -> Result<Self, BitVectorParseError> {
        let mut v = Self::new(width);
        let digits: Vec<char> = s.chars().collect();
        for (position, digit) in digits.iter().enumerate() {
            let nibble = digit
                .to_digit(16)
                .ok_or(BitVectorParseError::InvalidDigit {
                    digit: *digit,
                    position,
                })?;
            let base = ((digits.len() - 1 - position) * 4) as u32;
            for k in 0..4 {
                if nibble & (1 << k) == 0 {
                    continue;
                }
                let index = base + k;
                if index >= width {
                    return Err(BitVectorParseError::Overflow { width });
                }
                v.set(index, true);
            }
        }
        Ok(v)
    }

    /// Renders the vector as lowercase hex, most significant digit first,
    /// using `ceil(width / 4)` digits.
    pub fn to_hex_string(&self) -> String {
        let digits = self.width.div_ceil(4);
        let mut out = String::with_capacity(digits as usize);
        for d in (0..digits).rev() {
            let mut nibble = 0u32;
            for k in 0..4 {
                let index = d * 4 + k;
                if index < self.width && self.get(index) {
                    nibble |= 1 << k;
                }
            }
            // nibble < 16 so from_digit always succeeds
            out.push(std::char::from_digit(nibble, 16).unwrap_or('0'));
        }
        out
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'b{}", self.width, self.to_binary_string())
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector({self})")
    }
}

fn word_count(width: u32) -> usize {
    width.div_ceil(BITS_PER_WORD) as usize
}

fn low_mask(width: u32) -> u64 {
    if width >= BITS_PER_WORD {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_zero() {
        let v = BitVector::new(16);
        assert_eq!(v.width(), 16);
        assert!(v.is_all_zero());
        assert_eq!(v.count_ones(), 0);
    }

    #[test]
    fn set_and_get_across_words() {
        let mut v = BitVector::new(256);
        v.set(0, true);
        v.set(63, true);
        v.set(64, true);
        v.set(255, true);
        assert!(v.get(0) && v.get(63) && v.get(64) && v.get(255));
        assert!(!v.get(1));
        assert_eq!(v.count_ones(), 4);
        v.set(63, false);
        assert!(!v.get(63));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn get_out_of_bounds_panics() {
        BitVector::new(4).get(4);
    }

    #[test]
    fn from_u64_masks_width() {
        let v = BitVector::from_u64(4, 0xff);
        assert_eq!(v.to_u64(), 0xf);
        assert_eq!(BitVector::from_u64(16, 0x8000).to_u64(), 0x8000);
    }

    #[test]
    fn binary_string_is_msb_first() {
        let v = BitVector::from_binary_str("0110").unwrap();
        assert_eq!(v.to_u64(), 6);
        assert_eq!(v.to_binary_string(), "0110");
        assert_eq!(
            BitVector::from_binary_str("01x0"),
            Err(BitVectorParseError::InvalidDigit {
                digit: 'x',
                position: 2
            })
        );
    }

    #[test]
    fn hex_string_is_msb_first() {
        let v = BitVector::from_hex_str(16, "8001").unwrap();
        assert!(v.get(15));
        assert!(v.get(0));
        assert_eq!(v.count_ones(), 2);
        assert_eq!(v.to_hex_string(), "8001");
    }

    #[test]
    fn hex_wide_word() {
        let text = format!("f{}", "0".repeat(63));
        let v = BitVector::from_hex_str(256, &text).unwrap();
        assert_eq!(v.count_ones(), 4);
        assert!(v.get(255) && v.get(252));
        assert_eq!(v.to_hex_string(), text);
    }

    #[test]
    fn hex_overflow_and_bad_digit() {
        assert_eq!(
            BitVector::from_hex_str(4, "10"),
            Err(BitVectorParseError::Overflow { width: 4 })
        );
        assert!(BitVector::from_hex_str(4, "0f").is_ok());
        assert!(matches!(
            BitVector::from_hex_str(8, "g0"),
            Err(BitVectorParseError::InvalidDigit { digit: 'g', .. })
        ));
    }

    #[test]
    fn display_format() {
        let v = BitVector::from_u64(3, 0b101);
        assert_eq!(v.to_string(), "3'b101");
        assert_eq!(format!("{v:?}"), "BitVector(3'b101)");
    }
}
