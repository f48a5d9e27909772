//! The configuration bit lattice: every tile's bits plus block RAM contents.
//!
//! Tiles are allocated on first write; a tile that was never written reads
//! as all zeros. Shapes come from the tile type table, so a row of the wrong
//! width or a row index past the tile is an internal error rather than a
//! silent truncation.

use iceasc_arch::{ConfigBit, FieldBit, Grid, TileType};
use iceasc_common::{BitVector, ContentHash, ContentHasher, IceResult, InternalError};
use iceasc_netlist::{RAM_INIT_WIDTH, RAM_INIT_WORDS};
use std::collections::BTreeMap;

/// Per-tile configuration bits of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitLattice {
    grid: Grid,
    tiles: BTreeMap<(u32, u32), Vec<BitVector>>,
    ram: BTreeMap<(u32, u32), Vec<BitVector>>,
}

impl BitLattice {
    /// Creates an all-zero lattice for `grid`.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            tiles: BTreeMap::new(),
            ram: BTreeMap::new(),
        }
    }

    /// The grid the lattice is shaped after.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    fn tile_type(&self, x: u32, y: u32) -> IceResult<TileType> {
        self.grid
            .tile_type(x, y)
            .ok_or_else(|| InternalError::new(format!("no tile at ({x}, {y})")))
    }

    fn tile_mut(&mut self, x: u32, y: u32) -> IceResult<&mut Vec<BitVector>> {
        let tile = self.tile_type(x, y)?;
        Ok(self
            .tiles
            .entry((x, y))
            .or_insert_with(|| vec![BitVector::new(tile.cols() as u32); tile.rows()]))
    }

    /// Reads one bit.
    pub fn get(&self, x: u32, y: u32, row: u8, col: u8) -> bool {
        self.tiles
            .get(&(x, y))
            .and_then(|rows| rows.get(row as usize))
            .is_some_and(|bits| u32::from(col) < bits.width() && bits.get(u32::from(col)))
    }

    /// Writes one bit.
    pub fn set(&mut self, x: u32, y: u32, row: u8, col: u8, value: bool) -> IceResult<()> {
        let rows = self.tile_mut(x, y)?;
        let bits = rows
            .get_mut(row as usize)
            .ok_or_else(|| InternalError::new(format!("row {row} outside tile ({x}, {y})")))?;
        if u32::from(col) >= bits.width() {
            return Err(InternalError::new(format!(
                "column {col} outside tile ({x}, {y})"
            )));
        }
        bits.set(u32::from(col), value);
        Ok(())
    }

    /// Whether a pip control bit holds its required value.
    pub fn matches(&self, bit: &ConfigBit) -> bool {
        self.get(bit.x, bit.y, bit.row, bit.col) == bit.value
    }

    /// Reads a field, least significant bit first.
    pub fn read_field(&self, bits: &[FieldBit]) -> u64 {
        bits.iter()
            .enumerate()
            .filter(|(_, b)| self.get(b.x, b.y, b.row, b.col))
            .fold(0, |acc, (i, _)| acc | 1 << i)
    }

    /// Replaces a whole row; bit index equals column.
    pub fn set_row(&mut self, x: u32, y: u32, row: usize, bits: BitVector) -> IceResult<()> {
        let tile = self.tile_type(x, y)?;
        if bits.width() != tile.cols() as u32 {
            return Err(InternalError::new(format!(
                "row of width {} in {tile} ({x}, {y}), expected {}",
                bits.width(),
                tile.cols()
            )));
        }
        let rows = self.tile_mut(x, y)?;
        let slot = rows
            .get_mut(row)
            .ok_or_else(|| InternalError::new(format!("row {row} outside tile ({x}, {y})")))?;
        *slot = bits;
        Ok(())
    }

    /// A tile's row; `None` if the tile was never written.
    pub fn row(&self, x: u32, y: u32, row: usize) -> Option<&BitVector> {
        self.tiles.get(&(x, y)).and_then(|rows| rows.get(row))
    }

    /// Stores one block RAM init word of the RAM whose bottom tile is (x, y).
    pub fn set_ram_word(&mut self, x: u32, y: u32, index: usize, word: BitVector) -> IceResult<()> {
        if self.tile_type(x, y)? != TileType::RamBottom {
            return Err(InternalError::new(format!("({x}, {y}) is not a RAM bottom tile")));
        }
        if index >= RAM_INIT_WORDS || word.width() != RAM_INIT_WIDTH {
            return Err(InternalError::new(format!(
                "RAM word {index} of width {} at ({x}, {y})",
                word.width()
            )));
        }
        let words = self
            .ram
            .entry((x, y))
            .or_insert_with(|| vec![BitVector::new(RAM_INIT_WIDTH); RAM_INIT_WORDS]);
        words[index] = word;
        Ok(())
    }

    /// Init words of the RAM at (x, y); `None` if none were written.
    pub fn ram_words(&self, x: u32, y: u32) -> Option<&[BitVector]> {
        self.ram.get(&(x, y)).map(Vec::as_slice)
    }

    /// Fingerprint of the content. Unwritten and all-zero data hash alike.
    pub fn fingerprint(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        for (&(x, y), rows) in &self.tiles {
            for (row, bits) in rows.iter().enumerate() {
                if bits.is_all_zero() {
                    continue;
                }
                hasher.update(b"T");
                hasher.update_u32(x);
                hasher.update_u32(y);
                hasher.update_u32(row as u32);
                hash_bits(&mut hasher, bits);
            }
        }
        for (&(x, y), words) in &self.ram {
            for (index, word) in words.iter().enumerate() {
                if word.is_all_zero() {
                    continue;
                }
                hasher.update(b"R");
                hasher.update_u32(x);
                hasher.update_u32(y);
                hasher.update_u32(index as u32);
                hash_bits(&mut hasher, word);
            }
        }
        hasher.finish()
    }
}

fn hash_bits(hasher: &mut ContentHasher, bits: &BitVector) {
    let mut word = 0u64;
    for (i, bit) in bits.iter().enumerate() {
        if bit {
            word |= 1 << (i % 64);
        }
        if i % 64 == 63 {
            hasher.update_u64(word);
            word = 0;
        }
    }
    hasher.update_u64(word);
}
