//! Tile types and the tile grid of each family.

use crate::chip::Family;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of configuration rows in every tile type.
pub const TILE_ROWS: usize = 16;

/// The function of a tile, which fixes its bit-row shape and ASC header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileType {
    /// Eight logic cells.
    Logic,
    /// Two I/O cells.
    Io,
    /// Lower half of a block RAM.
    RamBottom,
    /// Upper half of a block RAM.
    RamTop,
    /// First tile of a MAC16 block (holds the block configuration).
    Dsp0,
    /// Second tile of a MAC16 block.
    Dsp1,
    /// Third tile of a MAC16 block.
    Dsp2,
    /// Fourth tile of a MAC16 block.
    Dsp3,
    /// Connection tile for hard IP (oscillators, LED driver, warm boot).
    IpCon,
}

impl TileType {
    /// All tile types.
    pub const ALL: [TileType; 9] = [
        TileType::Logic,
        TileType::Io,
        TileType::RamBottom,
        TileType::RamTop,
        TileType::Dsp0,
        TileType::Dsp1,
        TileType::Dsp2,
        TileType::Dsp3,
        TileType::IpCon,
    ];

    /// The kind part of the ASC header, `.{kind}_tile`.
    pub fn header_kind(self) -> &'static str {
        match self {
            TileType::Logic => "logic",
            TileType::Io => "io",
            TileType::RamBottom => "ramb",
            TileType::RamTop => "ramt",
            TileType::Dsp0 => "dsp0",
            TileType::Dsp1 => "dsp1",
            TileType::Dsp2 => "dsp2",
            TileType::Dsp3 => "dsp3",
            TileType::IpCon => "ipcon",
        }
    }

    /// Parses the kind part of an ASC tile header.
    pub fn from_header_kind(kind: &str) -> Option<TileType> {
        TileType::ALL.into_iter().find(|t| t.header_kind() == kind)
    }

    /// Number of configuration rows.
    pub fn rows(self) -> usize {
        TILE_ROWS
    }

    /// Number of bits per configuration row.
    pub fn cols(self) -> usize {
        match self {
            TileType::Logic
            | TileType::Dsp0
            | TileType::Dsp1
            | TileType::Dsp2
            | TileType::Dsp3
            | TileType::IpCon => 54,
            TileType::Io => 18,
            TileType::RamBottom | TileType::RamTop => 42,
        }
    }

    /// DSP tile index 0..3, if this is a DSP tile.
    pub fn dsp_index(self) -> Option<u32> {
        match self {
            TileType::Dsp0 => Some(0),
            TileType::Dsp1 => Some(1),
            TileType::Dsp2 => Some(2),
            TileType::Dsp3 => Some(3),
            _ => None,
        }
    }

    /// Whether the tile carries the eight-slot `lutff_*` wire set.
    pub fn has_lutff_wires(self) -> bool {
        self == TileType::Logic || self.dsp_index().is_some()
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_tile", self.header_kind())
    }
}

/// Base rows of the MAC16 blocks on the UltraPlus side columns.
const DSP_BASE_ROWS: [u32; 4] = [5, 10, 15, 23];

/// The tile grid of one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    family: Family,
    width: u32,
    height: u32,
}

impl Grid {
    /// Creates the grid for a family.
    pub fn new(family: Family) -> Self {
        let (width, height) = family.grid_size();
        Self {
            family,
            width,
            height,
        }
    }

    /// Family this grid belongs to.
    pub fn family(&self) -> Family {
        self.family
    }

    /// Width in tiles.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether (x, y) lies inside the grid rectangle.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// The tile type at (x, y); `None` for corners and out-of-range
    /// coordinates.
    pub fn tile_type(&self, x: u32, y: u32) -> Option<TileType> {
        if !self.contains(x, y) {
            return None;
        }
        let left_right = x == 0 || x == self.width - 1;
        let top_bottom = y == 0 || y == self.height - 1;
        if left_right && top_bottom {
            return None;
        }
        if top_bottom {
            return Some(TileType::Io);
        }
        if left_right {
            if self.family != Family::F5k {
                return Some(TileType::Io);
            }
            for base in DSP_BASE_ROWS {
                if (base..base + 4).contains(&y) {
                    return Some(match y - base {
                        0 => TileType::Dsp0,
                        1 => TileType::Dsp1,
                        2 => TileType::Dsp2,
                        _ => TileType::Dsp3,
                    });
                }
            }
            return Some(TileType::IpCon);
        }
        if self.family.ram_columns().contains(&x) {
            return Some(if y % 2 == 1 {
                TileType::RamBottom
            } else {
                TileType::RamTop
            });
        }
        Some(TileType::Logic)
    }

    /// Iterates over all tiles in row-major order (y outer, x inner).
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32, TileType)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| self.tile_type(x, y).map(|t| (x, y, t)))
        })
    }

    /// Location of the PLL host I/O tile, on families that have a PLL.
    pub fn pll_tile(&self) -> Option<(u32, u32)> {
        self.family.has_pll().then_some((self.width / 2, 0))
    }

    /// Locations of the eight global buffers, indexed by network number.
    pub fn global_buffer_tiles(&self) -> [(u32, u32); 8] {
        let mid = self.width / 2;
        let top = self.height - 1;
        std::array::from_fn(|g| {
            let x = mid - 2 + (g as u32) / 2;
            let y = if g % 2 == 0 { 0 } else { top };
            (x, y)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        for t in TileType::ALL {
            assert_eq!(TileType::from_header_kind(t.header_kind()), Some(t));
        }
        assert_eq!(TileType::from_header_kind("bram"), None);
        assert_eq!(TileType::Logic.to_string(), "logic_tile");
    }

    #[test]
    fn shapes() {
        assert_eq!((TileType::Logic.rows(), TileType::Logic.cols()), (16, 54));
        assert_eq!(TileType::Io.cols(), 18);
        assert_eq!(TileType::RamTop.cols(), 42);
        assert_eq!(TileType::IpCon.cols(), 54);
    }

    #[test]
    fn hx1k_layout() {
        let grid = Grid::new(Family::F1k);
        assert_eq!(grid.tile_type(0, 0), None);
        assert_eq!(grid.tile_type(13, 17), None);
        assert_eq!(grid.tile_type(0, 5), Some(TileType::Io));
        assert_eq!(grid.tile_type(5, 0), Some(TileType::Io));
        assert_eq!(grid.tile_type(3, 1), Some(TileType::RamBottom));
        assert_eq!(grid.tile_type(3, 2), Some(TileType::RamTop));
        assert_eq!(grid.tile_type(1, 1), Some(TileType::Logic));
        assert_eq!(grid.tile_type(14, 1), None);
        assert_eq!(grid.tiles().count(), 14 * 18 - 4);
    }

    #[test]
    fn up5k_side_columns() {
        let grid = Grid::new(Family::F5k);
        assert_eq!(grid.tile_type(0, 5), Some(TileType::Dsp0));
        assert_eq!(grid.tile_type(25, 8), Some(TileType::Dsp3));
        assert_eq!(grid.tile_type(0, 23), Some(TileType::Dsp0));
        assert_eq!(grid.tile_type(0, 30), Some(TileType::IpCon));
        assert_eq!(grid.tile_type(0, 4), Some(TileType::IpCon));
        assert_eq!(grid.tile_type(13, 0), Some(TileType::Io));
        assert_eq!(grid.tile_type(6, 3), Some(TileType::RamBottom));
    }

    #[test]
    fn row_major_order() {
        let grid = Grid::new(Family::F384);
        let tiles: Vec<_> = grid.tiles().take(3).map(|(x, y, _)| (x, y)).collect();
        assert_eq!(tiles, vec![(1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn global_buffers_sit_on_io_tiles() {
        for family in Family::ALL {
            let grid = Grid::new(family);
            for (x, y) in grid.global_buffer_tiles() {
                assert_eq!(grid.tile_type(x, y), Some(TileType::Io), "{family} ({x}, {y})");
            }
            if let Some((x, y)) = grid.pll_tile() {
                assert_eq!(grid.tile_type(x, y), Some(TileType::Io));
            }
        }
    }
}
