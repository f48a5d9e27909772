//! Where a diagnostic points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The place a diagnostic refers to.
///
/// Text problems point at a line; netlist problems point at a tile, a bel
/// or a named net.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Location {
    /// No particular place.
    None,
    /// A 1-based line of the input text.
    Line(usize),
    /// A tile coordinate.
    Tile {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
    },
    /// A bel inside a tile.
    Bel {
        /// Column.
        x: u32,
        /// Row.
        y: u32,
        /// Bel name within the tile.
        name: String,
    },
    /// A net, by name.
    Net(String),
}

impl Location {
    /// Returns `true` for [`Location::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Location::None)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::None => f.write_str("<unknown>"),
            Location::Line(line) => write!(f, "line {line}"),
            Location::Tile { x, y } => write!(f, "tile ({x}, {y})"),
            Location::Bel { x, y, name } => write!(f, "tile ({x}, {y}) bel {name}"),
            Location::Net(name) => write!(f, "net {name}"),
        }
    }
}
