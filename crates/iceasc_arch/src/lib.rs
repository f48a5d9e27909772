//! iCE40 device architecture for the iceasc codec.
//!
//! The crate describes every supported device family as a procedurally
//! generated [`ChipDb`]: the tile grid, every routing wire, every
//! programmable interconnect point (pip) with the configuration bits that
//! select it, and every basic element (bel) with its pins and configuration
//! fields.
//!
//! ```
//! use iceasc_arch::{ChipArgs, ChipDb};
//!
//! let args = ChipArgs::resolve("1k", None).unwrap();
//! let db = ChipDb::for_family(args.family()).unwrap();
//! let wire = db.find_wire("X1/Y1/lutff_0/out").unwrap();
//! assert_eq!(db.wire_name(wire), "X1/Y1/lutff_0/out");
//! ```

#![warn(missing_docs)]

pub mod bel;
pub mod chip;
pub mod db;
pub mod error;
pub mod ids;
pub mod layout;
pub mod permute;
pub mod pip;
pub mod tile;
pub mod wire;

pub use bel::{pin_specs, BelInfo, BelKind, BelPin, PinDir};
pub use chip::{Chip, ChipArgs, Family};
pub use db::ChipDb;
pub use error::ArchError;
pub use ids::{BelId, PipId, WireId};
pub use layout::{BelLayout, BitField, FieldBit};
pub use permute::LutPermutation;
pub use pip::{ConfigBit, PipControl, PipInfo};
pub use tile::{Grid, TileType};
pub use wire::{WireInfo, WireKind};
