//! Shared foundational types used across the iceasc workspace.
//!
//! This crate provides interned identifiers for architecture names, packed
//! 2-state bit vectors for truth tables and memory words, content hashing for
//! cheap equality checks of configuration images, and the common internal
//! error type.

#![warn(missing_docs)]

pub mod bit_vec;
pub mod hash;
pub mod ident;
pub mod result;

pub use bit_vec::{BitVector, BitVectorParseError};
pub use hash::{ContentHash, ContentHasher};
pub use ident::{Ident, Interner, NameTable};
pub use result::{IceResult, InternalError};
