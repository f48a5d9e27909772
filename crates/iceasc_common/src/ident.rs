//! Interned names for architecture database entities.
//!
//! The architecture database repeats the same handful of local wire and bel
//! names in every tile (`lutff_0/out`, `local_g1_3`, ...). They are interned
//! once while the database is built, and the interner is then frozen into a
//! read-only table shared by every context bound to that chip.

use lasso::{Rodeo, RodeoReader};
use serde::{Deserialize, Serialize};

/// An interned name, represented as a `u32` index into an [`Interner`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32`; `try_from_usize` rejects values that do not
// fit, so every key handed out by lasso round-trips.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// Mutable string interner used while an architecture database is built.
#[derive(Debug)]
pub struct Interner {
    rodeo: Rodeo<Ident>,
}

impl Interner {
    /// Creates a new empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: Rodeo::new(),
        }
    }

    /// Interns a string, returning the existing [`Ident`] if it was seen before.
    pub fn get_or_intern(&mut self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Returns the [`Ident`] of an already interned string.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an [`Ident`] back to its string.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by this interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Freezes the interner into a read-only name table.
    pub fn freeze(self) -> NameTable {
        NameTable {
            reader: self.rodeo.into_reader(),
        }
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only name table produced by [`Interner::freeze`].
#[derive(Debug)]
pub struct NameTable {
    reader: RodeoReader<Ident>,
}

impl NameTable {
    /// Returns the [`Ident`] of a string, if the table contains it.
    pub fn get(&self, s: &str) -> Option<Ident> {
        self.reader.get(s)
    }

    /// Resolves an [`Ident`] back to its string.
    ///
    /// # Panics
    ///
    /// Panics if the `Ident` was not created by the interner this table was
    /// frozen from.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.reader.resolve(&ident)
    }

    /// Returns the number of distinct names in the table.
    pub fn len(&self) -> usize {
        self.reader.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let mut interner = Interner::new();
        let id = interner.get_or_intern("lutff_0/out");
        assert_eq!(interner.resolve(id), "lutff_0/out");
    }

    #[test]
    fn same_string_same_ident() {
        let mut interner = Interner::new();
        let a = interner.get_or_intern("local_g0_3");
        let b = interner.get_or_intern("local_g0_3");
        assert_eq!(a, b);
    }

    #[test]
    fn frozen_table_keeps_names() {
        let mut interner = Interner::new();
        let a = interner.get_or_intern("span4_h_1");
        let b = interner.get_or_intern("span4_v_1");
        let table = interner.freeze();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("span4_h_1"), Some(a));
        assert_eq!(table.resolve(b), "span4_v_1");
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn serde_roundtrip() {
        let id = Ident(42);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
