//! Fingerprints of configuration images.
//!
//! Two bit lattices with the same [`ContentHash`] are treated as identical
//! when checking that re-serialization is stable.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// A 128-bit XXH3 fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}{:02x}{:02x}..)", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

/// Incremental builder for a [`ContentHash`].
///
/// Tiles are fed one at a time together with their coordinates, so two
/// images that differ only in where a block sits hash differently.
pub struct ContentHasher {
    state: Xxh3,
}

impl ContentHasher {
    /// Creates an empty hasher.
    pub fn new() -> Self {
        Self { state: Xxh3::new() }
    }

    /// Feeds raw bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Feeds a `u32` in little-endian order.
    pub fn update_u32(&mut self, value: u32) {
        self.state.update(&value.to_le_bytes());
    }

    /// Feeds a `u64` in little-endian order.
    pub fn update_u64(&mut self, value: u64) {
        self.state.update(&value.to_le_bytes());
    }

    /// Finishes hashing.
    pub fn finish(&self) -> ContentHash {
        ContentHash(self.state.digest128().to_le_bytes())
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(data: &[u8]) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher.update(data);
        hasher.finish()
    }

    #[test]
    fn same_bytes_same_hash() {
        assert_eq!(hash(b".device 1k"), hash(b".device 1k"));
        assert_ne!(hash(b".device 1k"), hash(b".device 8k"));
    }

    #[test]
    fn chunking_does_not_matter() {
        let mut hasher = ContentHasher::new();
        hasher.update(b"logic_");
        hasher.update(b"tile");
        assert_eq!(hasher.finish(), hash(b"logic_tile"));
    }

    #[test]
    fn matches_one_shot_xxh3() {
        let expected = xxhash_rust::xxh3::xxh3_128(b"ram_data").to_le_bytes();
        assert_eq!(hash(b"ram_data"), ContentHash(expected));
    }

    #[test]
    fn coordinates_change_hash() {
        let mut a = ContentHasher::new();
        a.update_u32(1);
        a.update_u32(2);
        a.update_u64(0xff);
        let mut b = ContentHasher::new();
        b.update_u32(2);
        b.update_u32(1);
        b.update_u64(0xff);
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn display_is_hex() {
        let s = hash(b"x").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
        let d = format!("{:?}", hash(b"x"));
        assert!(d.starts_with("ContentHash("));
    }

    #[test]
    fn serde_roundtrip() {
        let h = hash(b"ram_data");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
