//! Content hashing used to detect when a `--fix` loop has converged.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 digest of a text buffer.
///
/// The fix loop hashes a file before and after applying a round of fixes;
/// equal hashes mean the round changed nothing and the loop stops.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Computes a content hash from a byte slice using XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = xxhash_rust::xxh3::xxh3_128(data);
        Self(hash.to_le_bytes())
    }

    /// Computes a content hash of a string's UTF-8 bytes.
    pub fn of_str(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }
}

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
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_same_hash() {
        let a = ContentHash::of_str("this.count()");
        let b = ContentHash::from_bytes(b"this.count()");
        assert_eq!(a, b);
    }

    #[test]
    fn fixed_text_hashes_differently() {
        let before = ContentHash::of_str("this.count");
        let after = ContentHash::of_str("this.count()");
        assert_ne!(before, after);
    }

    #[test]
    fn display_is_hex() {
        let s = ContentHash::of_str("component").to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn debug_abbreviated() {
        let s = format!("{:?}", ContentHash::of_str("x"));
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with("..)"));
    }

    #[test]
    fn serde_roundtrip() {
        let h = ContentHash::of_str("serde");
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
