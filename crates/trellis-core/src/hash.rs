//! Commitment hashing primitives
//!
//! All commitments in Trellis are 32-byte blake3 digests. Atoms and pairs
//! are hashed under distinct one-byte domain prefixes so that an atom can
//! never collide with an internal node.

use serde::{Deserialize, Serialize};

/// Domain prefix for hashing an atom.
const ATOM_PREFIX: u8 = 1;
/// Domain prefix for hashing a pair of child hashes.
const PAIR_PREFIX: u8 = 2;

/// Type-safe 256-bit commitment hash
///
/// Wraps a raw `[u8; 32]` to prevent accidental mixing of commitment hashes
/// with other byte arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// Create a new Hash32 from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Hash32> for [u8; 32] {
    fn from(hash: Hash32) -> Self {
        hash.0
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for Hash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hash a single atom: blake3(0x01 || bytes)
pub fn hash_atom(data: &[u8]) -> Hash32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[ATOM_PREFIX]);
    hasher.update(data);
    Hash32(*hasher.finalize().as_bytes())
}

/// Hash a pair of child hashes: blake3(0x02 || left || right)
pub fn hash_pair(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[PAIR_PREFIX]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Hash32(*hasher.finalize().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_atom_deterministic() {
        let data = b"hello world";
        assert_eq!(hash_atom(data), hash_atom(data));
        assert_ne!(hash_atom(data), hash_atom(b"hello worle"));
    }

    #[test]
    fn test_atom_and_pair_domains_separated() {
        // An atom containing exactly (left || right) must not hash like the pair
        let left = hash_atom(b"left");
        let right = hash_atom(b"right");
        let mut concatenated = Vec::with_capacity(64);
        concatenated.extend_from_slice(left.as_bytes());
        concatenated.extend_from_slice(right.as_bytes());
        assert_ne!(hash_pair(&left, &right), hash_atom(&concatenated));
    }

    #[test]
    fn test_hex_roundtrip() {
        let hash = hash_atom(b"test data");
        let hex_str = hash.to_hex();
        assert_eq!(hex_str.len(), 64);
        let decoded = Hash32::from_hex(&hex_str).unwrap();
        assert_eq!(hash, decoded);
    }
}
