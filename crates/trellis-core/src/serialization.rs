//! DAG-CBOR serialization for Trellis core types
//!
//! Canonical byte form for memos and proof artifacts. DAG-CBOR gives a
//! deterministic encoding, which matters because stored memos are compared
//! and hashed by the wallet layer.

use serde::{Deserialize, Serialize};

/// Unified error type for serialization operations
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// DAG-CBOR encoding/decoding error
    #[error("DAG-CBOR error: {0}")]
    DagCbor(String),

    /// Invalid data format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Standard Result type for serialization operations
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serialize any serde-compatible type to DAG-CBOR bytes
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_ipld_dagcbor::to_vec(value).map_err(|e| {
        SerializationError::InvalidFormat(format!("Failed to serialize to DAG-CBOR: {e}"))
    })
}

/// Deserialize DAG-CBOR bytes to any serde-compatible type
pub fn from_slice<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    serde_ipld_dagcbor::from_slice(bytes).map_err(|e| SerializationError::DagCbor(e.to_string()))
}
