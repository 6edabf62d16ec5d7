//! Error types for the custody policy engine
//!
//! Every variant is a contract violation raised synchronously at the
//! offending call. Nothing here is transient: callers treat these as fatal
//! for the requested operation and surface them, never retry.

use trellis_core::Hash32;

/// Errors raised by policy-tree construction, proof generation, and memo
/// decoding.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CustodyError {
    /// An Unknown leaf was asked for something only a Known leaf can
    /// produce.
    #[error("unsupported operation: {what}")]
    UnsupportedOperation {
        /// What was requested of the Unknown leaf
        what: &'static str,
    },

    /// A memo failed to parse: wrong namespace tag or malformed shape.
    #[error("invalid policy spec: {reason}")]
    InvalidSpec {
        /// What about the memo was malformed
        reason: String,
    },

    /// Two threshold members share a commitment hash.
    #[error("duplicate threshold member {commitment}")]
    DuplicateMember {
        /// The colliding commitment hash
        commitment: Hash32,
    },

    /// The proven-spend set does not match the threshold's m value.
    #[error("proof size mismatch: expected {expected} proven spends, got {actual}")]
    InvalidProofSize {
        /// The threshold's m value
        expected: usize,
        /// Number of proven spends supplied
        actual: usize,
    },

    /// A commitment hash is absent from the Merkle tree it was looked up
    /// in.
    #[error("commitment {commitment} not found in tree")]
    NotFound {
        /// The missing commitment hash
        commitment: Hash32,
    },
}

impl CustodyError {
    /// Shorthand for an [`CustodyError::InvalidSpec`] with a formatted
    /// reason.
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            reason: reason.into(),
        }
    }
}

/// Standard Result type for custody operations
pub type Result<T> = std::result::Result<T, CustodyError>;
