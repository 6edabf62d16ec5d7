//! Trellis Core - encoding and commitment primitives
//!
//! This crate provides the foundational primitives the custody policy engine
//! is built on: a binary value tree (the "encoding"), deterministic content
//! hashing over it, a canonical curry operation with a precomputed-hash
//! variant, the fixed policy templates, and canonical byte serialization.
//!
//! Everything here is pure and immutable. Hashing is blake3 with a one-byte
//! domain prefix separating atoms from pairs; the same two primitives drive
//! both value-tree hashing and Merkle reduction in the custody crate, which
//! is what lets a collapsed Merkle branch stand in for the subtree it hides.

#![forbid(unsafe_code)]

/// Hash newtype and the atom/pair hashing primitives
pub mod hash;

/// Binary value tree, currying, and tree hashing
pub mod value;

/// Fixed policy templates shared across the architecture
pub mod templates;

/// DAG-CBOR canonical serialization
pub mod serialization;

pub use hash::{hash_atom, hash_pair, Hash32};
pub use templates::{
    INDEX_WRAPPER, INDEX_WRAPPER_HASH, RESTRICTION_TEMPLATE, RESTRICTION_TEMPLATE_HASH,
    SINGLE_CHOICE_TEMPLATE, SINGLE_CHOICE_TEMPLATE_HASH, THRESHOLD_TEMPLATE,
    THRESHOLD_TEMPLATE_HASH,
};
pub use value::{curried_hash, curry, list_hash, Value};
