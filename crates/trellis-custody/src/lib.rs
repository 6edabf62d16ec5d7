//! Trellis Custody - puzzle-tree custody policy engine
//!
//! Composes spending-authorization policies (m-of-n thresholds,
//! restriction layers, nested sub-policies) into a single binary tree and
//! produces the artifacts an outer wallet layer consumes:
//!
//! - a commitment hash uniquely identifying the policy structure,
//! - an executable encoding (the spendable reveal),
//! - a compact self-describing memo from which a recipient reconstructs
//!   the policy shape (modulo unknown leaf types), and
//! - minimal-reveal proofs for a chosen subset of authorizers at spend
//!   time.
//!
//! Everything is pure computation over immutable trees: no I/O, no shared
//! mutable state, safe to use from multiple threads. The one transform,
//! [`PolicyNode::fill_in_unknown`], rebuilds rather than mutates.

#![forbid(unsafe_code)]

/// Error taxonomy for the engine
pub mod error;

/// Merkle tree with partial-reveal proofs
pub mod merkle;

/// Known/Unknown policy and restriction leaves
pub mod leaf;

/// m-of-n threshold policies
pub mod threshold;

/// The top-level policy composite
pub mod node;

/// Concrete example policies
pub mod policies;

pub use error::{CustodyError, Result};
pub use leaf::{
    KnownLeaf, PolicyHint, PolicyLeaf, RestrictionHint, RestrictionLeaf, SpendPolicy,
    SpendRestriction, UnknownLeaf,
};
pub use merkle::{MerkleProofTree, ProofNode, ProofPath, ProvenSpend};
pub use node::{InnerPolicy, PolicyNode, POLICY_MEMO_NAMESPACE};
pub use policies::{SignatureMember, TimelockValidator};
pub use threshold::{ThresholdHint, ThresholdPolicy, ThresholdProof};
