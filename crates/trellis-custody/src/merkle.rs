//! Merkle tree over member commitment hashes
//!
//! [`MerkleProofTree`] commits to an ordered list of leaf hashes and can
//! prove membership two ways: a classic single-leaf inclusion path, and a
//! partial reveal that exposes an arbitrary subset of leaves in one pass
//! while collapsing every irrelevant subtree to its hash.
//!
//! The list is split recursively at `(len + 1) / 2`, the same rule
//! everywhere, so a collapsed branch hash always equals the hash the full
//! reduction would have produced.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use trellis_core::{hash_atom, hash_pair, Hash32, Value};

use crate::error::{CustodyError, Result};

/// The reveal + argument pair for one authorized member, supplied by the
/// caller at proof time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenSpend {
    /// The member's executable encoding (the reveal)
    pub encoding: Value,
    /// The argument to run it with
    pub solution: Value,
}

/// One node of a partial-reveal proof.
///
/// The proof is the minimal subtree whose leaves are exactly the proven
/// members plus just enough sibling hashes to re-derive the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofNode {
    /// A subtree with nothing to reveal, collapsed to its hash
    Collapsed(Hash32),
    /// A revealed leaf: encoding and solution exposed
    Reveal(ProvenSpend),
    /// An internal node kept open because a reveal lives below it
    Branch(Box<ProofNode>, Box<ProofNode>),
}

impl ProofNode {
    /// Wire form of the proof: a collapsed node is a hash atom, a reveal
    /// is `(nil . (encoding . solution))`, a branch is a pair.
    pub fn to_value(&self) -> Value {
        match self {
            ProofNode::Collapsed(hash) => Value::atom(hash.as_bytes().to_vec()),
            ProofNode::Reveal(spend) => Value::pair(
                Value::nil(),
                Value::pair(spend.encoding.clone(), spend.solution.clone()),
            ),
            ProofNode::Branch(first, rest) => Value::pair(first.to_value(), rest.to_value()),
        }
    }

    /// Re-derive the root this proof commits to. A revealed leaf
    /// contributes the hash of its revealed encoding, exactly as the full
    /// reduction would have hashed the member's commitment.
    pub fn reconstruct_root(&self) -> Hash32 {
        match self {
            ProofNode::Collapsed(hash) => *hash,
            ProofNode::Reveal(spend) => hash_atom(spend.encoding.tree_hash().as_bytes()),
            ProofNode::Branch(first, rest) => {
                hash_pair(&first.reconstruct_root(), &rest.reconstruct_root())
            }
        }
    }

    /// Number of revealed leaves in this proof
    pub fn revealed_count(&self) -> usize {
        match self {
            ProofNode::Collapsed(_) => 0,
            ProofNode::Reveal(_) => 1,
            ProofNode::Branch(first, rest) => first.revealed_count() + rest.revealed_count(),
        }
    }

    /// Number of collapsed sibling hashes in this proof
    pub fn collapsed_count(&self) -> usize {
        match self {
            ProofNode::Collapsed(_) => 1,
            ProofNode::Reveal(_) => 0,
            ProofNode::Branch(first, rest) => first.collapsed_count() + rest.collapsed_count(),
        }
    }
}

/// Inclusion path for a single leaf: sibling hashes ordered leaf to root,
/// with bit `k` of `path_bits` set when the target sat in the right half
/// `k` levels above the leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPath {
    /// Direction bits, leaf to root
    pub path_bits: u64,
    /// Sibling subtree hashes, leaf to root
    pub siblings: Vec<Hash32>,
}

impl ProofPath {
    /// Wire form: `(path_bits . (sibling1 sibling2 ...))`
    pub fn to_value(&self) -> Value {
        Value::pair(
            Value::int(self.path_bits),
            Value::list(
                self.siblings
                    .iter()
                    .map(|sibling| Value::atom(sibling.as_bytes().to_vec()))
                    .collect(),
            ),
        )
    }

    /// Walk the path up from `leaf` and return the implied root. An empty
    /// path means a single-leaf tree, whose root is the leaf unchanged.
    pub fn reconstruct_root(&self, leaf: &Hash32) -> Hash32 {
        if self.siblings.is_empty() {
            return *leaf;
        }
        let mut current = hash_atom(leaf.as_bytes());
        for (level, sibling) in self.siblings.iter().enumerate() {
            current = if self.path_bits >> level & 1 == 1 {
                hash_pair(sibling, &current)
            } else {
                hash_pair(&current, sibling)
            };
        }
        current
    }
}

/// A binary tree over an ordered list of leaf commitment hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProofTree {
    nodes: Vec<Hash32>,
}

impl MerkleProofTree {
    /// Build a tree over the given leaf hashes, preserving order.
    pub fn new(nodes: Vec<Hash32>) -> Self {
        Self { nodes }
    }

    /// The ordered leaf hashes
    pub fn nodes(&self) -> &[Hash32] {
        &self.nodes
    }

    /// Fixed split rule: left half takes the extra element on odd lengths.
    fn split(nodes: &[Hash32]) -> (&[Hash32], &[Hash32]) {
        nodes.split_at((nodes.len() + 1) / 2)
    }

    /// Reduce a non-empty slice to its subtree hash.
    fn reduce(nodes: &[Hash32]) -> Hash32 {
        if let [leaf] = nodes {
            hash_atom(leaf.as_bytes())
        } else {
            let (first, rest) = Self::split(nodes);
            hash_pair(&Self::reduce(first), &Self::reduce(rest))
        }
    }

    /// Root commitment. A single-leaf tree yields that leaf's hash
    /// unchanged; an empty tree commits to the nil atom.
    pub fn root(&self) -> Hash32 {
        match self.nodes.as_slice() {
            [] => hash_atom(&[]),
            [leaf] => *leaf,
            nodes => Self::reduce(nodes),
        }
    }

    /// Inclusion path for one leaf, or [`CustodyError::NotFound`] if the
    /// hash is absent.
    pub fn proof_path(&self, leaf: &Hash32) -> Result<ProofPath> {
        Self::path_in(&self.nodes, leaf).ok_or(CustodyError::NotFound { commitment: *leaf })
    }

    fn path_in(nodes: &[Hash32], target: &Hash32) -> Option<ProofPath> {
        match nodes {
            [] => return None,
            [leaf] => {
                return (leaf == target).then(|| ProofPath {
                    path_bits: 0,
                    siblings: Vec::new(),
                })
            }
            _ => {}
        }
        let (first, rest) = Self::split(nodes);
        if let Some(mut path) = Self::path_in(first, target) {
            path.siblings.push(Self::reduce(rest));
            Some(path)
        } else if let Some(mut path) = Self::path_in(rest, target) {
            path.path_bits |= 1 << path.siblings.len();
            path.siblings.push(Self::reduce(first));
            Some(path)
        } else {
            None
        }
    }

    /// Build a partial-reveal proof for the given subset of leaves.
    ///
    /// The returned structure keeps a branch open only where a reveal
    /// lives below it; every other subtree collapses to a single hash.
    /// Callers must supply exactly the leaves being proven; a requested
    /// hash absent from the tree fails with [`CustodyError::NotFound`]
    /// rather than silently producing an unverifiable proof.
    pub fn partial_reveal(&self, to_prove: &BTreeMap<Hash32, ProvenSpend>) -> Result<ProofNode> {
        for requested in to_prove.keys() {
            if !self.nodes.contains(requested) {
                return Err(CustodyError::NotFound {
                    commitment: *requested,
                });
            }
        }
        tracing::trace!(
            leaves = self.nodes.len(),
            revealing = to_prove.len(),
            "generating partial reveal"
        );
        Ok(Self::reveal_in(&self.nodes, to_prove))
    }

    fn reveal_in(nodes: &[Hash32], to_prove: &BTreeMap<Hash32, ProvenSpend>) -> ProofNode {
        match nodes {
            [] => return ProofNode::Collapsed(hash_atom(&[])),
            [leaf] => {
                return match to_prove.get(leaf) {
                    Some(spend) => ProofNode::Reveal(spend.clone()),
                    None => ProofNode::Collapsed(hash_atom(leaf.as_bytes())),
                }
            }
            _ => {}
        }
        let (first, rest) = Self::split(nodes);
        let first_proof = Self::reveal_in(first, to_prove);
        let rest_proof = Self::reveal_in(rest, to_prove);
        match (first_proof, rest_proof) {
            // Nothing revealed on either side: the branch is opaque
            (ProofNode::Collapsed(left), ProofNode::Collapsed(right)) => {
                ProofNode::Collapsed(hash_pair(&left, &right))
            }
            (first_proof, rest_proof) => {
                ProofNode::Branch(Box::new(first_proof), Box::new(rest_proof))
            }
        }
    }
}
