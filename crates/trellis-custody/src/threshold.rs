//! m-of-n threshold policies
//!
//! A [`ThresholdPolicy`] owns an ordered list of member policy nodes and
//! commits to them through a Merkle tree over their commitment hashes. At
//! spend time it proves exactly `m` chosen members, collapsing the rest.
//!
//! `m == 1` is a structurally distinct shape, not a special case: it uses
//! the cheaper single-choice template and a flat inclusion-path proof, so
//! both the commitment hash and the proof differ from a general threshold
//! with the same members. On-chain compatibility depends on which template
//! was used, so the two paths are never unified.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use trellis_core::{curried_hash, curry, hash_atom, Hash32, Value};
use trellis_core::{
    SINGLE_CHOICE_TEMPLATE, SINGLE_CHOICE_TEMPLATE_HASH, THRESHOLD_TEMPLATE,
    THRESHOLD_TEMPLATE_HASH,
};

use crate::error::{CustodyError, Result};
use crate::merkle::{MerkleProofTree, ProofNode, ProofPath, ProvenSpend};
use crate::node::PolicyNode;

/// An m-of-n authorization node over member policy nodes.
///
/// Members are exclusively owned; the overall policy structure is a tree
/// with no sharing and no cycles.
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    m: usize,
    members: Vec<PolicyNode>,
}

/// Proof artifact for one spend attempt against a threshold policy.
///
/// The shape bifurcates on `m`: consumers of the wire form must accept
/// both, keyed by the m value the policy was committed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdProof {
    /// General partial-reveal proof (`m > 1`)
    Reveal(ProofNode),
    /// Flattened single-path proof (`m == 1`)
    SinglePath {
        /// Inclusion path for the one revealed member
        path: ProofPath,
        /// The revealed member's spend
        spend: ProvenSpend,
    },
}

impl ThresholdProof {
    /// Wire form of the proof. The single-path shape is the flat list
    /// `((path_bits . siblings) encoding solution)`.
    pub fn to_value(&self) -> Value {
        match self {
            ThresholdProof::Reveal(node) => node.to_value(),
            ThresholdProof::SinglePath { path, spend } => Value::list(vec![
                path.to_value(),
                spend.encoding.clone(),
                spend.solution.clone(),
            ]),
        }
    }
}

impl ThresholdPolicy {
    /// Build an m-of-n policy over the given members.
    ///
    /// Member commitment hashes must be pairwise distinct: proof
    /// generation addresses members by hash, so duplicates are rejected
    /// here rather than producing ambiguous proofs later.
    pub fn new(m: usize, members: Vec<PolicyNode>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for member in &members {
            let commitment = member.commitment_hash();
            if !seen.insert(commitment) {
                return Err(CustodyError::DuplicateMember { commitment });
            }
        }
        Ok(Self { m, members })
    }

    /// The threshold value m
    pub fn m(&self) -> usize {
        self.m
    }

    /// The member count n
    pub fn n(&self) -> usize {
        self.members.len()
    }

    /// The ordered member policy nodes
    pub fn members(&self) -> &[PolicyNode] {
        &self.members
    }

    /// Replace the member list, keeping m. Used by fill-in, where a sane
    /// registry preserves every member's commitment hash and the
    /// duplicate check from construction still holds.
    pub(crate) fn with_members(&self, members: Vec<PolicyNode>) -> Self {
        Self { m: self.m, members }
    }

    fn merkle_tree(&self) -> MerkleProofTree {
        MerkleProofTree::new(
            self.members
                .iter()
                .map(PolicyNode::commitment_hash)
                .collect(),
        )
    }

    /// Merkle root over the member commitment hashes
    pub fn root_commitment(&self) -> Hash32 {
        self.merkle_tree().root()
    }

    /// Executable encoding: the general threshold checker curried with
    /// `(m, root)`, or the single-choice checker curried with `(root)`
    /// when `m == 1`.
    pub fn encoding(&self, _nonce: u64) -> Value {
        let root = Value::atom(self.root_commitment().as_bytes().to_vec());
        if self.m > 1 {
            curry(&THRESHOLD_TEMPLATE, vec![Value::int(self.m as u64), root])
        } else {
            curry(&SINGLE_CHOICE_TEMPLATE, vec![root])
        }
    }

    /// Commitment hash of the encoding, computed from precalculated
    /// argument hashes.
    pub fn commitment_hash(&self, _nonce: u64) -> Hash32 {
        let root_hash = hash_atom(self.root_commitment().as_bytes());
        if self.m > 1 {
            curried_hash(
                &THRESHOLD_TEMPLATE_HASH,
                &[Value::int(self.m as u64).tree_hash(), root_hash],
            )
        } else {
            curried_hash(&SINGLE_CHOICE_TEMPLATE_HASH, &[root_hash])
        }
    }

    /// Build the proof for a chosen set of members, keyed by commitment
    /// hash. Exactly `m` spends must be supplied; absent members are never
    /// revealed.
    pub fn generate_proof(
        &self,
        to_prove: &BTreeMap<Hash32, ProvenSpend>,
    ) -> Result<ThresholdProof> {
        if to_prove.len() != self.m {
            return Err(CustodyError::InvalidProofSize {
                expected: self.m,
                actual: to_prove.len(),
            });
        }
        tracing::debug!(m = self.m, n = self.n(), "generating threshold proof");
        if self.m > 1 {
            Ok(ThresholdProof::Reveal(
                self.merkle_tree().partial_reveal(to_prove)?,
            ))
        } else {
            // Exactly one entry by the size check above
            let (commitment, spend) = to_prove
                .iter()
                .next()
                .ok_or(CustodyError::InvalidProofSize {
                    expected: self.m,
                    actual: 0,
                })?;
            let path = self.merkle_tree().proof_path(commitment)?;
            Ok(ThresholdProof::SinglePath {
                path,
                spend: spend.clone(),
            })
        }
    }

    /// Wrap a proof and the authorized action into the solution for this
    /// policy's encoding. The shape follows the proof's shape, which
    /// `generate_proof` pins to m.
    pub fn solve(
        &self,
        proof: &ThresholdProof,
        delegated_encoding: Value,
        delegated_solution: Value,
    ) -> Value {
        match proof {
            ThresholdProof::Reveal(node) => Value::list(vec![
                node.to_value(),
                delegated_encoding,
                delegated_solution,
            ]),
            ThresholdProof::SinglePath { path, spend } => Value::list(vec![
                path.to_value(),
                spend.encoding.clone(),
                spend.solution.clone(),
                delegated_encoding,
                delegated_solution,
            ]),
        }
    }
}

/// Memo hint for a threshold policy: the m value and one memo per member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdHint {
    /// The threshold value m
    pub m: usize,
    /// Member memos, in member order
    pub member_memos: Vec<Value>,
}

impl ThresholdHint {
    /// Wire form: `(m (memo1 memo2 ...))`
    pub fn to_value(&self) -> Value {
        Value::list(vec![
            Value::int(self.m as u64),
            Value::list(self.member_memos.clone()),
        ])
    }

    /// Parse the wire form
    pub fn from_value(value: &Value) -> Result<Self> {
        let items = value
            .as_list()
            .ok_or_else(|| CustodyError::invalid_spec("threshold hint is not a list"))?;
        let [m, member_memos] = items.as_slice() else {
            return Err(CustodyError::invalid_spec(
                "threshold hint must have exactly two elements",
            ));
        };
        let m = m
            .as_int()
            .ok_or_else(|| CustodyError::invalid_spec("threshold m is not an integer"))?;
        let member_memos = member_memos
            .as_list()
            .ok_or_else(|| CustodyError::invalid_spec("threshold member memos are not a list"))?;
        Ok(Self {
            m: m as usize,
            member_memos: member_memos.into_iter().cloned().collect(),
        })
    }
}
