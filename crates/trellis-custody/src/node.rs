//! The top-level policy composite
//!
//! A [`PolicyNode`] is what an outer wallet layer actually commits to: a
//! nonce, zero or more restriction leaves, and one inner policy, either a
//! single leaf or an m-of-n threshold whose members are themselves policy
//! nodes.
//! It produces the three on-chain artifacts (commitment hash, executable
//! encoding, memo) and round-trips from a stored memo back into a tree of
//! Unknown leaves that a registry can later resolve.
//!
//! Trees are immutable values. The only transform is `fill_in_unknown`,
//! which rebuilds the tree with resolved leaves and never mutates in
//! place.

use std::collections::BTreeMap;
use std::sync::Arc;

use trellis_core::{
    curried_hash, curry, list_hash, serialization, Hash32, Value, INDEX_WRAPPER,
    INDEX_WRAPPER_HASH, RESTRICTION_TEMPLATE, RESTRICTION_TEMPLATE_HASH,
};

use crate::error::{CustodyError, Result};
use crate::leaf::{KnownLeaf, PolicyHint, PolicyLeaf, RestrictionHint, RestrictionLeaf, UnknownLeaf};
use crate::threshold::{ThresholdHint, ThresholdPolicy};

/// Namespace tag carried by every policy memo. Decoding a memo without
/// this exact tag fails with [`CustodyError::InvalidSpec`].
pub const POLICY_MEMO_NAMESPACE: &str = "trellis_inner_policy";

/// The inner policy of a node: a threshold over further nodes, or a single
/// leaf.
#[derive(Debug, Clone)]
pub enum InnerPolicy {
    /// An m-of-n threshold whose members nest recursively
    Threshold(ThresholdPolicy),
    /// A single policy leaf
    Leaf(PolicyLeaf),
}

impl From<ThresholdPolicy> for InnerPolicy {
    fn from(threshold: ThresholdPolicy) -> Self {
        InnerPolicy::Threshold(threshold)
    }
}

impl From<PolicyLeaf> for InnerPolicy {
    fn from(leaf: PolicyLeaf) -> Self {
        InnerPolicy::Leaf(leaf)
    }
}

/// A nonce-diversified policy with an optional restriction layer.
#[derive(Debug, Clone)]
pub struct PolicyNode {
    nonce: u64,
    restrictions: Vec<RestrictionLeaf>,
    inner: InnerPolicy,
}

impl PolicyNode {
    /// Build a policy node. The nonce is arbitrary and exists only so
    /// otherwise identical custody arrangements commit to different
    /// hashes.
    pub fn new(nonce: u64, restrictions: Vec<RestrictionLeaf>, inner: impl Into<InnerPolicy>) -> Self {
        Self {
            nonce,
            restrictions,
            inner: inner.into(),
        }
    }

    /// The diversification nonce
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The ordered restriction leaves
    pub fn restrictions(&self) -> &[RestrictionLeaf] {
        &self.restrictions
    }

    /// The inner policy
    pub fn inner(&self) -> &InnerPolicy {
        &self.inner
    }

    fn inner_commitment(&self) -> Hash32 {
        match &self.inner {
            InnerPolicy::Threshold(threshold) => threshold.commitment_hash(self.nonce),
            InnerPolicy::Leaf(leaf) => leaf.commitment_hash(self.nonce),
        }
    }

    /// Commitment hash of the whole node.
    ///
    /// With restrictions present, the inner hash is wrapped by the
    /// restriction template curried with the morpher and validator hash
    /// lists (original order preserved within each partition). With zero
    /// restrictions that layer is elided entirely; there is no
    /// empty-but-present restriction state. The index wrapper with the
    /// nonce is always applied last.
    pub fn commitment_hash(&self) -> Hash32 {
        let inner_hash = self.inner_commitment();
        let wrapped = if self.restrictions.is_empty() {
            inner_hash
        } else {
            let morphers: Vec<Hash32> = self
                .restrictions
                .iter()
                .filter(|restriction| restriction.is_morpher())
                .map(|restriction| restriction.commitment_hash(self.nonce))
                .collect();
            let validators: Vec<Hash32> = self
                .restrictions
                .iter()
                .filter(|restriction| !restriction.is_morpher())
                .map(|restriction| restriction.commitment_hash(self.nonce))
                .collect();
            curried_hash(
                &RESTRICTION_TEMPLATE_HASH,
                &[list_hash(&morphers), list_hash(&validators), inner_hash],
            )
        };
        curried_hash(
            &INDEX_WRAPPER_HASH,
            &[Value::int(self.nonce).tree_hash(), wrapped],
        )
    }

    /// Executable encoding of the whole node: the same wrapping as
    /// [`Self::commitment_hash`] over instantiated encodings. Fails with
    /// [`CustodyError::UnsupportedOperation`] if any leaf is Unknown.
    pub fn encoding(&self) -> Result<Value> {
        let inner_encoding = match &self.inner {
            InnerPolicy::Threshold(threshold) => threshold.encoding(self.nonce),
            InnerPolicy::Leaf(leaf) => leaf.encoding(self.nonce)?,
        };
        let wrapped = if self.restrictions.is_empty() {
            inner_encoding
        } else {
            let mut morphers = Vec::new();
            let mut validators = Vec::new();
            for restriction in &self.restrictions {
                let encoding = restriction.encoding(self.nonce)?;
                if restriction.is_morpher() {
                    morphers.push(encoding);
                } else {
                    validators.push(encoding);
                }
            }
            curry(
                &RESTRICTION_TEMPLATE,
                vec![Value::list(morphers), Value::list(validators), inner_encoding],
            )
        };
        Ok(curry(&INDEX_WRAPPER, vec![Value::int(self.nonce), wrapped]))
    }

    /// Build the self-describing memo for this node. Threshold inners
    /// recurse into each member's memo; leaf inners carry their hint.
    pub fn memo(&self) -> Value {
        let restriction_hints: Vec<Value> = self
            .restrictions
            .iter()
            .map(|restriction| restriction.hint(self.nonce).to_value())
            .collect();

        let (is_threshold, hint) = match &self.inner {
            InnerPolicy::Threshold(threshold) => (
                true,
                ThresholdHint {
                    m: threshold.m(),
                    member_memos: threshold.members().iter().map(PolicyNode::memo).collect(),
                }
                .to_value(),
            ),
            InnerPolicy::Leaf(leaf) => (
                false,
                PolicyHint {
                    commitment: leaf.commitment_hash(self.nonce),
                    memo: leaf.memo_fragment(self.nonce),
                }
                .to_value(),
            ),
        };

        Value::pair(
            Value::atom(POLICY_MEMO_NAMESPACE.as_bytes().to_vec()),
            Value::list(vec![
                Value::int(self.nonce),
                Value::list(restriction_hints),
                Value::bool(is_threshold),
                hint,
            ]),
        )
    }

    /// Reconstruct a policy node from a memo. Every leaf in the result is
    /// Unknown: structural shape, restriction flags, and hashes are
    /// preserved exactly, executable detail is not.
    pub fn from_memo(memo: &Value) -> Result<Self> {
        let (tag, body) = memo
            .as_pair()
            .ok_or_else(|| CustodyError::invalid_spec("memo is not a tagged pair"))?;
        if tag.as_atom() != Some(POLICY_MEMO_NAMESPACE.as_bytes()) {
            return Err(CustodyError::invalid_spec(
                "memo does not carry the expected namespace tag",
            ));
        }
        let items = body
            .as_list()
            .ok_or_else(|| CustodyError::invalid_spec("memo body is not a list"))?;
        let [nonce, restriction_hints, is_threshold, hint] = items.as_slice() else {
            return Err(CustodyError::invalid_spec(
                "memo body must have exactly four elements",
            ));
        };
        let nonce = nonce
            .as_int()
            .ok_or_else(|| CustodyError::invalid_spec("memo nonce is not an integer"))?;
        let restrictions = restriction_hints
            .as_list()
            .ok_or_else(|| CustodyError::invalid_spec("memo restriction hints are not a list"))?
            .into_iter()
            .map(|hint| Ok(RestrictionLeaf::Unknown(RestrictionHint::from_value(hint)?)))
            .collect::<Result<Vec<_>>>()?;
        let is_threshold = is_threshold
            .as_bool()
            .ok_or_else(|| CustodyError::invalid_spec("memo threshold flag is not an atom"))?;

        let inner = if is_threshold {
            let threshold_hint = ThresholdHint::from_value(hint)?;
            let members = threshold_hint
                .member_memos
                .iter()
                .map(Self::from_memo)
                .collect::<Result<Vec<_>>>()?;
            InnerPolicy::Threshold(ThresholdPolicy::new(threshold_hint.m, members)?)
        } else {
            InnerPolicy::Leaf(PolicyLeaf::Unknown(PolicyHint::from_value(hint)?))
        };

        tracing::trace!(nonce, "reconstructed policy node from memo");
        Ok(Self::new(nonce, restrictions, inner))
    }

    /// Canonical storage bytes for the memo
    pub fn memo_bytes(&self) -> Result<Vec<u8>> {
        serialization::to_vec(&self.memo())
            .map_err(|e| CustodyError::invalid_spec(format!("memo serialization failed: {e}")))
    }

    /// Reconstruct a policy node from canonical storage bytes
    pub fn from_memo_bytes(bytes: &[u8]) -> Result<Self> {
        let memo: Value = serialization::from_slice(bytes)
            .map_err(|e| CustodyError::invalid_spec(format!("memo bytes failed to decode: {e}")))?;
        Self::from_memo(&memo)
    }

    /// Collect every Unknown leaf in the tree, keyed by commitment hash.
    /// Restriction entries are inserted after policy entries at every
    /// level, so a restriction hint wins when a hash appears in both
    /// categories.
    pub fn unknown_leaves(&self) -> BTreeMap<Hash32, UnknownLeaf> {
        let mut unknown = BTreeMap::new();
        match &self.inner {
            InnerPolicy::Leaf(PolicyLeaf::Unknown(hint)) => {
                unknown.insert(hint.commitment, UnknownLeaf::Policy(hint.clone()));
            }
            InnerPolicy::Leaf(PolicyLeaf::Known(_)) => {}
            InnerPolicy::Threshold(threshold) => {
                for member in threshold.members() {
                    unknown.extend(member.unknown_leaves());
                }
            }
        }
        for restriction in &self.restrictions {
            if let RestrictionLeaf::Unknown(hint) = restriction {
                unknown.insert(hint.commitment, UnknownLeaf::Restriction(hint.clone()));
            }
        }
        unknown
    }

    /// Rebuild the tree with Unknown leaves resolved against a registry
    /// keyed by commitment hash. A hit of the wrong category (a policy
    /// entry for a restriction slot, or vice versa) leaves the leaf
    /// Unknown. The original tree is never mutated; applying the same
    /// registry twice is a no-op the second time.
    pub fn fill_in_unknown(&self, registry: &BTreeMap<Hash32, KnownLeaf>) -> Self {
        let restrictions = self
            .restrictions
            .iter()
            .map(|restriction| match restriction {
                RestrictionLeaf::Unknown(hint) => match registry.get(&hint.commitment) {
                    Some(KnownLeaf::Restriction(known)) => {
                        tracing::trace!(commitment = %hint.commitment, "resolved unknown restriction");
                        RestrictionLeaf::Known(Arc::clone(known))
                    }
                    _ => restriction.clone(),
                },
                known => known.clone(),
            })
            .collect();

        let inner = match &self.inner {
            InnerPolicy::Leaf(PolicyLeaf::Unknown(hint)) => match registry.get(&hint.commitment) {
                Some(KnownLeaf::Policy(known)) => {
                    tracing::trace!(commitment = %hint.commitment, "resolved unknown policy");
                    InnerPolicy::Leaf(PolicyLeaf::Known(Arc::clone(known)))
                }
                _ => self.inner.clone(),
            },
            InnerPolicy::Leaf(PolicyLeaf::Known(_)) => self.inner.clone(),
            InnerPolicy::Threshold(threshold) => InnerPolicy::Threshold(
                threshold.with_members(
                    threshold
                        .members()
                        .iter()
                        .map(|member| member.fill_in_unknown(registry))
                        .collect(),
                ),
            ),
        };

        Self::new(self.nonce, restrictions, inner)
    }

    /// Assemble the final solution triple. The order (morpher solutions,
    /// validator solutions, inner solution) matches the currying order of
    /// the restriction wrap in [`Self::encoding`].
    pub fn solve(
        &self,
        morpher_solutions: Vec<Value>,
        validator_solutions: Vec<Value>,
        inner_solution: Value,
    ) -> Value {
        Value::list(vec![
            Value::list(morpher_solutions),
            Value::list(validator_solutions),
            inner_solution,
        ])
    }
}
