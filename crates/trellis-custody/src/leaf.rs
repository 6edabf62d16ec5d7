//! Policy and restriction leaves
//!
//! A leaf is either Known (a concrete policy implementation that can
//! produce its commitment hash, memo fragment, and executable encoding)
//! or Unknown (a hint recovered from a decoded memo, carrying the hash
//! and memo fragment but not the structural detail needed to re-derive
//! the executable form). Any new leaf kind is a new variant here, not a
//! subclass chain.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use trellis_core::{Hash32, Value};

use crate::error::{CustodyError, Result};

/// Capability set of a concrete inner policy: a signature check, a
/// time-lock, or anything else that can authorize a spend.
pub trait SpendPolicy: fmt::Debug + Send + Sync {
    /// Memo fragment stored so a recipient can later reconstruct this
    /// policy out of band
    fn memo_fragment(&self, nonce: u64) -> Value;

    /// Executable encoding at the given nonce
    fn encoding(&self, nonce: u64) -> Value;

    /// Commitment hash at the given nonce
    fn commitment_hash(&self, nonce: u64) -> Hash32 {
        self.encoding(nonce).tree_hash()
    }
}

/// A restriction layered over an inner policy: a morpher transforms the
/// delegated action before it is checked, a validator checks it without
/// transforming.
pub trait SpendRestriction: SpendPolicy {
    /// True for a morpher, false for a validator
    fn is_morpher(&self) -> bool;
}

/// Hash + memo recovered for a policy whose executable detail was not
/// retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyHint {
    /// The policy's commitment hash
    pub commitment: Hash32,
    /// The policy's memo fragment
    pub memo: Value,
}

impl PolicyHint {
    /// Wire form: `(commitment memo)`
    pub fn to_value(&self) -> Value {
        Value::list(vec![
            Value::atom(self.commitment.as_bytes().to_vec()),
            self.memo.clone(),
        ])
    }

    /// Parse the wire form
    pub fn from_value(value: &Value) -> Result<Self> {
        let items = value
            .as_list()
            .ok_or_else(|| CustodyError::invalid_spec("policy hint is not a list"))?;
        let [commitment, memo] = items.as_slice() else {
            return Err(CustodyError::invalid_spec(
                "policy hint must have exactly two elements",
            ));
        };
        Ok(Self {
            commitment: hash_from_atom(commitment)?,
            memo: (*memo).clone(),
        })
    }
}

/// Hash + memo + morpher flag recovered for a restriction whose executable
/// detail was not retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionHint {
    /// True for a morpher, false for a validator
    pub is_morpher: bool,
    /// The restriction's commitment hash
    pub commitment: Hash32,
    /// The restriction's memo fragment
    pub memo: Value,
}

impl RestrictionHint {
    /// Wire form: `(is_morpher commitment memo)`
    pub fn to_value(&self) -> Value {
        Value::list(vec![
            Value::bool(self.is_morpher),
            Value::atom(self.commitment.as_bytes().to_vec()),
            self.memo.clone(),
        ])
    }

    /// Parse the wire form
    pub fn from_value(value: &Value) -> Result<Self> {
        let items = value
            .as_list()
            .ok_or_else(|| CustodyError::invalid_spec("restriction hint is not a list"))?;
        let [is_morpher, commitment, memo] = items.as_slice() else {
            return Err(CustodyError::invalid_spec(
                "restriction hint must have exactly three elements",
            ));
        };
        let is_morpher = is_morpher
            .as_bool()
            .ok_or_else(|| CustodyError::invalid_spec("restriction flag is not an atom"))?;
        Ok(Self {
            is_morpher,
            commitment: hash_from_atom(commitment)?,
            memo: (*memo).clone(),
        })
    }
}

/// An inner-policy leaf: concrete and executable, or a structural hint.
#[derive(Debug, Clone)]
pub enum PolicyLeaf {
    /// A concrete, executable policy
    Known(Arc<dyn SpendPolicy>),
    /// A policy recovered from a memo, identified only by its hint
    Unknown(PolicyHint),
}

impl PolicyLeaf {
    /// Wrap a concrete policy implementation
    pub fn known(policy: impl SpendPolicy + 'static) -> Self {
        PolicyLeaf::Known(Arc::new(policy))
    }

    /// Commitment hash at the given nonce
    pub fn commitment_hash(&self, nonce: u64) -> Hash32 {
        match self {
            PolicyLeaf::Known(policy) => policy.commitment_hash(nonce),
            PolicyLeaf::Unknown(hint) => hint.commitment,
        }
    }

    /// Memo fragment at the given nonce
    pub fn memo_fragment(&self, nonce: u64) -> Value {
        match self {
            PolicyLeaf::Known(policy) => policy.memo_fragment(nonce),
            PolicyLeaf::Unknown(hint) => hint.memo.clone(),
        }
    }

    /// Executable encoding at the given nonce. An Unknown leaf cannot
    /// produce one: the structural detail was never available.
    pub fn encoding(&self, nonce: u64) -> Result<Value> {
        match self {
            PolicyLeaf::Known(policy) => Ok(policy.encoding(nonce)),
            PolicyLeaf::Unknown(_) => Err(CustodyError::UnsupportedOperation {
                what: "encoding of an unknown policy",
            }),
        }
    }

    /// True for the Known variant
    pub fn is_known(&self) -> bool {
        matches!(self, PolicyLeaf::Known(_))
    }
}

/// A restriction leaf, mirroring [`PolicyLeaf`] plus the morpher flag.
#[derive(Debug, Clone)]
pub enum RestrictionLeaf {
    /// A concrete, executable restriction
    Known(Arc<dyn SpendRestriction>),
    /// A restriction recovered from a memo
    Unknown(RestrictionHint),
}

impl RestrictionLeaf {
    /// Wrap a concrete restriction implementation
    pub fn known(restriction: impl SpendRestriction + 'static) -> Self {
        RestrictionLeaf::Known(Arc::new(restriction))
    }

    /// True for a morpher, false for a validator
    pub fn is_morpher(&self) -> bool {
        match self {
            RestrictionLeaf::Known(restriction) => restriction.is_morpher(),
            RestrictionLeaf::Unknown(hint) => hint.is_morpher,
        }
    }

    /// Commitment hash at the given nonce
    pub fn commitment_hash(&self, nonce: u64) -> Hash32 {
        match self {
            RestrictionLeaf::Known(restriction) => restriction.commitment_hash(nonce),
            RestrictionLeaf::Unknown(hint) => hint.commitment,
        }
    }

    /// Memo fragment at the given nonce
    pub fn memo_fragment(&self, nonce: u64) -> Value {
        match self {
            RestrictionLeaf::Known(restriction) => restriction.memo_fragment(nonce),
            RestrictionLeaf::Unknown(hint) => hint.memo.clone(),
        }
    }

    /// Executable encoding at the given nonce; fails for Unknown.
    pub fn encoding(&self, nonce: u64) -> Result<Value> {
        match self {
            RestrictionLeaf::Known(restriction) => Ok(restriction.encoding(nonce)),
            RestrictionLeaf::Unknown(_) => Err(CustodyError::UnsupportedOperation {
                what: "encoding of an unknown restriction",
            }),
        }
    }

    /// The hint describing this leaf at the given nonce
    pub fn hint(&self, nonce: u64) -> RestrictionHint {
        RestrictionHint {
            is_morpher: self.is_morpher(),
            commitment: self.commitment_hash(nonce),
            memo: self.memo_fragment(nonce),
        }
    }

    /// True for the Known variant
    pub fn is_known(&self) -> bool {
        matches!(self, RestrictionLeaf::Known(_))
    }
}

/// A resolved leaf as stored in a fill-in registry, tagged by category so
/// a restriction hash can never install a bare policy (and vice versa).
#[derive(Debug, Clone)]
pub enum KnownLeaf {
    /// A concrete inner policy
    Policy(Arc<dyn SpendPolicy>),
    /// A concrete restriction
    Restriction(Arc<dyn SpendRestriction>),
}

/// An unresolved leaf collected from a policy tree, keyed by commitment
/// hash in [`crate::node::PolicyNode::unknown_leaves`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnknownLeaf {
    /// An unknown inner policy
    Policy(PolicyHint),
    /// An unknown restriction
    Restriction(RestrictionHint),
}

fn hash_from_atom(value: &Value) -> Result<Hash32> {
    let bytes = value
        .as_atom()
        .ok_or_else(|| CustodyError::invalid_spec("commitment hash is not an atom"))?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| CustodyError::invalid_spec("commitment hash is not 32 bytes"))?;
    Ok(Hash32::new(bytes))
}
