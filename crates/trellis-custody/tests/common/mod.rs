//! Shared test drivers: minimal Known policies with distinct commitments.

// Not every integration test uses every helper
#![allow(dead_code)]

use trellis_core::Value;
use trellis_custody::{PolicyLeaf, PolicyNode, SpendPolicy, SpendRestriction, ThresholdPolicy};

/// A trivial policy distinguished only by an id.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderPolicy(pub u64);

impl SpendPolicy for PlaceholderPolicy {
    fn memo_fragment(&self, _nonce: u64) -> Value {
        Value::nil()
    }

    fn encoding(&self, _nonce: u64) -> Value {
        Value::list(vec![Value::int(1), Value::int(self.0)])
    }
}

/// A trivial restriction distinguished by an id and the morpher flag.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderRestriction {
    pub id: u64,
    pub morpher: bool,
}

impl SpendPolicy for PlaceholderRestriction {
    fn memo_fragment(&self, _nonce: u64) -> Value {
        Value::int(self.id)
    }

    fn encoding(&self, _nonce: u64) -> Value {
        Value::list(vec![Value::int(3), Value::int(self.id)])
    }
}

impl SpendRestriction for PlaceholderRestriction {
    fn is_morpher(&self) -> bool {
        self.morpher
    }
}

/// A bare node wrapping one placeholder policy.
pub fn leaf_node(nonce: u64, id: u64) -> PolicyNode {
    PolicyNode::new(nonce, vec![], PolicyLeaf::known(PlaceholderPolicy(id)))
}

/// An m-of-n node over bare placeholder members with ids `0..n`.
pub fn threshold_node(nonce: u64, m: usize, n: usize) -> PolicyNode {
    let members = (0..n as u64).map(|id| leaf_node(id, id)).collect();
    PolicyNode::new(
        nonce,
        vec![],
        ThresholdPolicy::new(m, members).expect("distinct placeholder members"),
    )
}
