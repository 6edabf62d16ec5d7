//! Commitment and encoding wrapping on the policy composite.

mod common;

use common::{leaf_node, threshold_node, PlaceholderPolicy, PlaceholderRestriction};
use trellis_core::{
    curried_hash, list_hash, Value, INDEX_WRAPPER_HASH, RESTRICTION_TEMPLATE_HASH,
};
use trellis_custody::{PolicyLeaf, PolicyNode, RestrictionLeaf, SpendPolicy};

fn restriction(id: u64, morpher: bool) -> RestrictionLeaf {
    RestrictionLeaf::known(PlaceholderRestriction { id, morpher })
}

#[test]
fn zero_restrictions_wrap_by_index_only() {
    let policy = PlaceholderPolicy(8);
    let node = PolicyNode::new(7, vec![], PolicyLeaf::known(policy));
    let expected = curried_hash(
        &INDEX_WRAPPER_HASH,
        &[Value::int(7).tree_hash(), policy.commitment_hash(7)],
    );
    assert_eq!(node.commitment_hash(), expected);
}

#[test]
fn zero_restrictions_differ_from_empty_restriction_wrap() {
    // Zero restrictions elide the layer; an empty-but-present wrap is a
    // different hash and must never be produced
    let policy = PlaceholderPolicy(8);
    let node = PolicyNode::new(7, vec![], PolicyLeaf::known(policy));
    let empty_wrap = curried_hash(
        &RESTRICTION_TEMPLATE_HASH,
        &[list_hash(&[]), list_hash(&[]), policy.commitment_hash(7)],
    );
    let hypothetical = curried_hash(
        &INDEX_WRAPPER_HASH,
        &[Value::int(7).tree_hash(), empty_wrap],
    );
    assert_ne!(node.commitment_hash(), hypothetical);
}

#[test]
fn encoding_hash_matches_commitment_hash() {
    let cases = [
        leaf_node(3, 9),
        threshold_node(4, 2, 3),
        threshold_node(5, 1, 4),
        PolicyNode::new(
            6,
            vec![restriction(1, true), restriction(2, false), restriction(3, true)],
            PolicyLeaf::known(PlaceholderPolicy(12)),
        ),
    ];
    for node in &cases {
        assert_eq!(
            node.encoding().unwrap().tree_hash(),
            node.commitment_hash(),
            "nonce={}",
            node.nonce()
        );
    }
}

#[test]
fn nonce_diversifies_commitments() {
    let a = leaf_node(1, 50);
    let b = PolicyNode::new(2, vec![], PolicyLeaf::known(PlaceholderPolicy(50)));
    assert_ne!(a.commitment_hash(), b.commitment_hash());
}

#[test]
fn restriction_order_within_partitions_matters() {
    let forward = PolicyNode::new(
        6,
        vec![restriction(1, false), restriction(2, false)],
        PolicyLeaf::known(PlaceholderPolicy(12)),
    );
    let reversed = PolicyNode::new(
        6,
        vec![restriction(2, false), restriction(1, false)],
        PolicyLeaf::known(PlaceholderPolicy(12)),
    );
    assert_ne!(forward.commitment_hash(), reversed.commitment_hash());
}

#[test]
fn morpher_and_validator_partitions_are_distinct() {
    let as_morpher = PolicyNode::new(
        6,
        vec![restriction(1, true)],
        PolicyLeaf::known(PlaceholderPolicy(12)),
    );
    let as_validator = PolicyNode::new(
        6,
        vec![restriction(1, false)],
        PolicyLeaf::known(PlaceholderPolicy(12)),
    );
    assert_ne!(as_morpher.commitment_hash(), as_validator.commitment_hash());
}

#[test]
fn solution_triple_matches_curry_order() {
    let node = PolicyNode::new(
        6,
        vec![restriction(1, true), restriction(2, false)],
        PolicyLeaf::known(PlaceholderPolicy(12)),
    );
    let solution = node.solve(
        vec![Value::int(10)],
        vec![Value::int(20)],
        Value::atom(b"inner".to_vec()),
    );
    let items = solution.as_list().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_list().unwrap().len(), 1);
    assert_eq!(items[1].as_list().unwrap().len(), 1);
    assert_eq!(items[2].as_atom(), Some(&b"inner"[..]));
}

#[test]
fn nested_thresholds_commit_recursively() {
    let inner = threshold_node(1, 2, 3);
    let outer_members = vec![inner, leaf_node(8, 8), leaf_node(9, 9)];
    let outer = PolicyNode::new(
        0,
        vec![],
        trellis_custody::ThresholdPolicy::new(2, outer_members).unwrap(),
    );
    // Rebuilding the same structure commits identically
    let again = PolicyNode::new(
        0,
        vec![],
        trellis_custody::ThresholdPolicy::new(
            2,
            vec![threshold_node(1, 2, 3), leaf_node(8, 8), leaf_node(9, 9)],
        )
        .unwrap(),
    );
    assert_eq!(outer.commitment_hash(), again.commitment_hash());
}
