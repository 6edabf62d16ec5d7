//! Structural properties of partial-reveal proofs over random member sets
//! and random chosen subsets.

mod common;

use std::collections::BTreeMap;

use common::leaf_node;
use proptest::prelude::*;
use trellis_core::Value;
use trellis_custody::{PolicyNode, ProofNode, ProvenSpend, ThresholdPolicy, ThresholdProof};

fn collect_revealed(node: &ProofNode, out: &mut Vec<Value>) {
    match node {
        ProofNode::Collapsed(_) => {}
        ProofNode::Reveal(spend) => out.push(spend.encoding.clone()),
        ProofNode::Branch(first, rest) => {
            collect_revealed(first, out);
            collect_revealed(rest, out);
        }
    }
}

fn chosen_subsets() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (2usize..8)
        .prop_flat_map(|n| (Just(n), 2..=n))
        .prop_flat_map(|(n, m)| {
            let indices: Vec<usize> = (0..n).collect();
            (Just(n), proptest::sample::subsequence(indices, m))
        })
}

proptest! {
    #[test]
    fn partial_reveal_exposes_exactly_the_chosen((n, chosen) in chosen_subsets()) {
        let members: Vec<PolicyNode> = (0..n as u64).map(|id| leaf_node(id, id)).collect();
        let threshold = ThresholdPolicy::new(chosen.len(), members.clone()).unwrap();

        let to_prove: BTreeMap<_, _> = chosen
            .iter()
            .map(|index| {
                let member = &members[*index];
                (
                    member.commitment_hash(),
                    ProvenSpend {
                        encoding: member.encoding().unwrap(),
                        solution: Value::nil(),
                    },
                )
            })
            .collect();
        let proof = threshold.generate_proof(&to_prove).unwrap();
        let ThresholdProof::Reveal(node) = proof else {
            panic!("m > 1 must produce a partial reveal");
        };

        // Exactly the chosen leaves are revealed, nothing else
        prop_assert_eq!(node.revealed_count(), chosen.len());
        let mut revealed = Vec::new();
        collect_revealed(&node, &mut revealed);
        let mut expected: Vec<Value> = chosen
            .iter()
            .map(|index| members[*index].encoding().unwrap())
            .collect();
        revealed.sort_by_key(|encoding| encoding.tree_hash());
        expected.sort_by_key(|encoding| encoding.tree_hash());
        prop_assert_eq!(revealed, expected);

        // The proof re-derives the committed root
        prop_assert_eq!(node.reconstruct_root(), threshold.root_commitment());

        // Collapsed siblings stay logarithmic per revealed leaf
        let depth_bound = usize::BITS - (n - 1).leading_zeros();
        prop_assert!(node.collapsed_count() <= chosen.len() * depth_bound as usize + 1);
    }

    #[test]
    fn inclusion_paths_verify_for_every_member(n in 1usize..9) {
        let members: Vec<PolicyNode> = (0..n as u64).map(|id| leaf_node(id, id)).collect();
        let threshold = ThresholdPolicy::new(1, members.clone()).unwrap();
        for member in &members {
            let to_prove: BTreeMap<_, _> = [(
                member.commitment_hash(),
                ProvenSpend {
                    encoding: member.encoding().unwrap(),
                    solution: Value::nil(),
                },
            )]
            .into_iter()
            .collect();
            let proof = threshold.generate_proof(&to_prove).unwrap();
            let ThresholdProof::SinglePath { path, .. } = proof else {
                panic!("m == 1 must produce the single-path proof");
            };
            prop_assert_eq!(
                path.reconstruct_root(&member.commitment_hash()),
                threshold.root_commitment()
            );
        }
    }
}
