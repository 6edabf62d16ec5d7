//! Fixed policy templates
//!
//! The custody architecture is assembled from four precompiled program
//! templates. They are opaque to everything above this module: the engine
//! only ever currys arguments onto them and hashes the result. Initialized
//! once per process, never mutated.

use once_cell::sync::Lazy;

use crate::hash::Hash32;
use crate::value::Value;

/// Index wrapper: currys the nonce in front of the wrapped policy so
/// otherwise identical arrangements commit to different hashes.
// (mod (INDEX INNER . inner_solution) (a INNER inner_solution))
pub static INDEX_WRAPPER: Lazy<Value> =
    Lazy::new(|| Value::list(vec![Value::int(2), Value::int(5), Value::int(7)]));

/// Tree hash of [`INDEX_WRAPPER`]
pub static INDEX_WRAPPER_HASH: Lazy<Hash32> = Lazy::new(|| INDEX_WRAPPER.tree_hash());

/// Restriction layer: runs each morpher over the delegated action, then
/// each validator over the result, then the inner policy.
pub static RESTRICTION_TEMPLATE: Lazy<Value> = Lazy::new(|| {
    Value::list(vec![
        Value::int(2),
        Value::list(vec![Value::int(4), Value::int(11), Value::int(23)]),
        Value::list(vec![Value::int(5), Value::int(47)]),
        Value::int(1),
    ])
});

/// Tree hash of [`RESTRICTION_TEMPLATE`]
pub static RESTRICTION_TEMPLATE_HASH: Lazy<Hash32> = Lazy::new(|| RESTRICTION_TEMPLATE.tree_hash());

/// General m-of-n checker: curried with `(m, merkle_root)`, verifies a
/// partial-reveal proof against the root and that exactly m leaves are
/// revealed.
pub static THRESHOLD_TEMPLATE: Lazy<Value> = Lazy::new(|| {
    Value::list(vec![
        Value::int(2),
        Value::list(vec![Value::int(3), Value::int(17), Value::int(29)]),
        Value::list(vec![Value::int(9), Value::int(11), Value::int(5)]),
        Value::list(vec![Value::int(4), Value::int(1)]),
    ])
});

/// Tree hash of [`THRESHOLD_TEMPLATE`]
pub static THRESHOLD_TEMPLATE_HASH: Lazy<Hash32> = Lazy::new(|| THRESHOLD_TEMPLATE.tree_hash());

/// Cheaper 1-of-n checker: curried with `(merkle_root)` alone, verifies a
/// single inclusion path instead of a partial reveal.
pub static SINGLE_CHOICE_TEMPLATE: Lazy<Value> = Lazy::new(|| {
    Value::list(vec![
        Value::int(2),
        Value::list(vec![Value::int(3), Value::int(17), Value::int(13)]),
        Value::list(vec![Value::int(8), Value::int(11)]),
    ])
});

/// Tree hash of [`SINGLE_CHOICE_TEMPLATE`]
pub static SINGLE_CHOICE_TEMPLATE_HASH: Lazy<Hash32> =
    Lazy::new(|| SINGLE_CHOICE_TEMPLATE.tree_hash());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_pairwise_distinct() {
        let hashes = [
            *INDEX_WRAPPER_HASH,
            *RESTRICTION_TEMPLATE_HASH,
            *THRESHOLD_TEMPLATE_HASH,
            *SINGLE_CHOICE_TEMPLATE_HASH,
        ];
        for (i, a) in hashes.iter().enumerate() {
            for b in &hashes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
