//! Binary value tree
//!
//! The encoding underneath every policy artifact is a binary tree of byte
//! atoms. Lists are right-nested pairs terminated by the nil atom, integers
//! are minimal big-endian atoms, and booleans are `1`/nil. The tree hash of
//! a value is the commitment the rest of the architecture is built on.

use serde::{Deserialize, Serialize};

use crate::hash::{hash_atom, hash_pair, Hash32};

/// A node in the binary value tree: either a byte atom or a pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// A byte atom
    Atom(#[serde(with = "serde_bytes")] Vec<u8>),
    /// An ordered pair of subtrees
    Pair(Box<Value>, Box<Value>),
}

impl Value {
    /// The nil atom (empty bytes). Terminates lists and encodes `false`.
    pub fn nil() -> Self {
        Value::Atom(Vec::new())
    }

    /// Build an atom from bytes
    pub fn atom(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Atom(bytes.into())
    }

    /// Build a pair of two values
    pub fn pair(first: Value, rest: Value) -> Self {
        Value::Pair(Box::new(first), Box::new(rest))
    }

    /// Build a proper list: right-nested pairs terminated by nil
    pub fn list(items: Vec<Value>) -> Self {
        let mut value = Value::nil();
        for item in items.into_iter().rev() {
            value = Value::pair(item, value);
        }
        value
    }

    /// Encode an unsigned integer as a minimal big-endian atom.
    /// Zero encodes as the nil atom.
    pub fn int(n: u64) -> Self {
        let bytes = n.to_be_bytes();
        let first_nonzero = bytes.iter().position(|b| *b != 0).unwrap_or(8);
        Value::Atom(bytes[first_nonzero..].to_vec())
    }

    /// Encode a boolean: `true` is the atom `1`, `false` is nil.
    pub fn bool(b: bool) -> Self {
        if b {
            Value::int(1)
        } else {
            Value::nil()
        }
    }

    /// True when this value is the nil atom
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Atom(bytes) if bytes.is_empty())
    }

    /// True when this value is any atom
    pub fn is_atom(&self) -> bool {
        matches!(self, Value::Atom(_))
    }

    /// Atom bytes, or None for a pair
    pub fn as_atom(&self) -> Option<&[u8]> {
        match self {
            Value::Atom(bytes) => Some(bytes),
            Value::Pair(..) => None,
        }
    }

    /// Both halves of a pair, or None for an atom
    pub fn as_pair(&self) -> Option<(&Value, &Value)> {
        match self {
            Value::Atom(_) => None,
            Value::Pair(first, rest) => Some((first, rest)),
        }
    }

    /// Decode a minimal big-endian integer atom. Fails on pairs, atoms
    /// longer than 8 bytes, and non-minimal encodings (leading zero).
    pub fn as_int(&self) -> Option<u64> {
        let bytes = self.as_atom()?;
        if bytes.len() > 8 || bytes.first() == Some(&0) {
            return None;
        }
        let mut n: u64 = 0;
        for byte in bytes {
            n = (n << 8) | u64::from(*byte);
        }
        Some(n)
    }

    /// Decode a boolean: nil is false, anything else is true.
    /// Fails on pairs.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_atom().map(|bytes| !bytes.is_empty())
    }

    /// Collect the elements of a proper list. Fails if the right spine
    /// does not terminate in nil.
    pub fn as_list(&self) -> Option<Vec<&Value>> {
        let mut items = Vec::new();
        let mut cursor = self;
        loop {
            match cursor {
                Value::Atom(bytes) if bytes.is_empty() => return Some(items),
                Value::Atom(_) => return None,
                Value::Pair(first, rest) => {
                    items.push(first.as_ref());
                    cursor = rest;
                }
            }
        }
    }

    /// Commitment hash of the whole tree
    pub fn tree_hash(&self) -> Hash32 {
        match self {
            Value::Atom(bytes) => hash_atom(bytes),
            Value::Pair(first, rest) => hash_pair(&first.tree_hash(), &rest.tree_hash()),
        }
    }
}

/// Instantiate a template with arguments.
///
/// The curried form is `(template . (arg1 arg2 ... argN))`, chosen so that
/// its tree hash is derivable from the template hash and the argument
/// hashes alone (see [`curried_hash`]).
pub fn curry(template: &Value, args: Vec<Value>) -> Value {
    Value::pair(template.clone(), Value::list(args))
}

/// Hash of a nil-terminated list given only the element hashes
pub fn list_hash(element_hashes: &[Hash32]) -> Hash32 {
    let mut acc = hash_atom(&[]);
    for element in element_hashes.iter().rev() {
        acc = hash_pair(element, &acc);
    }
    acc
}

/// Hash of a curried form given the template hash and precomputed argument
/// hashes, without materializing the argument values.
///
/// Invariant: `curried_hash(t.tree_hash(), &args.map(tree_hash))` equals
/// `curry(&t, args).tree_hash()`.
pub fn curried_hash(template_hash: &Hash32, arg_hashes: &[Hash32]) -> Hash32 {
    hash_pair(template_hash, &list_hash(arg_hashes))
}
