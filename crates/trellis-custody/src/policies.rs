//! Concrete spend policies
//!
//! Example leaf implementations shipped with the engine: an ed25519
//! signature check and a time-lock validator. Each carries its own
//! template, private to this module; the architecture above treats them
//! like any other [`SpendPolicy`] / [`SpendRestriction`].

use ed25519_dalek::VerifyingKey;
use once_cell::sync::Lazy;
use trellis_core::{curry, Value};

use crate::leaf::{SpendPolicy, SpendRestriction};

static SIGNATURE_TEMPLATE: Lazy<Value> = Lazy::new(|| {
    Value::list(vec![
        Value::int(2),
        Value::list(vec![Value::int(50), Value::int(11)]),
        Value::int(1),
    ])
});

static TIMELOCK_TEMPLATE: Lazy<Value> = Lazy::new(|| {
    Value::list(vec![
        Value::int(2),
        Value::list(vec![Value::int(80), Value::int(5)]),
        Value::int(1),
    ])
});

/// A member policy authorized by one ed25519 key.
#[derive(Debug, Clone)]
pub struct SignatureMember {
    key: VerifyingKey,
}

impl SignatureMember {
    /// Build a signature-check policy for the given verifying key
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// The verifying key this member checks against
    pub fn key(&self) -> &VerifyingKey {
        &self.key
    }
}

impl SpendPolicy for SignatureMember {
    fn memo_fragment(&self, _nonce: u64) -> Value {
        Value::nil()
    }

    fn encoding(&self, _nonce: u64) -> Value {
        curry(
            &SIGNATURE_TEMPLATE,
            vec![Value::atom(self.key.to_bytes().to_vec())],
        )
    }
}

/// A validator restriction that rejects spends before a cutoff.
#[derive(Debug, Clone, Copy)]
pub struct TimelockValidator {
    seconds: u64,
}

impl TimelockValidator {
    /// Build a time-lock for the given number of seconds
    pub fn new(seconds: u64) -> Self {
        Self { seconds }
    }

    /// The lock duration in seconds
    pub fn seconds(&self) -> u64 {
        self.seconds
    }
}

impl SpendPolicy for TimelockValidator {
    fn memo_fragment(&self, _nonce: u64) -> Value {
        Value::int(self.seconds)
    }

    fn encoding(&self, _nonce: u64) -> Value {
        curry(&TIMELOCK_TEMPLATE, vec![Value::int(self.seconds)])
    }
}

impl SpendRestriction for TimelockValidator {
    fn is_morpher(&self) -> bool {
        false
    }
}
