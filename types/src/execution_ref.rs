//! Execution references: binding hashes tying a proposal to the action it authorizes.

use crate::{AccountId, AssetId, Timestamp};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

type Blake2b256 = Blake2b<U32>;

const TREASURY_TRANSFER_TAG: &[u8] = b"tidygen-treasury-transfer";

/// A 32-byte opaque execution reference.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionRef([u8; 32]);

impl ExecutionRef {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Derive the reference for a treasury transfer.
    ///
    /// Deterministic over (recipient, amount, asset, timestamp): the same inputs
    /// always produce the same reference, and changing any of them changes it.
    pub fn treasury_transfer(
        recipient: &AccountId,
        amount: u128,
        asset: &AssetId,
        at: Timestamp,
    ) -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(TREASURY_TRANSFER_TAG);
        hasher.update(recipient.as_bytes());
        hasher.update(amount.to_be_bytes());
        hasher.update(asset.encode());
        hasher.update(at.as_secs().to_be_bytes());
        let result = hasher.finalize();
        let mut output = [0u8; 32];
        output.copy_from_slice(&result);
        Self(output)
    }
}

impl fmt::Debug for ExecutionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecutionRef({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ExecutionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
