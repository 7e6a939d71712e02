//! Governance storage trait.

use crate::StoreError;
use tidygen_types::{AccountId, ProposalId, TransactionId};

/// Trait for storing governance state (proposals, votes, treasury transactions,
/// custody balances and id counters).
///
/// Records are opaque byte blobs; encoding is owned by the engine.
pub trait GovernanceStore {
    /// Store a proposal.
    fn put_proposal(&self, id: ProposalId, data: &[u8]) -> Result<(), StoreError>;

    /// Get a proposal by id.
    fn get_proposal(&self, id: ProposalId) -> Result<Vec<u8>, StoreError>;

    /// All stored proposals, in ascending id order.
    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError>;

    /// Store a vote on a proposal.
    fn put_vote(
        &self,
        proposal: ProposalId,
        voter: &AccountId,
        data: &[u8],
    ) -> Result<(), StoreError>;

    /// Get a specific voter's vote on a proposal.
    fn get_vote(&self, proposal: ProposalId, voter: &AccountId) -> Result<Vec<u8>, StoreError>;

    /// Every stored vote across all proposals.
    fn iter_votes(&self) -> Result<Vec<Vec<u8>>, StoreError>;

    /// Store a treasury transaction.
    fn put_treasury_transaction(&self, id: TransactionId, data: &[u8]) -> Result<(), StoreError>;

    /// All stored treasury transactions, in ascending id order.
    fn iter_treasury_transactions(&self) -> Result<Vec<(TransactionId, Vec<u8>)>, StoreError>;

    /// Store an engine-level metadata value (counters, custody balances).
    fn put_meta(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Get an engine-level metadata value.
    fn get_meta(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
}
