//! Treasury transaction records.

use serde::{Deserialize, Serialize};
use tidygen_types::{AccountId, AssetId, ProposalId, Timestamp, TransactionId};

/// A pending or completed fund movement owned by a Treasury-kind proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryTransaction {
    pub id: TransactionId,
    pub proposal_id: ProposalId,
    pub recipient: AccountId,
    pub amount: u128,
    pub asset: AssetId,
    /// Flips once, in the same step that moves the funds.
    pub executed: bool,
    pub created_at: Timestamp,
    pub executed_at: Option<Timestamp>,
}
