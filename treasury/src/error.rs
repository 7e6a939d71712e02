//! Treasury-specific errors.

use thiserror::Error;
use tidygen_governance::GovernanceError;
use tidygen_types::{AssetId, ProposalId, TransactionId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreasuryError {
    #[error("recipient must not be the null address")]
    InvalidRecipient,

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("treasury transaction {transaction_id} (proposal {proposal_id}) has already been executed")]
    AlreadyExecuted {
        transaction_id: TransactionId,
        proposal_id: ProposalId,
    },

    #[error("transfer for treasury transaction {transaction_id} failed: {reason}")]
    TransferFailed {
        transaction_id: TransactionId,
        reason: String,
    },

    #[error("treasury transaction {0} is already being executed")]
    ExecutionInProgress(TransactionId),

    #[error("treasury transaction {0} not found")]
    TransactionNotFound(TransactionId),

    #[error("proposal {0} is not a treasury action")]
    NotTreasuryProposal(ProposalId),

    #[error("insufficient {asset} custody: need {needed}, available {available}")]
    InsufficientCustody {
        asset: AssetId,
        needed: u128,
        available: u128,
    },

    #[error("arithmetic overflow in custody accounting")]
    Overflow,

    #[error("inconsistent treasury state: {0}")]
    InconsistentState(String),

    #[error(transparent)]
    Governance(#[from] GovernanceError),
}

/// Failure reported by an [`AssetTransfer`](crate::AssetTransfer) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("source account holds insufficient funds")]
    InsufficientFunds,

    #[error("transfer rejected: {0}")]
    Rejected(String),
}
