//! Events emitted for off-chain indexing.
//!
//! Every payload carries enough fields to reconstruct the state transition it
//! records without re-querying storage.

use crate::proposal::{ProposalKind, ProposalStatus};
use crate::voting::Support;
use serde::{Deserialize, Serialize};
use tidygen_types::{AccountId, AssetId, ExecutionRef, ProposalId, Timestamp, TransactionId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceEvent {
    ProposalCreated {
        proposal_id: ProposalId,
        proposer: AccountId,
        title: String,
        kind: ProposalKind,
        execution_ref: ExecutionRef,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    VoteCast {
        proposal_id: ProposalId,
        voter: AccountId,
        support: Support,
        weight: u128,
        reason: String,
    },
    ProposalStatusChanged {
        proposal_id: ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
    },
    ProposalCancelled {
        proposal_id: ProposalId,
        proposer: AccountId,
    },
    ProposalExecuted {
        proposal_id: ProposalId,
        executed_at: Timestamp,
    },
    TreasuryTransactionCreated {
        transaction_id: TransactionId,
        proposal_id: ProposalId,
        recipient: AccountId,
        amount: u128,
        asset: AssetId,
    },
    TreasuryTransactionExecuted {
        transaction_id: TransactionId,
        proposal_id: ProposalId,
        recipient: AccountId,
        amount: u128,
        asset: AssetId,
    },
    TreasuryDeposit {
        asset: AssetId,
        amount: u128,
        new_balance: u128,
    },
}

impl GovernanceEvent {
    /// The proposal this event concerns, if any.
    pub fn proposal_id(&self) -> Option<ProposalId> {
        match self {
            Self::ProposalCreated { proposal_id, .. }
            | Self::VoteCast { proposal_id, .. }
            | Self::ProposalStatusChanged { proposal_id, .. }
            | Self::ProposalCancelled { proposal_id, .. }
            | Self::ProposalExecuted { proposal_id, .. }
            | Self::TreasuryTransactionCreated { proposal_id, .. }
            | Self::TreasuryTransactionExecuted { proposal_id, .. } => Some(*proposal_id),
            Self::TreasuryDeposit { .. } => None,
        }
    }

    /// Encode as a single JSON object for an indexer feed.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Ordered buffer of events produced by committed calls.
///
/// Operations validate everything before they emit, so a failed call leaves
/// the log untouched.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<GovernanceEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: GovernanceEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GovernanceEvent> {
        self.events.iter()
    }

    /// Remove and return every buffered event, oldest first.
    pub fn drain(&mut self) -> Vec<GovernanceEvent> {
        std::mem::take(&mut self.events)
    }
}
