//! Governance proposals and their lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use tidygen_types::{AccountId, ExecutionRef, ProposalId, Timestamp};

/// What a proposal is about. Only `Treasury` proposals have an execution step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalKind {
    Treasury,
    Parameter,
    Upgrade,
    Community,
    Emergency,
}

/// Lifecycle status.
///
/// Transitions are monotone: Pending → Active → {Succeeded | Defeated} → Executed,
/// with Cancelled reachable only from Pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Created; no vote accepted yet.
    Pending,
    /// At least one vote has been accepted.
    Active,
    /// Window closed with quorum met and more weight for than against.
    Succeeded,
    /// Window closed without quorum or without a for-majority.
    Defeated,
    /// The treasury transfer bound to this proposal was performed.
    Executed,
    /// Withdrawn by the proposer before voting started.
    Cancelled,
}

impl ProposalStatus {
    /// Whether a vote may still move this proposal.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }

    /// Whether `self → next` is a permitted lifecycle edge.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        use ProposalStatus::*;
        matches!(
            (self, next),
            (Pending, Active)
                | (Pending, Succeeded)
                | (Pending, Defeated)
                | (Pending, Cancelled)
                | (Active, Succeeded)
                | (Active, Defeated)
                | (Succeeded, Executed)
        )
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Succeeded => "succeeded",
            Self::Defeated => "defeated",
            Self::Executed => "executed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A governance proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: AccountId,
    pub title: String,
    pub description: String,
    pub kind: ProposalKind,
    /// Binding hash of the action this proposal authorizes.
    pub execution_ref: ExecutionRef,
    pub created_at: Timestamp,
    /// First instant at which votes are accepted (inclusive).
    pub start_time: Timestamp,
    /// Last instant at which votes are accepted (inclusive).
    pub end_time: Timestamp,
    /// Tallies only ever grow.
    pub votes_for: u128,
    pub votes_against: u128,
    pub votes_abstain: u128,
    pub status: ProposalStatus,
    pub executed: bool,
    pub cancelled: bool,
    pub executed_at: Option<Timestamp>,
}

impl Proposal {
    /// Sum of all three tallies.
    pub fn total_votes(&self) -> u128 {
        self.votes_for
            .saturating_add(self.votes_against)
            .saturating_add(self.votes_abstain)
    }

    /// Share of for-weight in basis points of all cast weight (0 with no votes).
    pub fn approval_bps(&self) -> u32 {
        let total = self.total_votes();
        if total == 0 {
            return 0;
        }
        // votes_for <= total, so the quotient is at most 10_000.
        (self.votes_for.saturating_mul(10_000) / total) as u32
    }

    pub fn is_voting_open(&self, now: Timestamp) -> bool {
        self.status.is_open() && self.start_time <= now && now <= self.end_time
    }

    pub fn voting_ended(&self, now: Timestamp) -> bool {
        now > self.end_time
    }

    /// The terminal status the current tallies produce under `quorum`.
    ///
    /// Succeeded requires `total >= quorum` and `for > against`; anything else
    /// is Defeated.
    pub fn outcome(&self, quorum: u128) -> ProposalStatus {
        if self.total_votes() >= quorum && self.votes_for > self.votes_against {
            ProposalStatus::Succeeded
        } else {
            ProposalStatus::Defeated
        }
    }
}
