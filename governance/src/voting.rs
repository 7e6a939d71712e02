//! Voting ledger: one ballot per (proposal, voter), weight fixed at cast time.

use crate::error::GovernanceError;
use crate::event::{EventLog, GovernanceEvent};
use crate::oracle::VotingPowerOracle;
use crate::proposal::ProposalStatus;
use crate::registry::ProposalRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tidygen_types::{AccountId, ProposalId, Timestamp};

/// Ballot direction. The numeric tags are the wire encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Support {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl TryFrom<u8> for Support {
    type Error = GovernanceError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Against),
            1 => Ok(Self::For),
            2 => Ok(Self::Abstain),
            other => Err(GovernanceError::InvalidSupportValue(other)),
        }
    }
}

impl From<Support> for u8 {
    fn from(support: Support) -> Self {
        support as u8
    }
}

/// A recorded ballot. Immutable once stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub voter: AccountId,
    pub support: Support,
    /// Oracle weight read when the ballot was cast.
    pub weight: u128,
    pub cast_at: Timestamp,
}

/// Owns every ballot; writes only the tally fields of a proposal.
#[derive(Default)]
pub struct VotingLedger {
    votes: BTreeMap<(ProposalId, AccountId), Vote>,
}

impl VotingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the ledger from stored ballots, rejecting duplicates.
    pub fn restore(votes: impl IntoIterator<Item = Vote>) -> Result<Self, GovernanceError> {
        let mut ledger = Self::new();
        for vote in votes {
            let key = (vote.proposal_id, vote.voter);
            if ledger.votes.insert(key, vote).is_some() {
                return Err(GovernanceError::InconsistentState(format!(
                    "duplicate ballot for proposal {} by {}",
                    key.0, key.1
                )));
            }
        }
        Ok(ledger)
    }

    /// Cast a ballot.
    ///
    /// Checks, in order: the proposal exists and is not cancelled or executed,
    /// `start_time <= now <= end_time`, the voter has not voted, the voter has
    /// non-zero power, and `support_tag` is a valid [`Support`]. Nothing is
    /// written unless every check passes.
    #[allow(clippy::too_many_arguments)]
    pub fn cast_vote<O: VotingPowerOracle + ?Sized>(
        &mut self,
        registry: &mut ProposalRegistry,
        oracle: &O,
        proposal_id: ProposalId,
        voter: AccountId,
        support_tag: u8,
        reason: String,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<Vote, GovernanceError> {
        let proposal = registry
            .get(proposal_id)
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;
        match proposal.status {
            ProposalStatus::Cancelled => {
                return Err(GovernanceError::ProposalCancelled(proposal_id))
            }
            ProposalStatus::Pending | ProposalStatus::Active => {}
            // Settled proposals are past their window by construction.
            _ => {
                return Err(GovernanceError::VotingEnded {
                    ended_at: proposal.end_time,
                })
            }
        }
        if now < proposal.start_time {
            return Err(GovernanceError::VotingNotStarted {
                starts_at: proposal.start_time,
            });
        }
        if now > proposal.end_time {
            return Err(GovernanceError::VotingEnded {
                ended_at: proposal.end_time,
            });
        }
        if self.has_voted(proposal_id, &voter) {
            return Err(GovernanceError::DuplicateVote { proposal_id, voter });
        }
        let weight = oracle.voting_power(&voter);
        if weight == 0 {
            return Err(GovernanceError::NoVotingPower(voter));
        }
        let support = Support::try_from(support_tag)?;

        registry.record_vote(proposal_id, support, weight, events)?;
        let vote = Vote {
            proposal_id,
            voter,
            support,
            weight,
            cast_at: now,
        };
        self.votes.insert((proposal_id, voter), vote.clone());

        tracing::debug!(proposal_id, %voter, ?support, weight, "vote cast");
        events.emit(GovernanceEvent::VoteCast {
            proposal_id,
            voter,
            support,
            weight,
            reason,
        });
        Ok(vote)
    }

    pub fn get_vote(&self, proposal_id: ProposalId, voter: &AccountId) -> Option<&Vote> {
        self.votes.get(&(proposal_id, *voter))
    }

    pub fn has_voted(&self, proposal_id: ProposalId, voter: &AccountId) -> bool {
        self.votes.contains_key(&(proposal_id, *voter))
    }

    /// All ballots on one proposal, ordered by voter.
    pub fn votes_for_proposal(&self, proposal_id: ProposalId) -> impl Iterator<Item = &Vote> {
        self.votes
            .range((proposal_id, AccountId::NULL)..=(proposal_id, AccountId::new([0xff; 32])))
            .map(|(_, vote)| vote)
    }

    /// Every ballot, ordered by (proposal, voter).
    pub fn votes(&self) -> impl Iterator<Item = &Vote> {
        self.votes.values()
    }

    /// Sum of recorded weights per support for one proposal: (for, against, abstain).
    pub fn weight_totals(&self, proposal_id: ProposalId) -> (u128, u128, u128) {
        self.votes_for_proposal(proposal_id)
            .fold((0u128, 0u128, 0u128), |(f, a, s), vote| match vote.support {
                Support::For => (f.saturating_add(vote.weight), a, s),
                Support::Against => (f, a.saturating_add(vote.weight), s),
                Support::Abstain => (f, a, s.saturating_add(vote.weight)),
            })
    }
}
