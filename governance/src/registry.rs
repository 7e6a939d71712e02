//! Proposal registry: owns proposal identity, storage and lifecycle status.

use crate::error::GovernanceError;
use crate::event::{EventLog, GovernanceEvent};
use crate::oracle::VotingPowerOracle;
use crate::proposal::{Proposal, ProposalKind, ProposalStatus};
use crate::voting::Support;
use tidygen_types::{AccountId, ExecutionRef, GovernanceParams, ProposalId, Timestamp};

/// Arena of proposals keyed by a monotonic id.
///
/// Ids start at 1; the proposal with id `n` lives at index `n - 1`.
pub struct ProposalRegistry {
    params: GovernanceParams,
    proposals: Vec<Proposal>,
}

impl ProposalRegistry {
    pub fn new(params: GovernanceParams) -> Self {
        Self {
            params,
            proposals: Vec::new(),
        }
    }

    /// Rebuild a registry from previously stored proposals.
    ///
    /// Ids must form the contiguous range `1..=n`.
    pub fn restore(
        params: GovernanceParams,
        mut proposals: Vec<Proposal>,
    ) -> Result<Self, GovernanceError> {
        proposals.sort_by_key(|p| p.id);
        for (index, proposal) in proposals.iter().enumerate() {
            if proposal.id != index as u64 + 1 {
                return Err(GovernanceError::InconsistentState(format!(
                    "expected proposal id {}, found {}",
                    index + 1,
                    proposal.id
                )));
            }
        }
        Ok(Self { params, proposals })
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    pub fn get(&self, id: ProposalId) -> Option<&Proposal> {
        Self::slot(id).and_then(|i| self.proposals.get(i))
    }

    fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, GovernanceError> {
        Self::slot(id)
            .and_then(|i| self.proposals.get_mut(i))
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    fn slot(id: ProposalId) -> Option<usize> {
        id.checked_sub(1).and_then(|i| usize::try_from(i).ok())
    }

    /// Number of proposals ever created.
    pub fn proposal_count(&self) -> u64 {
        self.proposals.len() as u64
    }

    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// The id the next successful `propose` will assign.
    pub fn next_id(&self) -> Result<ProposalId, GovernanceError> {
        self.proposal_count()
            .checked_add(1)
            .ok_or(GovernanceError::Overflow)
    }

    /// Submit a new proposal (status Pending).
    ///
    /// Voting opens at `now + voting_delay` and stays open through
    /// `start + voting_period`, both bounds inclusive.
    #[allow(clippy::too_many_arguments)]
    pub fn propose<O: VotingPowerOracle + ?Sized>(
        &mut self,
        oracle: &O,
        proposer: AccountId,
        title: String,
        description: String,
        kind: ProposalKind,
        execution_ref: ExecutionRef,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<ProposalId, GovernanceError> {
        if title.is_empty() {
            return Err(GovernanceError::EmptyTitle);
        }
        if title.len() > self.params.max_title_len {
            return Err(GovernanceError::TitleTooLong {
                len: title.len(),
                max: self.params.max_title_len,
            });
        }
        if description.len() > self.params.max_description_len {
            return Err(GovernanceError::DescriptionTooLong {
                len: description.len(),
                max: self.params.max_description_len,
            });
        }

        let power = oracle.voting_power(&proposer);
        if power < self.params.proposal_threshold {
            return Err(GovernanceError::InsufficientProposalPower {
                have: power,
                need: self.params.proposal_threshold,
            });
        }

        let id = self.next_id()?;
        let start_time = now.saturating_add(self.params.voting_delay_secs);
        let end_time = start_time.saturating_add(self.params.voting_period_secs);

        self.proposals.push(Proposal {
            id,
            proposer,
            title: title.clone(),
            description,
            kind,
            execution_ref,
            created_at: now,
            start_time,
            end_time,
            votes_for: 0,
            votes_against: 0,
            votes_abstain: 0,
            status: ProposalStatus::Pending,
            executed: false,
            cancelled: false,
            executed_at: None,
        });

        tracing::info!(
            proposal_id = id,
            %proposer,
            ?kind,
            %start_time,
            %end_time,
            "proposal created"
        );
        events.emit(GovernanceEvent::ProposalCreated {
            proposal_id: id,
            proposer,
            title,
            kind,
            execution_ref,
            start_time,
            end_time,
        });
        Ok(id)
    }

    /// Withdraw a proposal. Only the proposer, only before voting starts.
    pub fn cancel(
        &mut self,
        id: ProposalId,
        caller: &AccountId,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<(), GovernanceError> {
        let proposal = self.get_mut(id)?;
        if proposal.proposer != *caller {
            return Err(GovernanceError::NotProposer(id));
        }
        if proposal.status == ProposalStatus::Cancelled {
            return Err(GovernanceError::ProposalCancelled(id));
        }
        if proposal.status != ProposalStatus::Pending || now >= proposal.start_time {
            return Err(GovernanceError::VotingAlreadyStarted(id));
        }

        proposal.cancelled = true;
        Self::set_status(proposal, ProposalStatus::Cancelled, events);
        tracing::info!(proposal_id = id, proposer = %caller, "proposal cancelled");
        events.emit(GovernanceEvent::ProposalCancelled {
            proposal_id: id,
            proposer: *caller,
        });
        Ok(())
    }

    /// Settle a proposal whose window has closed.
    ///
    /// Idempotent: before `end_time`, or once a terminal status is reached,
    /// this returns the current status without writing anything.
    pub fn request_status_transition(
        &mut self,
        id: ProposalId,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<ProposalStatus, GovernanceError> {
        let quorum = self.params.quorum_threshold;
        let proposal = self.get_mut(id)?;
        if !proposal.voting_ended(now) || !proposal.status.is_open() {
            return Ok(proposal.status);
        }

        let outcome = proposal.outcome(quorum);
        Self::set_status(proposal, outcome, events);
        tracing::info!(
            proposal_id = id,
            status = %outcome,
            votes_for = proposal.votes_for,
            votes_against = proposal.votes_against,
            votes_abstain = proposal.votes_abstain,
            "voting closed"
        );
        Ok(outcome)
    }

    /// Add a ballot's weight to the matching tally.
    ///
    /// The first accepted ballot moves the proposal from Pending to Active.
    /// Callers validate the voting window and ballot uniqueness beforehand.
    pub(crate) fn record_vote(
        &mut self,
        id: ProposalId,
        support: Support,
        weight: u128,
        events: &mut EventLog,
    ) -> Result<(), GovernanceError> {
        let proposal = self.get_mut(id)?;
        let tally = match support {
            Support::Against => &mut proposal.votes_against,
            Support::For => &mut proposal.votes_for,
            Support::Abstain => &mut proposal.votes_abstain,
        };
        *tally = tally.checked_add(weight).ok_or(GovernanceError::Overflow)?;

        if proposal.status == ProposalStatus::Pending {
            Self::set_status(proposal, ProposalStatus::Active, events);
        }
        Ok(())
    }

    /// Check that a proposal is in the Succeeded state and may be executed.
    ///
    /// Only Treasury proposals have an execution step; other kinds stay
    /// Succeeded.
    pub fn ensure_executable(
        &self,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<&Proposal, GovernanceError> {
        let proposal = self.get(id).ok_or(GovernanceError::ProposalNotFound(id))?;
        match proposal.status {
            ProposalStatus::Succeeded if proposal.kind == ProposalKind::Treasury => Ok(proposal),
            ProposalStatus::Succeeded => Err(GovernanceError::NoExecutionStep(id)),
            ProposalStatus::Executed => Err(GovernanceError::AlreadyExecuted(id)),
            ProposalStatus::Cancelled => Err(GovernanceError::ProposalCancelled(id)),
            ProposalStatus::Defeated => {
                let total = proposal.total_votes();
                if total < self.params.quorum_threshold {
                    Err(GovernanceError::QuorumNotMet {
                        have: total,
                        need: self.params.quorum_threshold,
                    })
                } else {
                    Err(GovernanceError::ProposalNotPassed(id))
                }
            }
            ProposalStatus::Pending | ProposalStatus::Active => {
                if proposal.voting_ended(now) {
                    Err(GovernanceError::VotingNotFinalized(id))
                } else {
                    Err(GovernanceError::VotingNotEnded {
                        ends_at: proposal.end_time,
                    })
                }
            }
        }
    }

    /// Flip a Succeeded proposal to Executed. Called only from within the
    /// step that performs the bound action.
    pub fn mark_executed(
        &mut self,
        id: ProposalId,
        now: Timestamp,
        events: &mut EventLog,
    ) -> Result<(), GovernanceError> {
        self.ensure_executable(id, now)?;
        let proposal = self.get_mut(id)?;
        proposal.executed = true;
        proposal.executed_at = Some(now);
        Self::set_status(proposal, ProposalStatus::Executed, events);
        tracing::info!(proposal_id = id, "proposal executed");
        events.emit(GovernanceEvent::ProposalExecuted {
            proposal_id: id,
            executed_at: now,
        });
        Ok(())
    }

    fn set_status(proposal: &mut Proposal, to: ProposalStatus, events: &mut EventLog) {
        let from = proposal.status;
        debug_assert!(from.can_transition_to(to), "illegal transition {from} -> {to}");
        proposal.status = to;
        events.emit(GovernanceEvent::ProposalStatusChanged {
            proposal_id: proposal.id,
            from,
            to,
        });
    }
}
