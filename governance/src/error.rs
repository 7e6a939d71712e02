use thiserror::Error;
use tidygen_types::{AccountId, ProposalId, Timestamp};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    // ── Proposal submission ──────────────────────────────────────────────
    #[error("insufficient voting power to propose: have {have}, need {need}")]
    InsufficientProposalPower { have: u128, need: u128 },

    #[error("proposal title must not be empty")]
    EmptyTitle,

    #[error("proposal title too long: {len} > {max} bytes")]
    TitleTooLong { len: usize, max: usize },

    #[error("proposal description too long: {len} > {max} bytes")]
    DescriptionTooLong { len: usize, max: usize },

    // ── Cancellation ─────────────────────────────────────────────────────
    #[error("only the proposer can cancel proposal {0}")]
    NotProposer(ProposalId),

    #[error("voting on proposal {0} has already started")]
    VotingAlreadyStarted(ProposalId),

    // ── Voting ───────────────────────────────────────────────────────────
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("proposal {0} was cancelled")]
    ProposalCancelled(ProposalId),

    #[error("{voter} has already voted on proposal {proposal_id}")]
    DuplicateVote {
        proposal_id: ProposalId,
        voter: AccountId,
    },

    #[error("voting has not started: opens at {starts_at}")]
    VotingNotStarted { starts_at: Timestamp },

    #[error("voting has ended: closed at {ended_at}")]
    VotingEnded { ended_at: Timestamp },

    #[error("{0} has no voting power")]
    NoVotingPower(AccountId),

    #[error("invalid support value {0}: expected 0 (against), 1 (for) or 2 (abstain)")]
    InvalidSupportValue(u8),

    // ── Execution ────────────────────────────────────────────────────────
    #[error("voting has not ended: closes after {ends_at}")]
    VotingNotEnded { ends_at: Timestamp },

    #[error("proposal {0} has not been finalized; request a status transition first")]
    VotingNotFinalized(ProposalId),

    #[error("quorum not met: {have} < {need}")]
    QuorumNotMet { have: u128, need: u128 },

    #[error("proposal {0} did not pass")]
    ProposalNotPassed(ProposalId),

    #[error("proposal {0} has already been executed")]
    AlreadyExecuted(ProposalId),

    #[error("proposal {0} has no execution step; only treasury proposals execute")]
    NoExecutionStep(ProposalId),

    #[error("arithmetic overflow in governance accounting")]
    Overflow,

    #[error("inconsistent governance state: {0}")]
    InconsistentState(String),
}
