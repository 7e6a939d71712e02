//! Governance parameters: the fixed constants of the proposal lifecycle.
//!
//! These are configuration, not magic numbers: every engine instance is built
//! from a `GovernanceParams` value (usually loaded from the `[governance]` table
//! of the DAO config file).

use crate::error::TypesError;
use serde::{Deserialize, Serialize};

const DAY_SECS: u64 = 24 * 3600;

/// All parameters the governance engine is configured with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceParams {
    // ── Lifecycle timing ─────────────────────────────────────────────────
    /// VOTING_DELAY: seconds between proposal creation and the start of voting.
    pub voting_delay_secs: u64,

    /// VOTING_PERIOD: length of the voting window in seconds.
    pub voting_period_secs: u64,

    // ── Thresholds ───────────────────────────────────────────────────────
    /// PROPOSAL_THRESHOLD: minimum voting power required to submit a proposal.
    pub proposal_threshold: u128,

    /// QUORUM_THRESHOLD: minimum total weight (for + against + abstain) for a
    /// proposal to be able to succeed.
    pub quorum_threshold: u128,

    // ── Input bounds ─────────────────────────────────────────────────────
    /// Maximum proposal title length in bytes.
    pub max_title_len: usize,

    /// Maximum proposal description length in bytes.
    pub max_description_len: usize,
}

impl GovernanceParams {
    pub const DEFAULT_VOTING_DELAY_SECS: u64 = DAY_SECS;
    pub const DEFAULT_VOTING_PERIOD_SECS: u64 = 3 * DAY_SECS;
    pub const DEFAULT_PROPOSAL_THRESHOLD: u128 = 1_000;
    pub const DEFAULT_QUORUM_THRESHOLD: u128 = 10_000;
    pub const DEFAULT_MAX_TITLE_LEN: usize = 256;
    pub const DEFAULT_MAX_DESCRIPTION_LEN: usize = 2048;

    /// Reject parameter sets the lifecycle cannot run with.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.voting_period_secs == 0 {
            return Err(TypesError::InvalidParam {
                name: "voting_period_secs",
                reason: "voting window must be non-empty".into(),
            });
        }
        if self.quorum_threshold == 0 {
            return Err(TypesError::InvalidParam {
                name: "quorum_threshold",
                reason: "quorum must be non-zero".into(),
            });
        }
        if self.max_title_len == 0 {
            return Err(TypesError::InvalidParam {
                name: "max_title_len",
                reason: "titles must be allowed at least one byte".into(),
            });
        }
        Ok(())
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            voting_delay_secs: Self::DEFAULT_VOTING_DELAY_SECS,
            voting_period_secs: Self::DEFAULT_VOTING_PERIOD_SECS,
            proposal_threshold: Self::DEFAULT_PROPOSAL_THRESHOLD,
            quorum_threshold: Self::DEFAULT_QUORUM_THRESHOLD,
            max_title_len: Self::DEFAULT_MAX_TITLE_LEN,
            max_description_len: Self::DEFAULT_MAX_DESCRIPTION_LEN,
        }
    }
}
