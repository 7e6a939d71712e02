//! Token-weighted governance for TidyGen.
//!
//! Lifecycle: Pending → Active → {Succeeded | Defeated}, then Succeeded → Executed
//! for Treasury proposals only.
//! Cancelled is reachable only from Pending, before voting starts.
//!
//! Key principle: a voter's weight is read from the [`VotingPowerOracle`] once,
//! when the ballot is cast, and never re-queried. Quorum and majority are
//! evaluated later against the accumulated tallies.

pub mod error;
pub mod event;
pub mod oracle;
pub mod proposal;
pub mod registry;
pub mod voting;

pub use error::GovernanceError;
pub use event::{EventLog, GovernanceEvent};
pub use oracle::VotingPowerOracle;
pub use proposal::{Proposal, ProposalKind, ProposalStatus};
pub use registry::ProposalRegistry;
pub use voting::{Support, Vote, VotingLedger};
