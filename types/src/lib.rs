//! Fundamental types for the TidyGen governance engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identifiers, asset identifiers, execution references, timestamps and
//! the governance parameters.

pub mod account;
pub mod asset;
pub mod error;
pub mod execution_ref;
pub mod params;
pub mod time;

pub use account::AccountId;
pub use asset::AssetId;
pub use error::TypesError;
pub use execution_ref::ExecutionRef;
pub use params::GovernanceParams;
pub use time::{Clock, SystemClock, Timestamp};

/// Monotonic proposal identifier.
pub type ProposalId = u64;

/// Monotonic treasury transaction identifier.
pub type TransactionId = u64;
