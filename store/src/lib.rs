//! Abstract storage traits for the TidyGen governance engine.
//!
//! Engine state lives in memory as indexed arenas; a storage backend persists
//! snapshots of it. The rest of the codebase depends only on these traits.

pub mod error;
pub mod governance;

pub use error::StoreError;
pub use governance::GovernanceStore;
