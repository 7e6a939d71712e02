//! Nullable infrastructure for deterministic testing.
//!
//! All external collaborators of the governance engine (clock, voting-power
//! oracle, asset transfer, storage) are abstracted behind traits. This crate
//! provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including after being handed to the engine
//! - Never touch the filesystem or network
//!
//! Handles are cheap clones sharing one state, so a test keeps a copy to steer
//! or inspect the collaborator it gave away.

pub mod clock;
pub mod oracle;
pub mod store;
pub mod transfer;

pub use clock::NullClock;
pub use oracle::NullVotingPower;
pub use store::NullStore;
pub use transfer::{NullTransfer, TransferRecord};
