//! Treasury execution for TidyGen governance.
//!
//! Holds custodied funds per asset and moves them exactly once, when the
//! owning Treasury-kind proposal has Succeeded.
//!
//! - [`CustodyLedger`]: the single place custody balances change
//! - [`TreasuryExecutor`]: creates treasury actions and executes them
//! - [`AssetTransfer`]: the fund-movement collaborator

pub mod custody;
pub mod error;
pub mod executor;
pub mod transaction;
pub mod transfer;

pub use custody::{CustodyLedger, Debit};
pub use error::{TransferError, TreasuryError};
pub use executor::TreasuryExecutor;
pub use transaction::TreasuryTransaction;
pub use transfer::AssetTransfer;
