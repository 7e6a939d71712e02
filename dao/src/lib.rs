//! The DAO engine: proposal lifecycle, token-weighted voting and custodied
//! treasury execution behind one clocked facade.
//!
//! [`Dao`] reads its [`Clock`](tidygen_types::Clock) once at the start of
//! every operation, runs the operation fail-atomically against the
//! governance registry, voting ledger and treasury executor, and buffers
//! the resulting events until [`Dao::take_events`] drains them.

pub mod config;
pub mod dao;
pub mod error;

pub use config::{DaoConfig, GovernanceTable};
pub use dao::Dao;
pub use error::DaoError;
