//! Errors raised while parsing or validating shared types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid account id: {0}")]
    InvalidAccount(String),

    #[error("invalid governance parameter {name}: {reason}")]
    InvalidParam { name: &'static str, reason: String },
}
