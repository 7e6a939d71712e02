//! Asset identifiers for custodied funds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The asset a custody balance or treasury transfer is denominated in.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetId {
    /// The chain's native currency.
    Native,
    /// A fungible token, identified by its contract or symbol.
    Token(String),
}

impl AssetId {
    pub fn token(id: impl Into<String>) -> Self {
        Self::Token(id.into())
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Stable byte encoding used when binding an asset into an execution reference.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Native => vec![0u8],
            Self::Token(id) => {
                let mut out = Vec::with_capacity(1 + id.len());
                out.push(1u8);
                out.extend_from_slice(id.as_bytes());
                out
            }
        }
    }
}

impl Default for AssetId {
    fn default() -> Self {
        Self::Native
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Token(id) => write!(f, "token:{id}"),
        }
    }
}
