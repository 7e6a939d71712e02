use thiserror::Error;
use tidygen_governance::GovernanceError;
use tidygen_store::StoreError;
use tidygen_treasury::TreasuryError;
use tidygen_types::TypesError;
use tidygen_utils::LoggingError;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("governance error: {0}")]
    Governance(#[from] GovernanceError),

    #[error("treasury error: {0}")]
    Treasury(#[from] TreasuryError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid parameters: {0}")]
    Types(#[from] TypesError),

    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("treasury proposals must be created with create_treasury_action")]
    TreasuryProposalRequiresAction,
}

impl DaoError {
    /// The governance error behind this failure, whether it surfaced
    /// directly or through the treasury.
    pub fn as_governance(&self) -> Option<&GovernanceError> {
        match self {
            Self::Governance(e) | Self::Treasury(TreasuryError::Governance(e)) => Some(e),
            _ => None,
        }
    }

    pub fn as_treasury(&self) -> Option<&TreasuryError> {
        match self {
            Self::Treasury(e) => Some(e),
            _ => None,
        }
    }
}
