//! DAO configuration with TOML file support.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;

use tidygen_types::{AccountId, GovernanceParams};
use tidygen_utils::{init_logging, LogFormat};

use crate::DaoError;

/// Configuration for a DAO engine instance.
///
/// Can be loaded from a TOML file via [`DaoConfig::from_toml_file`] or
/// built programmatically (e.g. for tests) via [`DaoConfig::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoConfig {
    /// Account that holds the treasury's funds, as 64 hex characters.
    #[serde(
        serialize_with = "serialize_account",
        deserialize_with = "deserialize_account"
    )]
    pub custody_account: AccountId,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Lifecycle parameters (`[governance]` table).
    #[serde(default)]
    pub governance: GovernanceTable,
}

/// The `[governance]` table.
///
/// TOML integers are 64-bit, so thresholds are written as `u64` here and
/// widened to the engine's `u128` weights.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernanceTable {
    pub voting_delay_secs: u64,
    pub voting_period_secs: u64,
    pub proposal_threshold: u64,
    pub quorum_threshold: u64,
    pub max_title_len: usize,
    pub max_description_len: usize,
}

// ── Serde helpers ──────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn serialize_account<S: Serializer>(account: &AccountId, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(account)
}

fn deserialize_account<'de, D: Deserializer<'de>>(d: D) -> Result<AccountId, D::Error> {
    let text = String::deserialize(d)?;
    AccountId::from_hex(&text).map_err(serde::de::Error::custom)
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernanceTable {
    pub fn to_params(&self) -> GovernanceParams {
        GovernanceParams {
            voting_delay_secs: self.voting_delay_secs,
            voting_period_secs: self.voting_period_secs,
            proposal_threshold: u128::from(self.proposal_threshold),
            quorum_threshold: u128::from(self.quorum_threshold),
            max_title_len: self.max_title_len,
            max_description_len: self.max_description_len,
        }
    }

    /// Fails when a threshold does not fit a TOML integer.
    pub fn from_params(params: &GovernanceParams) -> Result<Self, DaoError> {
        let narrow = |name: &str, value: u128| {
            u64::try_from(value)
                .map_err(|_| DaoError::Config(format!("{name} {value} exceeds the TOML range")))
        };
        Ok(Self {
            voting_delay_secs: params.voting_delay_secs,
            voting_period_secs: params.voting_period_secs,
            proposal_threshold: narrow("proposal_threshold", params.proposal_threshold)?,
            quorum_threshold: narrow("quorum_threshold", params.quorum_threshold)?,
            max_title_len: params.max_title_len,
            max_description_len: params.max_description_len,
        })
    }
}

impl Default for GovernanceTable {
    fn default() -> Self {
        let params = GovernanceParams::default();
        Self {
            voting_delay_secs: params.voting_delay_secs,
            voting_period_secs: params.voting_period_secs,
            // Defaults are small constants.
            proposal_threshold: GovernanceParams::DEFAULT_PROPOSAL_THRESHOLD as u64,
            quorum_threshold: GovernanceParams::DEFAULT_QUORUM_THRESHOLD as u64,
            max_title_len: params.max_title_len,
            max_description_len: params.max_description_len,
        }
    }
}

impl DaoConfig {
    /// Default parameters around the given custody account.
    pub fn new(custody_account: AccountId) -> Self {
        Self {
            custody_account,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            governance: GovernanceTable::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, DaoError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DaoError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DaoError> {
        let config: Self = toml::from_str(s).map_err(|e| DaoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DaoError> {
        toml::to_string_pretty(self).map_err(|e| DaoError::Config(e.to_string()))
    }

    pub fn governance_params(&self) -> GovernanceParams {
        self.governance.to_params()
    }

    pub fn validate(&self) -> Result<(), DaoError> {
        if self.custody_account.is_null() {
            return Err(DaoError::Config(
                "custody_account must not be the null address".into(),
            ));
        }
        self.governance_params()
            .validate()
            .map_err(|e| DaoError::Config(e.to_string()))
    }

    /// Install the global tracing subscriber described by this config.
    pub fn init_logging(&self) -> Result<(), DaoError> {
        init_logging(self.log_format, &self.log_level)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUSTODY_HEX: &str = "0101010101010101010101010101010101010101010101010101010101010101";

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaoConfig::from_toml_str(&format!("custody_account = \"{CUSTODY_HEX}\""))
            .expect("custody account alone should parse");
        assert_eq!(config.custody_account, AccountId::new([1u8; 32]));
        assert_eq!(config.governance_params(), GovernanceParams::default());
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn partial_governance_table_overrides() {
        let toml = format!(
            r#"
            custody_account = "{CUSTODY_HEX}"
            log_format = "json"

            [governance]
            voting_period_secs = 600
            quorum_threshold = 42
        "#
        );
        let config = DaoConfig::from_toml_str(&toml).expect("should parse");
        let params = config.governance_params();
        assert_eq!(params.voting_period_secs, 600);
        assert_eq!(params.quorum_threshold, 42);
        assert_eq!(
            params.voting_delay_secs,
            GovernanceParams::DEFAULT_VOTING_DELAY_SECS
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaoConfig::new(AccountId::new([7u8; 32]));
        let text = config.to_toml_string().unwrap();
        assert_eq!(DaoConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_custody_account_is_rejected() {
        assert!(matches!(
            DaoConfig::from_toml_str(""),
            Err(DaoError::Config(_))
        ));
    }

    #[test]
    fn null_custody_account_is_rejected() {
        let toml = format!("custody_account = \"{}\"", "00".repeat(32));
        assert!(matches!(
            DaoConfig::from_toml_str(&toml),
            Err(DaoError::Config(msg)) if msg.contains("null")
        ));
    }

    #[test]
    fn zero_quorum_is_rejected() {
        let toml = format!(
            "custody_account = \"{CUSTODY_HEX}\"\n[governance]\nquorum_threshold = 0\n"
        );
        assert!(matches!(
            DaoConfig::from_toml_str(&toml),
            Err(DaoError::Config(msg)) if msg.contains("quorum_threshold")
        ));
    }

    #[test]
    fn oversized_threshold_cannot_be_written() {
        let params = GovernanceParams {
            quorum_threshold: u128::from(u64::MAX) + 1,
            ..GovernanceParams::default()
        };
        assert!(GovernanceTable::from_params(&params).is_err());
    }
}
