// sentrywatch-config/src/config.rs
// ============================================================================
// Module: Sentrywatch Startup Configuration
// Description: Environment-driven startup configuration with strict validation.
// Purpose: Fail fast at startup rather than partway through the first run.
// Dependencies: sentrywatch-core, thiserror, url
// ============================================================================

//! ## Overview
//! Startup configuration is read from environment variables with a fixed
//! `SENTRYWATCH_` prefix. Every required value is validated before the
//! orchestrator's first tick; a missing or malformed value produces a
//! descriptive [`ConfigError`] and the process never attempts an upstream
//! call. Loading is split into a pure [`EngineConfig::from_vars`] that reads
//! an explicit key/value map and a thin [`EngineConfig::from_env`] wrapper,
//! so validation is testable without mutating process environment state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use sentrywatch_core::TenantId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default poll interval in seconds when `SENTRYWATCH_POLL_INTERVAL_SECS` is
/// unset.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

/// Minimum accepted poll interval in seconds.
const MIN_POLL_INTERVAL_SECS: u64 = 30;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Startup configuration failures. Any variant is fatal: the process exits
/// before the orchestrator runs its first tick.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),
    /// An environment variable was set but failed to parse or validate.
    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
    /// Neither a client secret nor a federation assertion path was supplied.
    #[error(
        "either SENTRYWATCH_CLIENT_SECRET or SENTRYWATCH_FEDERATION_ASSERTION_PATH must be set"
    )]
    MissingCredential,
}

// ============================================================================
// SECTION: Engine Configuration
// ============================================================================

/// Startup configuration for one engine process.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tenant id of the managed-service-provider directory the engine
    /// authenticates as.
    pub msp_tenant_id: TenantId,
    /// OAuth client id used for upstream authentication.
    pub client_id: String,
    /// How the process proves its identity to the upstream APIs.
    pub credential: Credential,
    /// Log-ingestion sink endpoint URL.
    pub sink_endpoint: Url,
    /// Immutable rule id the sink associates with uploaded rows.
    pub sink_rule_id: String,
    /// Log-ingestion stream name.
    pub sink_stream_name: String,
    /// Connection string for the durable alert-state and config store.
    pub storage_connection_string: String,
    /// Directory the rule catalog is discovered from.
    pub rule_catalog_dir: PathBuf,
    /// Group id whose members are treated as operators in the UI.
    pub admin_group_id: String,
    /// OAuth client id the operator UI authenticates with.
    pub ui_client_id: String,
    /// Interval between scheduler ticks.
    pub poll_interval_secs: u64,
}

/// How the engine authenticates to the upstream APIs.
#[derive(Debug, Clone)]
pub enum Credential {
    /// A client secret, supplied directly.
    ClientSecret(String),
    /// A path to an identity-federation assertion file, read per token
    /// refresh rather than held in memory.
    FederationAssertion(PathBuf),
}

impl EngineConfig {
    /// Loads and validates configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// present variable fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Loads and validates configuration from an explicit key/value map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// present variable fails validation.
    pub fn from_vars(vars: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let msp_tenant_id = TenantId::new(require_var(vars, "SENTRYWATCH_MSP_TENANT_ID")?);
        let client_id = require_var(vars, "SENTRYWATCH_CLIENT_ID")?;
        let credential = read_credential(vars)?;
        let sink_endpoint_raw = require_var(vars, "SENTRYWATCH_SINK_ENDPOINT")?;
        let sink_endpoint = parse_url("SENTRYWATCH_SINK_ENDPOINT", &sink_endpoint_raw)?;
        let sink_rule_id = require_var(vars, "SENTRYWATCH_SINK_RULE_ID")?;
        let sink_stream_name = require_var(vars, "SENTRYWATCH_SINK_STREAM_NAME")?;
        let storage_connection_string = require_var(vars, "SENTRYWATCH_STORAGE_CONNECTION_STRING")?;
        let rule_catalog_dir = PathBuf::from(require_var(vars, "SENTRYWATCH_RULE_CATALOG_DIR")?);
        let admin_group_id = require_var(vars, "SENTRYWATCH_ADMIN_GROUP_ID")?;
        let ui_client_id = require_var(vars, "SENTRYWATCH_UI_CLIENT_ID")?;
        let poll_interval_secs = read_poll_interval_secs(vars)?;

        Ok(Self {
            msp_tenant_id,
            client_id,
            credential,
            sink_endpoint,
            sink_rule_id,
            sink_stream_name,
            storage_connection_string,
            rule_catalog_dir,
            admin_group_id,
            ui_client_id,
            poll_interval_secs,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a required, non-empty variable out of `vars`.
fn require_var(vars: &BTreeMap<String, String>, name: &'static str) -> Result<String, ConfigError> {
    let value = vars.get(name).ok_or(ConfigError::MissingVar(name))?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidVar(name, "must not be empty".to_string()));
    }
    Ok(value.clone())
}

/// Reads an optional variable, treating an empty value as unset.
fn optional_var(vars: &BTreeMap<String, String>, name: &str) -> Option<String> {
    vars.get(name).filter(|value| !value.trim().is_empty()).cloned()
}

/// Reads the client secret or federation assertion path, requiring exactly
/// one to be configured.
fn read_credential(vars: &BTreeMap<String, String>) -> Result<Credential, ConfigError> {
    match (
        optional_var(vars, "SENTRYWATCH_CLIENT_SECRET"),
        optional_var(vars, "SENTRYWATCH_FEDERATION_ASSERTION_PATH"),
    ) {
        (Some(secret), _) => Ok(Credential::ClientSecret(secret)),
        (None, Some(path)) => Ok(Credential::FederationAssertion(PathBuf::from(path))),
        (None, None) => Err(ConfigError::MissingCredential),
    }
}

/// Parses a URL-shaped variable.
fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|err| ConfigError::InvalidVar(name, err.to_string()))
}

/// Reads and validates the poll interval, defaulting when unset.
fn read_poll_interval_secs(vars: &BTreeMap<String, String>) -> Result<u64, ConfigError> {
    let Some(raw) = optional_var(vars, "SENTRYWATCH_POLL_INTERVAL_SECS") else {
        return Ok(DEFAULT_POLL_INTERVAL_SECS);
    };
    let parsed: u64 = raw
        .parse()
        .map_err(|_| ConfigError::InvalidVar("SENTRYWATCH_POLL_INTERVAL_SECS", raw.clone()))?;
    if parsed < MIN_POLL_INTERVAL_SECS {
        return Err(ConfigError::InvalidVar(
            "SENTRYWATCH_POLL_INTERVAL_SECS",
            format!("must be at least {MIN_POLL_INTERVAL_SECS} seconds"),
        ));
    }
    Ok(parsed)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions")]
mod tests {
    use std::collections::BTreeMap;

    use super::EngineConfig;

    fn minimal_valid_vars() -> BTreeMap<String, String> {
        [
            ("SENTRYWATCH_MSP_TENANT_ID", "11111111-1111-1111-1111-111111111111"),
            ("SENTRYWATCH_CLIENT_ID", "client-1"),
            ("SENTRYWATCH_CLIENT_SECRET", "super-secret"),
            ("SENTRYWATCH_SINK_ENDPOINT", "https://sink.example.com/ingest"),
            ("SENTRYWATCH_SINK_RULE_ID", "rule-1"),
            ("SENTRYWATCH_SINK_STREAM_NAME", "stream-1"),
            ("SENTRYWATCH_STORAGE_CONNECTION_STRING", "sqlite:///var/lib/sentrywatch/state.db"),
            ("SENTRYWATCH_RULE_CATALOG_DIR", "/etc/sentrywatch/rules"),
            ("SENTRYWATCH_ADMIN_GROUP_ID", "admins"),
            ("SENTRYWATCH_UI_CLIENT_ID", "ui-client-1"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
    }

    #[test]
    fn loads_valid_configuration_with_client_secret() {
        let vars = minimal_valid_vars();
        let config = EngineConfig::from_vars(&vars).expect("valid vars should load");
        assert_eq!(config.msp_tenant_id.as_str(), "11111111-1111-1111-1111-111111111111");
        assert_eq!(config.poll_interval_secs, super::DEFAULT_POLL_INTERVAL_SECS);
    }

    #[test]
    fn loads_valid_configuration_with_federation_assertion() {
        let mut vars = minimal_valid_vars();
        vars.remove("SENTRYWATCH_CLIENT_SECRET");
        vars.insert(
            "SENTRYWATCH_FEDERATION_ASSERTION_PATH".to_string(),
            "/var/run/secrets/assertion".to_string(),
        );
        let config = EngineConfig::from_vars(&vars).expect("federation assertion should load");
        assert!(matches!(config.credential, super::Credential::FederationAssertion(_)));
    }

    #[test]
    fn missing_required_var_fails_fast() {
        let mut vars = minimal_valid_vars();
        vars.remove("SENTRYWATCH_CLIENT_ID");
        assert!(EngineConfig::from_vars(&vars).is_err());
    }

    #[test]
    fn missing_both_credential_forms_is_an_error() {
        let mut vars = minimal_valid_vars();
        vars.remove("SENTRYWATCH_CLIENT_SECRET");
        assert!(EngineConfig::from_vars(&vars).is_err());
    }

    #[test]
    fn invalid_sink_endpoint_url_is_rejected() {
        let mut vars = minimal_valid_vars();
        vars.insert("SENTRYWATCH_SINK_ENDPOINT".to_string(), "not a url".to_string());
        assert!(EngineConfig::from_vars(&vars).is_err());
    }

    #[test]
    fn poll_interval_below_minimum_is_rejected() {
        let mut vars = minimal_valid_vars();
        vars.insert("SENTRYWATCH_POLL_INTERVAL_SECS".to_string(), "5".to_string());
        assert!(EngineConfig::from_vars(&vars).is_err());
    }

    #[test]
    fn poll_interval_at_minimum_is_accepted() {
        let mut vars = minimal_valid_vars();
        vars.insert("SENTRYWATCH_POLL_INTERVAL_SECS".to_string(), "30".to_string());
        let config = EngineConfig::from_vars(&vars).expect("minimum interval should be valid");
        assert_eq!(config.poll_interval_secs, 30);
    }
}
