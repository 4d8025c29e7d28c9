//! Configuration module for the postbridge service.
//!
//! This module owns the credential store: the application-wide consumer
//! key/secret pair, the table of named sessions (one per onboarded account),
//! and the tag-routing rules. The configuration is loaded from a YAML file
//! at startup, validated fail-fast, and written back to the same file after
//! every successful onboarding.

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CredentialError};
use crate::rules::Rule;
use crate::twitter::AuthClient;

/// Application credentials shared by every session.
///
/// These identify the application itself to the provider and are combined
/// with a session's access-token pair to sign individual requests. They are
/// set once at load time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// The OAuth 1.0a consumer key from the provider's developer portal
    pub consumer_key: String,
    /// The OAuth 1.0a consumer secret from the provider's developer portal
    pub consumer_secret: String,
}

/// A named social-media account identity with its own access-token pair.
///
/// Sessions are created either at config load (from the persisted file) or
/// by the onboarding flow, which keys them by the provider-assigned screen
/// name. Sessions are never deleted by this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The account's OAuth access token
    pub access_token: String,
    /// The account's OAuth access token secret
    pub access_token_secret: String,
}

/// Mapping from session name to session credentials.
pub type SessionTable = BTreeMap<String, Session>;

/// The aggregate configuration for the service.
///
/// Constructed once at process start by [`Config::load`] and validated
/// immediately; any invariant violation fails startup. The onboarding flow
/// is the only mutation path at runtime (session insertion followed by
/// [`Config::persist`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    /// The shared application credentials
    #[serde(flatten)]
    pub credentials: Credentials,
    /// Name of the session used when no rule matches a post
    pub default_session: String,
    /// All configured sessions, keyed by name
    pub sessions: SessionTable,
    /// Tag-routing rules, in precedence order (later rules win)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,
    /// Path of the YAML file this config was loaded from
    #[serde(skip)]
    pub path: PathBuf,
}

/// Shape of the on-disk YAML file before validation.
///
/// Every field is optional here so that missing keys can be reported
/// individually instead of as a single opaque deserialization error.
#[derive(Debug, Deserialize)]
struct RawConfig {
    consumer_key: Option<String>,
    consumer_secret: Option<String>,
    default_session: Option<String>,
    sessions: Option<SessionTable>,
    #[serde(default)]
    rules: Vec<Rule>,
}

impl Config {
    /// Loads and validates the configuration from a YAML file.
    ///
    /// # Validation
    ///
    /// - `MissingField` if any of `default_session`, `sessions`,
    ///   `consumer_key` or `consumer_secret` is absent or empty
    /// - `InvalidDefaultSession` if `default_session` does not name a key of
    ///   `sessions`
    /// - `UnknownSessionInRule` if any rule targets a session that is not in
    ///   `sessions`
    ///
    /// # Returns
    ///
    /// - `Ok(Config)`: A validated configuration ready to serve traffic
    /// - `Err(ConfigError)`: The first invariant violation found; the caller
    ///   is expected to treat this as fatal
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let raw: RawConfig = serde_yaml::from_str(&content)?;

        let consumer_key = require(raw.consumer_key, "consumer_key")?;
        let consumer_secret = require(raw.consumer_secret, "consumer_secret")?;
        let default_session = require(raw.default_session, "default_session")?;
        let sessions = match raw.sessions {
            Some(sessions) if !sessions.is_empty() => sessions,
            _ => {
                error!("sessions not in config, you must set it!");
                return Err(ConfigError::MissingField("sessions"));
            }
        };

        if !sessions.contains_key(&default_session) {
            error!("default_session not in config.sessions, you must set it!");
            return Err(ConfigError::InvalidDefaultSession(default_session));
        }
        verify_rules(&raw.rules, &sessions)?;

        info!(
            "Config loaded: {} session(s), {} rule(s), default_session '{}'",
            sessions.len(),
            raw.rules.len(),
            default_session
        );

        Ok(Config {
            credentials: Credentials {
                consumer_key,
                consumer_secret,
            },
            default_session,
            sessions,
            rules: raw.rules,
            path: path.to_path_buf(),
        })
    }

    /// Verifies every stored session against the live provider.
    ///
    /// For each session this makes a lightweight authenticated call through
    /// the injected [`AuthClient`]. A failure for any session is fatal at
    /// startup: unusable stored credentials are treated as an operator
    /// problem to fix, not a per-request error to ride through.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: All sessions authenticated successfully
    /// - `Err(CredentialError)`: Names the first session the provider
    ///   rejected
    pub async fn verify_sessions(&self, client: &dyn AuthClient) -> Result<(), CredentialError> {
        for (name, session) in &self.sessions {
            client
                .verify_credentials(&self.credentials, name, session)
                .await?;
            info!("Session '{}' verified against provider", name);
        }
        Ok(())
    }

    /// Writes the configuration back to the file it was loaded from.
    ///
    /// The previous file contents are overwritten entirely; there is no
    /// partial merge. The `rules` key is omitted when no rules are
    /// configured, matching the shape of a hand-written config. Must be
    /// called after every successful onboarding so acquired tokens survive
    /// a restart.
    pub fn persist(&self) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.path, content)?;
        info!("Config saved to {}", self.path.display());
        Ok(())
    }
}

/// Unwraps a required config field, rejecting absent and empty values.
fn require(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => {
            error!("{} not in config, you must set it!", field);
            Err(ConfigError::MissingField(field))
        }
    }
}

/// Checks that every rule targets a session present in the session table.
fn verify_rules(rules: &[Rule], sessions: &SessionTable) -> Result<(), ConfigError> {
    for rule in rules {
        if !sessions.contains_key(&rule.session) {
            error!(
                "Test of rules failed for rule with session {}, cannot find session in sessions",
                rule.session
            );
            return Err(ConfigError::UnknownSessionInRule(rule.session.clone()));
        }
    }
    Ok(())
}

/// Gets the server port from environment variables or returns the default.
///
/// This function reads the `PORT` environment variable and parses it as a
/// u16. If the environment variable is not set, it defaults to 8084.
///
/// # Panics
///
/// This function will panic if the `PORT` environment variable is set to a
/// value that cannot be parsed as a valid port number.
pub fn get_server_port() -> u16 {
    env::var("PORT")
        .unwrap_or_else(|_| "8084".to_string())
        .parse()
        .expect("PORT must be a valid number")
}

/// Gets the config file path from the `CONFIG_PATH` environment variable,
/// defaulting to `config.yaml` in the working directory.
pub fn get_config_path() -> PathBuf {
    PathBuf::from(env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string()))
}

/// Gets the OAuth callback URL the provider redirects back to after login.
///
/// Read from the `CALLBACK_URL` environment variable when set; otherwise a
/// loopback URL on the configured server port. This must match the server's
/// externally reachable address or the provider redirect will go nowhere.
pub fn get_callback_url() -> String {
    env::var("CALLBACK_URL")
        .unwrap_or_else(|_| format!("http://127.0.0.1:{}/twitter-login", get_server_port()))
}
