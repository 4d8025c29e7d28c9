//! Error types for the postbridge service.
//!
//! Startup-time errors (`ConfigError`, `CredentialError`) are fatal: `main`
//! logs them and exits non-zero before the server binds. Request-time errors
//! (`ValidationError`, `PublishError`, `OnboardingError`) are caught at the
//! handler boundary and translated to a 400 JSON response.

use thiserror::Error;

/// Errors raised while loading or persisting the configuration file.
///
/// All variants are fatal at startup; the process must not serve traffic
/// with a configuration that failed validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0} not in config, you must set it!")]
    MissingField(&'static str),

    #[error("default_session '{0}' not in config.sessions, you must set it!")]
    InvalidDefaultSession(String),

    #[error("rule references session '{0}', cannot find session in sessions")]
    UnknownSessionInRule(String),
}

/// Stored credentials were rejected by the provider during startup
/// verification.
#[derive(Error, Debug)]
#[error("credential check failed for session '{session}': {reason}")]
pub struct CredentialError {
    /// Name of the session whose credentials were rejected
    pub session: String,
    /// Provider-reported reason for the rejection
    pub reason: String,
}

/// The webhook payload produced a message the provider would reject.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Tweet can't be more than 280 characters")]
    MessageTooLong(usize),
}

/// Publishing a status through a configured session failed.
///
/// These surface to the webhook caller as a 400 response; the service does
/// not retry.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Wrong default_session in the config.yaml")]
    UnknownSession(String),

    #[error("Failed to post status: {0}")]
    Provider(String),
}

/// The onboarding token exchange with the provider failed.
///
/// The configuration is left unmodified when this is raised.
#[derive(Error, Debug)]
pub enum OnboardingError {
    #[error("Failed to get access token.")]
    TokenExchange(String),
}
