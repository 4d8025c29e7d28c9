//! # Postbridge Library
//!
//! A Rust web service library that bridges a publishing platform's
//! post-published webhook to Twitter/X. Incoming posts are turned into
//! short status messages and routed to one of several configured accounts
//! by tag rules, with OAuth 1.0a authentication against the provider.
//!
//! ## Features
//!
//! - Webhook endpoint that publishes a status for every published post
//! - Rule-based routing of posts to named account sessions (last match wins)
//! - Interactive OAuth onboarding flow for adding new accounts
//! - YAML credential store, validated fail-fast at startup
//! - Health check endpoint
//! - Structured logging
//!
//! ## Configuration
//!
//! The service loads a YAML config file (path from `CONFIG_PATH`, default
//! `config.yaml`) containing `consumer_key`, `consumer_secret`,
//! `default_session`, a `sessions` map, and an optional `rules` list.
//!
//! ## API Endpoints
//!
//! - `GET /`: Redirects to the provider login to onboard a new account
//! - `GET /twitter-login`: Provider callback; stores the new session
//! - `POST /new_post`: Publishing platform webhook; posts the status
//! - `GET /health`: Returns service health status

pub mod config;
pub mod error;
pub mod handlers;
pub mod message;
pub mod oauth;
pub mod publish;
pub mod rules;
pub mod twitter;

// Re-export commonly used types and functions
pub use config::{get_callback_url, get_config_path, get_server_port, Config, Credentials, Session};
pub use error::{ConfigError, CredentialError, OnboardingError, PublishError, ValidationError};
pub use handlers::{
    handle_health, handle_login, handle_new_post, handle_twitter_login, AppState,
};
pub use message::{build_message, WebhookPayload};
pub use publish::publish_status;
pub use rules::{select_session, MatchType, Rule};
pub use twitter::{AccessToken, AuthClient, TwitterClient};
