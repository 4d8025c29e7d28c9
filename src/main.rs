//! # Postbridge
//!
//! A Rust web service that bridges a publishing platform's post-published
//! webhook to Twitter/X. Incoming posts become short status messages and
//! are routed to one of several configured accounts via tag rules.
//!
//! ## Environment Variables
//!
//! - `CONFIG_PATH`: Path to the YAML config file (defaults to `config.yaml`)
//! - `PORT`: Server port (defaults to 8084)
//! - `CALLBACK_URL`: Externally reachable OAuth callback URL (defaults to
//!   `http://127.0.0.1:<PORT>/twitter-login`)
//! - `RUST_LOG`: Log level filter for `env_logger`
//!
//! ## API Endpoints
//!
//! - `GET /`: Redirects to the provider login to onboard a new account
//! - `GET /twitter-login`: Provider callback; stores the new session
//! - `POST /new_post`: Publishing platform webhook; posts the status
//! - `GET /health`: Returns service health status

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use log::{error, info};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use postbridge::config::{get_config_path, get_server_port, Config};
use postbridge::handlers::{
    handle_health, handle_login, handle_new_post, handle_twitter_login, AppState,
};
use postbridge::twitter::TwitterClient;

/// Main entry point for the postbridge web service.
///
/// Loads and validates the configuration, verifies every stored session
/// against the live provider, then starts the HTTP server. Any load or
/// validation failure is fatal: the process logs the error and exits
/// non-zero before binding, so a misconfigured account never serves
/// traffic.
///
/// # Panics
///
/// This function will panic if the server port cannot be bound (e.g. port
/// already in use).
#[tokio::main]
async fn main() {
    // Initialize the logging system
    env_logger::init();

    let config_path = get_config_path();
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let client = match TwitterClient::new() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build provider client: {}", e);
            std::process::exit(1);
        }
    };

    // Stored credentials are verified once at startup; a rejected session
    // is an operator problem, not a per-request error.
    if let Err(e) = config.verify_sessions(&client).await {
        error!(
            "Test of consumer_key, consumer_secret and sessions failed: {}, \
             please recheck them and try again.",
            e
        );
        std::process::exit(1);
    }

    let state = AppState {
        config: Arc::new(RwLock::new(config)),
        client: Arc::new(client),
    };

    // Build the HTTP application with all routes and middleware
    let app = Router::new()
        .route("/", get(handle_login))
        .route("/twitter-login", get(handle_twitter_login))
        .route("/new_post", post(handle_new_post))
        .route("/health", get(handle_health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    // Get the server port and bind address
    let port = get_server_port();
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    info!("Starting postbridge server on {}", addr);

    // Bind to the address and start serving requests
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind server port");

    if let Err(e) = axum::serve(listener, app).await {
        error!("HTTP server error: {}", e);
    }
}
