//! HTTP route handlers for the postbridge service.
//!
//! This module contains the handler functions for the webhook and
//! onboarding endpoints, plus the shared application state they operate on.
//! Per-request errors are translated here into the `{"status", "msg"}` JSON
//! body the webhook caller expects, and every failure path logs before
//! responding.

use std::fmt::Display;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Json, Redirect},
};
use log::{error, info};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::config::{get_callback_url, Config, Session};
use crate::message::{build_message, WebhookPayload};
use crate::publish::publish_status;
use crate::rules::select_session;
use crate::twitter::AuthClient;

/// Shared state handed to every handler.
///
/// The config is the only mutable resource in the process. Webhook handling
/// takes the read half of the lock; onboarding takes the write half across
/// its insert-and-persist sequence so two concurrent callbacks cannot lose
/// an update.
#[derive(Clone)]
pub struct AppState {
    /// The validated configuration, shared across in-flight requests
    pub config: Arc<RwLock<Config>>,
    /// The provider client (real or fake)
    pub client: Arc<dyn AuthClient>,
}

/// Query parameters delivered by the provider's login redirect.
#[derive(Debug, Deserialize)]
pub struct TwitterLoginParams {
    /// The request token the authorization flow was started with
    #[serde(default)]
    pub oauth_token: String,
    /// The verifier proving the user approved the request
    #[serde(default)]
    pub oauth_verifier: String,
}

/// Builds the 400 error body for a caller-fixable failure.
fn bad_request(msg: impl Display) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"status": "error", "msg": msg.to_string()})),
    )
}

/// The empty-message success body shared by all endpoints.
fn success() -> Json<Value> {
    Json(json!({"status": "success", "msg": ""}))
}

/// Handles GET requests to the root `/` endpoint.
///
/// Starts the onboarding flow: obtains a request token from the provider
/// and responds with a 303 redirect to the provider's login page. The
/// service holds no state for the in-flight flow; everything needed to
/// complete it comes back through the callback.
///
/// # Returns
///
/// - `Ok(Redirect)`: 303 redirect to the provider authorization URL
/// - `Err((StatusCode, Json))`: 400 with an error body if the request
///   token could not be obtained
pub async fn handle_login(
    State(state): State<AppState>,
) -> Result<Redirect, (StatusCode, Json<Value>)> {
    let config = state.config.read().await;
    match state
        .client
        .request_authorization_url(&config.credentials, &get_callback_url())
        .await
    {
        Ok(url) => {
            info!("Redirecting to provider login");
            Ok(Redirect::to(&url))
        }
        Err(e) => {
            error!("login: {}", e);
            Err(bad_request(e))
        }
    }
}

/// Handles GET requests to the `/twitter-login` endpoint.
///
/// Completes the onboarding flow: exchanges the callback's
/// `(oauth_token, oauth_verifier)` pair for a permanent access-token pair,
/// inserts a session keyed by the provider-returned screen name, and
/// persists the config. A failed exchange leaves the config unmodified.
///
/// # Returns
///
/// - `Ok(Json)`: `{"status":"success","msg":""}` once the session is stored
/// - `Err((StatusCode, Json))`: 400 with
///   `{"status":"error","msg":"Failed to get access token."}` when the
///   exchange fails
pub async fn handle_twitter_login(
    State(state): State<AppState>,
    Query(params): Query<TwitterLoginParams>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let credentials = state.config.read().await.credentials.clone();

    let access = match state
        .client
        .exchange_token(&credentials, &params.oauth_token, &params.oauth_verifier)
        .await
    {
        Ok(access) => access,
        Err(e) => {
            error!("twitter-login: {}", e);
            return Err(bad_request(e));
        }
    };

    // Insert and persist under a single write lock so a concurrent callback
    // cannot lose this session.
    let mut config = state.config.write().await;
    config.sessions.insert(
        access.screen_name.clone(),
        Session {
            access_token: access.token,
            access_token_secret: access.secret,
        },
    );
    info!("{} added to config.sessions", access.screen_name);

    if let Err(e) = config.persist() {
        error!("twitter-login: failed to save config: {}", e);
        return Err(bad_request("Failed to save config."));
    }

    Ok(success())
}

/// Handles POST requests to the `/new_post` endpoint.
///
/// Processes the publishing platform's post-published webhook: builds the
/// status message from the post fields, selects the target session via the
/// configured rules, and publishes through that session's credentials.
///
/// # Returns
///
/// - `Ok(Json)`: `{"status":"success","msg":""}` once the status is posted
/// - `Err((StatusCode, Json))`: 400 with a reason when the message exceeds
///   the provider limit, the selected session is unknown, or the provider
///   call fails. No retry is attempted.
pub async fn handle_new_post(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    info!("New post published!");
    let post = payload.post.current;
    let config = state.config.read().await;

    let message = match build_message(&post) {
        Ok(message) => message,
        Err(e) => {
            error!("new-post: {}", e);
            return Err(bad_request(e));
        }
    };

    let session_name = select_session(
        post.primary_tag_slug(),
        &config.rules,
        &config.default_session,
    )
    .to_string();

    match publish_status(&config, state.client.as_ref(), &session_name, &message).await {
        Ok(()) => Ok(success()),
        Err(e) => {
            error!("new-post: {}", e);
            Err(bad_request(e))
        }
    }
}

/// Handles GET requests to the `/health` endpoint.
///
/// This endpoint provides a health check for the service, returning the
/// current status and service name. It's commonly used by load balancers
/// and monitoring systems to verify that the service is running and
/// responsive.
pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "postbridge"}))
}
