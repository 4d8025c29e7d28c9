//! Twitter/X provider client.
//!
//! The [`AuthClient`] trait is the seam between the service's logic and the
//! provider's network API: onboarding, startup credential verification and
//! publishing all go through it, so they can be exercised in tests with a
//! fake implementation. [`TwitterClient`] is the real implementation over
//! reqwest and the OAuth 1.0a endpoints.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;

use crate::config::{Credentials, Session};
use crate::error::{CredentialError, OnboardingError, PublishError};
use crate::oauth::authorization_header;

const REQUEST_TOKEN_URL: &str = "https://api.twitter.com/oauth/request_token";
const AUTHORIZE_URL: &str = "https://api.twitter.com/oauth/authorize";
const ACCESS_TOKEN_URL: &str = "https://api.twitter.com/oauth/access_token";
const VERIFY_CREDENTIALS_URL: &str =
    "https://api.twitter.com/1.1/account/verify_credentials.json";
const STATUS_UPDATE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

/// Timeout applied to every provider call so a slow provider response
/// cannot wedge unrelated in-flight requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A permanent access-token pair acquired by the onboarding token exchange,
/// together with the provider-assigned account name it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    /// The account's OAuth access token
    pub token: String,
    /// The account's OAuth access token secret
    pub secret: String,
    /// The provider-assigned display name, used as the session key
    pub screen_name: String,
}

/// Capability interface for all provider API interactions.
///
/// Implemented by [`TwitterClient`] for the real API and by recording fakes
/// in tests.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Obtains a request token and returns the provider authorization URL
    /// the user should be redirected to.
    async fn request_authorization_url(
        &self,
        consumer: &Credentials,
        callback_url: &str,
    ) -> Result<String, OnboardingError>;

    /// Exchanges a callback's `(oauth_token, oauth_verifier)` pair for a
    /// permanent access token and the account's screen name.
    async fn exchange_token(
        &self,
        consumer: &Credentials,
        oauth_token: &str,
        oauth_verifier: &str,
    ) -> Result<AccessToken, OnboardingError>;

    /// Makes a lightweight authenticated call to confirm a stored session's
    /// credentials are still accepted by the provider.
    async fn verify_credentials(
        &self,
        consumer: &Credentials,
        session_name: &str,
        session: &Session,
    ) -> Result<(), CredentialError>;

    /// Posts a status message through the given session's credentials.
    async fn post_status(
        &self,
        consumer: &Credentials,
        session: &Session,
        text: &str,
    ) -> Result<(), PublishError>;
}

/// Shape of the provider's request-token response body (urlencoded).
#[derive(Debug, Deserialize)]
struct RequestTokenResponse {
    oauth_token: String,
}

/// Shape of the provider's access-token response body (urlencoded).
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    oauth_token: String,
    oauth_token_secret: String,
    screen_name: String,
}

/// Real provider client over reqwest.
pub struct TwitterClient {
    http: Client,
}

impl TwitterClient {
    /// Creates a client with the standard per-request timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(TwitterClient { http })
    }
}

#[async_trait]
impl AuthClient for TwitterClient {
    async fn request_authorization_url(
        &self,
        consumer: &Credentials,
        callback_url: &str,
    ) -> Result<String, OnboardingError> {
        info!("Requesting OAuth request token from provider");
        debug!("Callback URL: {}", callback_url);

        let auth_header = authorization_header(
            "POST",
            REQUEST_TOKEN_URL,
            consumer,
            None,
            &[("oauth_callback", callback_url)],
            &[],
        );

        let response = self
            .http
            .post(REQUEST_TOKEN_URL)
            .header("Authorization", auth_header)
            .send()
            .await
            .map_err(|e| OnboardingError::TokenExchange(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OnboardingError::TokenExchange(e.to_string()))?;
        if !status.is_success() {
            error!("Request token call failed with status {}", status);
            return Err(OnboardingError::TokenExchange(format!(
                "request token failed ({})",
                status
            )));
        }

        let token: RequestTokenResponse = serde_urlencoded::from_str(&body)
            .map_err(|e| OnboardingError::TokenExchange(e.to_string()))?;

        Ok(format!(
            "{}?oauth_token={}",
            AUTHORIZE_URL, token.oauth_token
        ))
    }

    async fn exchange_token(
        &self,
        consumer: &Credentials,
        oauth_token: &str,
        oauth_verifier: &str,
    ) -> Result<AccessToken, OnboardingError> {
        info!("Exchanging request token for access token");

        // The service keeps no per-attempt state, so the request is signed
        // with the request token alone; the provider's exchange matches the
        // verifier to the token.
        let auth_header = authorization_header(
            "POST",
            ACCESS_TOKEN_URL,
            consumer,
            Some((oauth_token, "")),
            &[("oauth_verifier", oauth_verifier)],
            &[],
        );

        let response = self
            .http
            .post(ACCESS_TOKEN_URL)
            .header("Authorization", auth_header)
            .send()
            .await
            .map_err(|e| OnboardingError::TokenExchange(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OnboardingError::TokenExchange(e.to_string()))?;
        if !status.is_success() {
            error!("Access token exchange failed with status {}", status);
            return Err(OnboardingError::TokenExchange(format!(
                "access token exchange failed ({})",
                status
            )));
        }

        let token: AccessTokenResponse = serde_urlencoded::from_str(&body)
            .map_err(|e| OnboardingError::TokenExchange(e.to_string()))?;
        info!("Access token acquired for @{}", token.screen_name);

        Ok(AccessToken {
            token: token.oauth_token,
            secret: token.oauth_token_secret,
            screen_name: token.screen_name,
        })
    }

    async fn verify_credentials(
        &self,
        consumer: &Credentials,
        session_name: &str,
        session: &Session,
    ) -> Result<(), CredentialError> {
        debug!("Verifying credentials for session '{}'", session_name);

        let auth_header = authorization_header(
            "GET",
            VERIFY_CREDENTIALS_URL,
            consumer,
            Some((&session.access_token, &session.access_token_secret)),
            &[],
            &[],
        );

        let response = self
            .http
            .get(VERIFY_CREDENTIALS_URL)
            .header("Authorization", auth_header)
            .send()
            .await
            .map_err(|e| CredentialError {
                session: session_name.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CredentialError {
                session: session_name.to_string(),
                reason: format!("provider returned {}", status),
            });
        }
        Ok(())
    }

    async fn post_status(
        &self,
        consumer: &Credentials,
        session: &Session,
        text: &str,
    ) -> Result<(), PublishError> {
        debug!("Posting status update ({} chars)", text.chars().count());

        // Form parameters participate in the OAuth signature.
        let auth_header = authorization_header(
            "POST",
            STATUS_UPDATE_URL,
            consumer,
            Some((&session.access_token, &session.access_token_secret)),
            &[],
            &[("status", text)],
        );

        let response = self
            .http
            .post(STATUS_UPDATE_URL)
            .header("Authorization", auth_header)
            .form(&[("status", text)])
            .send()
            .await
            .map_err(|e| PublishError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Status update failed - Status: {}", status);
            debug!("Error response: {}", body);
            return Err(PublishError::Provider(format!(
                "provider returned {}",
                status
            )));
        }
        Ok(())
    }
}
