//! Publishing a status message through a configured session.

use log::info;

use crate::config::Config;
use crate::error::PublishError;
use crate::twitter::AuthClient;

/// Publishes `text` through the named session's credentials.
///
/// Resolves the session in the config's session table and invokes the
/// provider client. There is no retry: a provider failure (network, rate
/// limit, revoked auth) surfaces immediately to the caller.
///
/// # Returns
///
/// - `Ok(())`: The status was posted; an observability record with the
///   session and text is logged
/// - `Err(PublishError::UnknownSession)`: `session_name` is not in the
///   session table
/// - `Err(PublishError::Provider)`: The provider call failed
pub async fn publish_status(
    config: &Config,
    client: &dyn AuthClient,
    session_name: &str,
    text: &str,
) -> Result<(), PublishError> {
    let session = config
        .sessions
        .get(session_name)
        .ok_or_else(|| PublishError::UnknownSession(session_name.to_string()))?;

    client
        .post_status(&config.credentials, session, text)
        .await?;

    info!("{}: {}", session_name, text);
    Ok(())
}
