//! Webhook payload schema and status-message construction.
//!
//! The publishing platform delivers the full post object as JSON when a post
//! is published. Only a handful of nested fields matter here, so the schema
//! below models exactly those, with explicit absence handling instead of
//! free-form key lookups.

use serde::Deserialize;

use crate::error::ValidationError;

/// Character limit imposed by the provider on a single status message.
pub const MAX_MESSAGE_CHARS: usize = 280;

/// Top-level webhook body: `{"post": {"current": {...}}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// The published post
    pub post: PostEnvelope,
}

/// Wrapper around the current revision of the post.
#[derive(Debug, Clone, Deserialize)]
pub struct PostEnvelope {
    /// The post fields as of publication
    pub current: PostContent,
}

/// The post fields this service reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostContent {
    /// Optional title override intended specifically for the status message
    #[serde(default)]
    pub twitter_title: Option<String>,
    /// The post's regular title
    #[serde(default)]
    pub title: String,
    /// Public URL of the post
    #[serde(default)]
    pub url: String,
    /// The post's primary tag, if it has any tags
    #[serde(default)]
    pub primary_tag: Option<PrimaryTag>,
}

/// The primary tag attached to a post.
#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryTag {
    /// URL-safe identifier of the tag, matched against rule tags
    pub slug: String,
}

impl PostContent {
    /// Returns the post's primary tag slug, if present.
    pub fn primary_tag_slug(&self) -> Option<&str> {
        self.primary_tag.as_ref().map(|tag| tag.slug.as_str())
    }
}

/// Builds the outbound status message for a published post.
///
/// The message is the post title followed by a blank line and the post URL.
/// `twitter_title` takes precedence over `title` when it is present and
/// non-empty.
///
/// # Returns
///
/// - `Ok(String)`: The message to publish
/// - `Err(ValidationError::MessageTooLong)`: The combined title and URL
///   exceed the provider's 280-character limit (counted in characters, not
///   bytes). The message is never truncated; the caller reports the error
///   and skips publishing.
pub fn build_message(post: &PostContent) -> Result<String, ValidationError> {
    let title = match &post.twitter_title {
        Some(twitter_title) if !twitter_title.is_empty() => twitter_title.as_str(),
        _ => post.title.as_str(),
    };
    let message = format!("{}\n\n{}", title, post.url);

    let length = message.chars().count();
    if length > MAX_MESSAGE_CHARS {
        return Err(ValidationError::MessageTooLong(length));
    }
    Ok(message)
}
