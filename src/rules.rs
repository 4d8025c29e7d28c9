//! Tag-routing rules for selecting which session publishes a post.
//!
//! A rule maps a post attribute (currently only the primary tag) to a named
//! session. Rules are scanned in config order and the LAST matching rule
//! wins; a post matching no rule goes to the default session.

use serde::{Deserialize, Serialize};

/// The post attribute a rule matches against.
///
/// Unrecognized types deserialize to [`MatchType::Unknown`] and are skipped
/// during selection, so a config written for a newer version of the service
/// still loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    /// Match on the post's primary tag slug
    PrimaryTag,
    /// Any rule type this version does not understand
    #[serde(other)]
    Unknown,
}

/// A single tag-to-session routing rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Which post attribute this rule matches
    #[serde(rename = "type")]
    pub match_type: MatchType,
    /// The tag slug to match
    pub tag: String,
    /// Name of the session to route matching posts to
    pub session: String,
}

/// Selects the session a post should be published through.
///
/// Scans the full rule list without short-circuiting: when several rules
/// match the same post, the last one in config order determines the result.
/// Posts with no primary tag, or whose tag matches no rule, fall back to
/// the default session.
///
/// Pure function of its inputs; no side effects.
///
/// # Parameters
///
/// - `primary_tag`: The post's primary tag slug, if the post has one
/// - `rules`: The configured rules, in precedence order
/// - `default_session`: The session used when nothing matches
///
/// # Returns
///
/// The name of the selected session.
pub fn select_session<'a>(
    primary_tag: Option<&str>,
    rules: &'a [Rule],
    default_session: &'a str,
) -> &'a str {
    let mut selected = default_session;
    for rule in rules {
        if rule.match_type != MatchType::PrimaryTag {
            continue;
        }
        match primary_tag {
            Some(slug) if !slug.is_empty() && slug == rule.tag => {
                selected = &rule.session;
            }
            _ => {}
        }
    }
    selected
}
