//! Validation of AI-proposed story extensions.
//!
//! A model is asked to extend the story graph from one designated section.
//! Its raw response is untrusted text; before it may replace the live story
//! it must prove to be a strictly additive, graph-consistent superset of the
//! original. The checks run fail-fast and a rejection leaves the original
//! untouched. A false rejection is acceptable, a corrupting acceptance is
//! not.

use crate::error::StoryError;
use crate::story::{Section, Story};

/// Why an extension response was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ExtendError {
    /// The response was not parseable as story JSON.
    #[error("response is not valid JSON: {0}")]
    Json(String),

    /// The response has no `sections` object.
    #[error("response has no \"sections\" object")]
    NoSections,

    /// An original section is missing from the response.
    #[error("section \"{0}\" was deleted")]
    SectionDeleted(String),

    /// An original section's content or leading choices were changed.
    #[error("section \"{0}\" was modified")]
    SectionModified(String),

    /// The designated section gained no new choices.
    #[error("section \"{0}\" was not extended")]
    NotExtended(String),

    /// The extended graph violates a structural invariant.
    #[error("graph integrity violation: {0}")]
    Integrity(#[from] StoryError),
}

/// Validate a raw model response purporting to extend `original` from
/// `extended_section`. On success returns the parsed story, ready to adopt
/// as the new live story; on failure the original remains authoritative.
///
/// Checks, in order, first failure wins:
/// 1. strip an optional Markdown code fence and parse as JSON;
/// 2. the result has a `sections` object;
/// 3. every original section is still present;
/// 4. every original section is unchanged, its choices a strict prefix of
///    the new ones (new choices may only be appended);
/// 5. `extended_section` gained at least one choice;
/// 6. the whole graph passes [`Story::check_integrity`].
pub fn validate_extension(
    original: &Story,
    raw_response: &str,
    extended_section: &str,
) -> Result<Story, ExtendError> {
    let body = strip_code_fence(raw_response);

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ExtendError::Json(e.to_string()))?;
    if !value
        .get("sections")
        .is_some_and(serde_json::Value::is_object)
    {
        return Err(ExtendError::NoSections);
    }
    let candidate: Story =
        serde_json::from_value(value).map_err(|e| ExtendError::Json(e.to_string()))?;

    for (id, old) in &original.sections {
        let Some(new) = candidate.sections.get(id) else {
            return Err(ExtendError::SectionDeleted(id.clone()));
        };
        if !is_unchanged_prefix(old, new) {
            return Err(ExtendError::SectionModified(id.clone()));
        }
    }

    let old_len = original
        .sections
        .get(extended_section)
        .map(|s| s.next.len());
    let new_len = candidate
        .sections
        .get(extended_section)
        .map(|s| s.next.len());
    match (old_len, new_len) {
        (Some(old), Some(new)) if new > old => {}
        _ => return Err(ExtendError::NotExtended(extended_section.to_string())),
    }

    candidate.check_integrity()?;
    Ok(candidate)
}

/// An original section is acceptable when its content is identical and its
/// choice list survives unchanged as the leading elements of the new one.
fn is_unchanged_prefix(old: &Section, new: &Section) -> bool {
    old.id == new.id
        && old.text == new.text
        && old.text_lines == new.text_lines
        && old.media == new.media
        && old.script == new.script
        && new.next.len() >= old.next.len()
        && old.next.iter().zip(&new.next).all(|(a, b)| a == b)
}

/// Models often wrap JSON in a Markdown code fence; strip one if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the rest of the fence line (``` or ```json), then the closing
    // fence.
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => "",
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}
