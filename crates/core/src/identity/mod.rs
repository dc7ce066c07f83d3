//! Free-text employee name resolution.
//!
//! Standalone audit reports carry the employee name as printed text, not a
//! user id. Attaching financial evidence to the wrong person is worse than
//! rejecting the upload, so resolution is deliberately strict: a fuzzy
//! scan must produce exactly one candidate, and that candidate's stored
//! name must then survive a full token-containment check against the
//! detected text.

mod error;

pub use error::IdentityError;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user directory row, as supplied by the external user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User id.
    pub id: Uuid,
    /// Stored display name.
    pub display_name: String,
}

/// Resolves a detected free-text name to exactly one user.
///
/// Step one is a fuzzy candidate scan: a user is a candidate when their
/// whole stored name, or any whitespace-separated word of it, appears as a
/// substring of the lower-cased detected name. Anything other than exactly
/// one candidate fails with the candidate count - a single fuzzy hit is
/// not trusted on its own either.
///
/// Step two validates the unique candidate: every whitespace-tokenized,
/// lower-cased word of the *stored* name must appear as a substring of the
/// lower-cased *detected* name. Extra tokens in the detected name (titles,
/// middle names, punctuation) are tolerated; missing stored tokens are
/// not. The asymmetry is intentional.
///
/// # Errors
///
/// [`IdentityError::AmbiguousOrNoIdentity`] when the candidate count is
/// not exactly one; [`IdentityError::NameMismatch`] when the unique
/// candidate fails the containment check.
pub fn resolve<'a>(
    detected: &str,
    directory: &'a [UserRecord],
) -> Result<&'a UserRecord, IdentityError> {
    let needle = detected.trim().to_lowercase();
    if needle.is_empty() {
        return Err(IdentityError::AmbiguousOrNoIdentity {
            detected: detected.to_string(),
            matches: 0,
        });
    }

    let candidates: Vec<&UserRecord> = directory
        .iter()
        .filter(|u| is_candidate(&u.display_name, &needle))
        .collect();

    if candidates.len() != 1 {
        return Err(IdentityError::AmbiguousOrNoIdentity {
            detected: detected.to_string(),
            matches: candidates.len(),
        });
    }

    let user = candidates[0];
    if !tokens_contained(&user.display_name, &needle) {
        return Err(IdentityError::NameMismatch {
            stored: user.display_name.clone(),
            detected: detected.to_string(),
        });
    }

    Ok(user)
}

/// A user is a candidate when their whole stored name or any single word
/// of it appears in the detected text.
fn is_candidate(stored: &str, detected_lower: &str) -> bool {
    let stored_lower = stored.trim().to_lowercase();
    if stored_lower.is_empty() {
        return false;
    }
    if detected_lower.contains(&stored_lower) {
        return true;
    }
    stored_lower
        .split_whitespace()
        .any(|token| detected_lower.contains(token))
}

/// Every word of the stored name must appear in the detected text.
fn tokens_contained(stored: &str, detected_lower: &str) -> bool {
    stored
        .split_whitespace()
        .map(str::to_lowercase)
        .all(|token| detected_lower.contains(&token))
}
