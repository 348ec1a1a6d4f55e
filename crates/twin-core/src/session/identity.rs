//! Identity (email) shape check.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;

static IDENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("identity pattern compiles"));

/// Validate an identity string
///
/// Accepts anything containing a `local@domain.tld` run of non-whitespace.
/// Blank input gets its own error so the front-end can prompt differently.
pub fn validate_identity(identity: &str) -> Result<(), ValidationError> {
    if identity.trim().is_empty() {
        return Err(ValidationError::EmptyIdentity);
    }

    if !IDENTITY_PATTERN.is_match(identity) {
        return Err(ValidationError::MalformedIdentity);
    }

    Ok(())
}
