//! Redaction of secrets from serialized bodies before they are logged.
//!
//! Works on the JSON text, not on a parsed value: the value of any
//! `"password"`, `"apiKey"` or `"token"` string field is replaced with
//! [`REDACTED`] and everything else is left byte-for-byte intact. Fields with
//! other names are not covered.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Replacement for redacted values.
pub const REDACTED: &str = "****";

static SECRET_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"("(?:password|apiKey|token)"\s*:\s*")(?:[^"\\]|\\.)*""#)
        .expect("secret field pattern is valid")
});

/// Redact secret string fields in serialized JSON.
pub fn sanitize(body: &str) -> Cow<'_, str> {
    SECRET_FIELD.replace_all(body, |caps: &regex::Captures<'_>| {
        format!("{}{}\"", &caps[1], REDACTED)
    })
}
