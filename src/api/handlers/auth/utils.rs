//! Small helpers for identity normalization and throttle key construction.

use regex::Regex;

/// Normalize an email for lookup and throttle bucketing.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Best-effort account identifier from a JSON body field.
///
/// Missing or non-string values normalize to the empty string, so anonymous
/// attempts from one address collapse into one throttle key. Documented
/// policy, not an oversight.
pub(super) fn safe_account(value: Option<&serde_json::Value>) -> String {
    value
        .and_then(serde_json::Value::as_str)
        .map(normalize_email)
        .unwrap_or_default()
}

/// Composite key bucketing login attempts per client and account.
pub(super) fn throttle_key(client_address: &str, account_normalized: &str) -> String {
    format!("{client_address}:{account_normalized}")
}

/// Extract a client IP for rate limiting from common proxy headers.
pub(super) fn extract_client_ip(headers: &axum::http::HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
