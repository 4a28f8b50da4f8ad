//! # Gatehouse (Request Gating & Login Throttling)
//!
//! `gatehouse` is the request-interception layer that sits in front of
//! protected and sensitive routes. For every inbound HTTP request it decides
//! who the caller is and whether the caller is currently permitted to attempt
//! an authentication operation.
//!
//! ## Token Verification Gate
//!
//! A bearer credential is pulled from the session cookie or the
//! `Authorization: Bearer` header, verified against the signing secret, and
//! resolved into a principal through the principal directory. Two modes are
//! exposed as middleware:
//!
//! - **soft** — attach the principal when the credential is valid, otherwise
//!   attach nothing; the pipeline always continues.
//! - **strict** — block with `401` on any failure. All credential failures
//!   collapse into one uniform denial so responses never reveal which part of
//!   a credential was wrong.
//!
//! A role gate layered after the strict verifier authorizes administrator
//! routes and treats an absent principal as forbidden.
//!
//! ## Login Throttle
//!
//! Login attempts are bucketed by `client_address:normalized_account` into a
//! fixed-window counter store. Every throttled response carries
//! `X-RateLimit-Limit`, `X-RateLimit-Remaining` and `X-RateLimit-Reset`
//! headers; over-limit attempts are rejected with `429` and `Retry-After`
//! before the login handler runs. A successful login clears the key's record
//! early instead of waiting out the window.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
