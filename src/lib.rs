//! # Custode
//!
//! `custode` is a credential and second-factor authentication service. It
//! registers users, validates their credentials, and enrolls/verifies
//! time-based one-time passcodes (TOTP, RFC 6238) as a second factor.
//!
//! ## Account lifecycle
//!
//! Accounts start password-only and transition to 2FA-enabled when a TOTP
//! secret is enrolled. The secret and the enabled flag are always written in
//! the same store update, so there is never a persisted state where one is
//! set without the other.
//!
//! ## What `custode` does NOT do
//!
//! Login success does not mint a session or token; the caller owns session
//! handling and must demand the second factor itself whenever a login result
//! reports `twoFactorEnabled: true`. Rate limiting, account recovery, and
//! disabling 2FA are equally out of scope.

pub mod api;
pub mod auth;
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
