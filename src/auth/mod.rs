//! Credential and second-factor core.
//!
//! The orchestrator composes the password policy, the hasher, the TOTP
//! secret manager/verifier and an injected credential store into the four
//! operations the service exposes: register, authenticate, enable 2FA and
//! verify 2FA. Everything here is transport-agnostic; the HTTP layer in
//! `crate::api` only maps results and errors onto statuses.

pub mod error;
pub mod hasher;
pub mod orchestrator;
pub mod policy;
pub mod store;
pub mod totp;

pub use error::AuthError;
pub use orchestrator::Authenticator;
pub use store::{Account, CredentialStore, MemoryCredentialStore, PgCredentialStore};
