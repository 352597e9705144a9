//! The auth orchestrator: account state machine and the four operations.
//!
//! Accounts move `Unregistered -> PasswordOnly -> TwoFactorEnabled` and
//! never back. The orchestrator holds no mutable state of its own; all
//! state lives in the injected store, so it is safe to share across tasks.
//!
//! `authenticate` reports `two_factor_enabled` but does not block login
//! completion pending the second factor; sequencing the 2FA step is the
//! caller's responsibility.

use crate::auth::{
    error::AuthError,
    hasher, policy,
    store::{CredentialStore, StoreError},
    totp,
};
use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use uuid::Uuid;

/// View of a freshly registered account. Never carries the password hash.
#[derive(Debug, Clone)]
pub struct RegisteredAccount {
    pub id: Uuid,
    pub username: String,
    pub two_factor_enabled: bool,
}

/// Result of a successful password check.
#[derive(Debug, Clone, Copy)]
pub struct LoginOutcome {
    /// When true the caller must demand a TOTP code before treating the
    /// session as fully authenticated.
    pub two_factor_enabled: bool,
}

/// Composes policy, hasher, TOTP and the store into the service operations.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    issuer: String,
}

impl Authenticator {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, issuer: String) -> Self {
        Self { store, issuer }
    }

    /// Create a new password-only account.
    ///
    /// # Errors
    /// `Validation` on empty input, `Policy` when the password misses
    /// requirements, `Conflict` when the username is taken (including the
    /// case where a concurrent registration wins the store's uniqueness
    /// race).
    pub async fn register(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<RegisteredAccount, AuthError> {
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::Validation(
                "Missing username or password.".to_string(),
            ));
        }

        let report = policy::validate(password.expose_secret());
        if !report.is_valid() {
            return Err(AuthError::Policy {
                missing: report.into_missing(),
            });
        }

        if self.store.find_by_username(username).await.map_err(map_store_err)?.is_some() {
            return Err(AuthError::Conflict);
        }

        // bcrypt is CPU-bound; keep it off the async worker threads.
        let plaintext = password.expose_secret().to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hasher::hash(&plaintext))
            .await
            .context("password hashing task failed")??;

        let account = self
            .store
            .create(username, &password_hash)
            .await
            .map_err(map_store_err)?;

        Ok(RegisteredAccount {
            id: account.id,
            username: account.username,
            two_factor_enabled: account.two_factor_enabled,
        })
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    /// `Unauthorized` for both an unknown username and a wrong password, so
    /// the response cannot be used to enumerate accounts.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, AuthError> {
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::Validation(
                "Missing username or password.".to_string(),
            ));
        }

        let Some(account) = self.store.find_by_username(username).await.map_err(map_store_err)?
        else {
            return Err(AuthError::Unauthorized);
        };

        let plaintext = password.expose_secret().to_owned();
        let stored_hash = account.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || hasher::verify(&plaintext, &stored_hash))
            .await
            .context("password verification task failed")??;

        if !verified {
            return Err(AuthError::Unauthorized);
        }

        Ok(LoginOutcome {
            two_factor_enabled: account.two_factor_enabled,
        })
    }

    /// Generate a fresh TOTP secret for the account and persist it together
    /// with the enabled flag in one store write.
    ///
    /// Calling this on an already-enabled account regenerates the secret and
    /// silently replaces the old one: the account always ends enabled with a
    /// usable secret, but previously enrolled authenticator apps stop
    /// working.
    ///
    /// # Errors
    /// `NotFound` for an unknown username.
    pub async fn enable_two_factor(&self, username: &str) -> Result<totp::Enrollment, AuthError> {
        if username.is_empty() {
            return Err(AuthError::Validation("Missing username.".to_string()));
        }

        if self.store.find_by_username(username).await.map_err(map_store_err)?.is_none() {
            return Err(AuthError::NotFound);
        }

        let enrollment = totp::generate(&self.issuer, username)?;

        self.store
            .enable_two_factor(username, &enrollment.secret_base32)
            .await
            .map_err(map_store_err)?;

        Ok(enrollment)
    }

    /// Check a submitted TOTP code against the account's stored secret.
    ///
    /// An account without a stored secret deterministically fails
    /// verification; that case is reported as a bad code, not a distinct
    /// error.
    ///
    /// # Errors
    /// `NotFound` for an unknown username, `Unauthorized` when the code does
    /// not verify.
    pub async fn verify_two_factor(&self, username: &str, code: &str) -> Result<(), AuthError> {
        if username.is_empty() || code.is_empty() {
            return Err(AuthError::Validation(
                "Missing username or code.".to_string(),
            ));
        }

        let Some(account) = self.store.find_by_username(username).await.map_err(map_store_err)?
        else {
            return Err(AuthError::NotFound);
        };

        let verified = account
            .two_factor_secret
            .as_deref()
            .is_some_and(|secret| totp::verify(secret, code));

        if !verified {
            return Err(AuthError::Unauthorized);
        }

        Ok(())
    }
}

fn map_store_err(err: StoreError) -> AuthError {
    match err {
        StoreError::Duplicate => AuthError::Conflict,
        StoreError::Missing => AuthError::NotFound,
        StoreError::Backend(err) => AuthError::Internal(err),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryCredentialStore;
    use totp_rs::{Algorithm, Secret, TOTP};

    fn authenticator() -> (Authenticator, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        (
            Authenticator::new(store.clone(), "custode".to_string()),
            store,
        )
    }

    fn secret(password: &str) -> SecretString {
        SecretString::from(password.to_string())
    }

    fn current_code(secret_base32: &str) -> String {
        let secret_bytes = Secret::Encoded(secret_base32.to_string())
            .to_bytes()
            .unwrap();
        let totp = TOTP::new(
            Algorithm::SHA1,
            totp::DIGITS,
            totp::SKEW,
            totp::STEP,
            secret_bytes,
            None,
            String::new(),
        )
        .unwrap();
        totp.generate_current().unwrap()
    }

    /// A six-digit code guaranteed not to verify right now: it differs from
    /// the codes of the current step and both adjacent steps.
    fn wrong_code(secret_base32: &str) -> String {
        let secret_bytes = Secret::Encoded(secret_base32.to_string())
            .to_bytes()
            .unwrap();
        let totp = TOTP::new(
            Algorithm::SHA1,
            totp::DIGITS,
            totp::SKEW,
            totp::STEP,
            secret_bytes,
            None,
            String::new(),
        )
        .unwrap();
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let window: Vec<String> = [now - totp::STEP, now, now + totp::STEP]
            .iter()
            .map(|t| totp.generate(*t))
            .collect();

        for candidate in 0..1_000_000u32 {
            let code = format!("{candidate:06}");
            if !window.contains(&code) {
                return code;
            }
        }
        unreachable!("a six digit space cannot be covered by three codes");
    }

    #[tokio::test]
    async fn test_register_creates_password_only_account() {
        let (auth, store) = authenticator();

        let account = auth.register("alice", &secret("Str0ng!Pw")).await.unwrap();
        assert_eq!(account.username, "alice");
        assert!(!account.two_factor_enabled);

        let stored = store.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "Str0ng!Pw");
        assert!(stored.two_factor_secret.is_none());
        assert!(!stored.two_factor_enabled);
    }

    #[tokio::test]
    async fn test_register_rejects_missing_input() {
        let (auth, _) = authenticator();

        let err = auth.register("", &secret("Str0ng!Pw")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let err = auth.register("alice", &secret("")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_reports_all_policy_violations() {
        let (auth, _) = authenticator();

        let err = auth.register("alice", &secret("abc")).await.unwrap_err();
        let AuthError::Policy { missing } = err else {
            panic!("expected policy error");
        };
        assert_eq!(
            missing,
            [
                "at least 8 characters",
                "an uppercase letter",
                "a number",
                "a special character (@$!%*?&)",
            ]
        );
    }

    #[tokio::test]
    async fn test_register_conflicts_on_duplicate_username() {
        let (auth, _) = authenticator();

        auth.register("alice", &secret("Str0ng!Pw")).await.unwrap();
        let err = auth
            .register("alice", &secret("Other1!pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn test_authenticate_is_enumeration_resistant() {
        let (auth, _) = authenticator();
        auth.register("alice", &secret("Str0ng!Pw")).await.unwrap();

        let unknown_user = auth
            .authenticate("mallory", &secret("Str0ng!Pw"))
            .await
            .unwrap_err();
        let wrong_password = auth
            .authenticate("alice", &secret("Wr0ng!Pwd"))
            .await
            .unwrap_err();

        // Same kind and same message for both failure causes
        assert!(matches!(unknown_user, AuthError::Unauthorized));
        assert!(matches!(wrong_password, AuthError::Unauthorized));
        assert_eq!(unknown_user.to_string(), wrong_password.to_string());
    }

    #[tokio::test]
    async fn test_authenticate_reports_two_factor_flag() {
        let (auth, _) = authenticator();
        auth.register("alice", &secret("Str0ng!Pw")).await.unwrap();

        let outcome = auth
            .authenticate("alice", &secret("Str0ng!Pw"))
            .await
            .unwrap();
        assert!(!outcome.two_factor_enabled);

        auth.enable_two_factor("alice").await.unwrap();

        let outcome = auth
            .authenticate("alice", &secret("Str0ng!Pw"))
            .await
            .unwrap();
        assert!(outcome.two_factor_enabled);
    }

    #[tokio::test]
    async fn test_enable_two_factor_upholds_account_invariant() {
        let (auth, store) = authenticator();
        auth.register("alice", &secret("Str0ng!Pw")).await.unwrap();

        let enrollment = auth.enable_two_factor("alice").await.unwrap();

        let stored = store.find_by_username("alice").await.unwrap().unwrap();
        assert!(stored.two_factor_enabled);
        assert_eq!(
            stored.two_factor_secret.as_deref(),
            Some(enrollment.secret_base32.as_str())
        );
        assert!(enrollment
            .provisioning_uri
            .contains(&enrollment.secret_base32));
    }

    #[tokio::test]
    async fn test_enable_two_factor_replaces_previous_secret() {
        let (auth, store) = authenticator();
        auth.register("alice", &secret("Str0ng!Pw")).await.unwrap();

        let first = auth.enable_two_factor("alice").await.unwrap();
        let second = auth.enable_two_factor("alice").await.unwrap();
        assert_ne!(first.secret_base32, second.secret_base32);

        let stored = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(
            stored.two_factor_secret.as_deref(),
            Some(second.secret_base32.as_str())
        );
        assert!(stored.two_factor_enabled);
    }

    #[tokio::test]
    async fn test_enable_two_factor_unknown_user() {
        let (auth, _) = authenticator();

        let err = auth.enable_two_factor("mallory").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[tokio::test]
    async fn test_verify_two_factor_accepts_current_code() {
        let (auth, _) = authenticator();
        auth.register("alice", &secret("Str0ng!Pw")).await.unwrap();
        let enrollment = auth.enable_two_factor("alice").await.unwrap();

        let code = current_code(&enrollment.secret_base32);
        auth.verify_two_factor("alice", &code).await.unwrap();
    }

    #[tokio::test]
    async fn test_verify_two_factor_rejects_wrong_code() {
        let (auth, _) = authenticator();
        auth.register("alice", &secret("Str0ng!Pw")).await.unwrap();
        let enrollment = auth.enable_two_factor("alice").await.unwrap();

        let code = wrong_code(&enrollment.secret_base32);
        let err = auth.verify_two_factor("alice", &code).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn test_verify_two_factor_without_secret_fails_as_bad_code() {
        let (auth, _) = authenticator();
        auth.register("alice", &secret("Str0ng!Pw")).await.unwrap();

        // No secret stored: verification fails, not a distinct error
        let err = auth
            .verify_two_factor("alice", "123456")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn test_verify_two_factor_unknown_user() {
        let (auth, _) = authenticator();

        let err = auth
            .verify_two_factor("mallory", "123456")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }
}
