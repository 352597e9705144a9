//! Credential store contract and implementations.
//!
//! The store is the only place state lives between operations; it is handed
//! to the orchestrator explicitly so tests can swap in a double. Username
//! uniqueness is the store's job: concurrent registrations for the same name
//! must resolve here, not in the orchestrator.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

/// A stored account.
///
/// `two_factor_secret` is set if and only if `two_factor_enabled` is true;
/// both fields are written in the same update.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub two_factor_secret: Option<String>,
    pub two_factor_enabled: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Unique constraint on `username` rejected the write.
    #[error("username already exists")]
    Duplicate,

    /// No account for the given username.
    #[error("account not found")]
    Missing,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Durable record of accounts, keyed by unique username.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// Create an account in the password-only state. Fails with
    /// [`StoreError::Duplicate`] instead of overwriting on collision.
    async fn create(&self, username: &str, password_hash: &str) -> Result<Account, StoreError>;

    /// Persist `secret` and set the enabled flag in one atomic write, so no
    /// reader ever observes one without the other. Replaces any previous
    /// secret.
    async fn enable_two_factor(&self, username: &str, secret: &str)
        -> Result<Account, StoreError>;
}

/// Postgres-backed store.
///
/// Expected schema:
///
/// ```sql
/// CREATE TABLE accounts (
///     id                 UUID PRIMARY KEY,
///     username           TEXT NOT NULL UNIQUE,
///     password_hash      TEXT NOT NULL,
///     two_factor_secret  TEXT,
///     two_factor_enabled BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let query = r"
            SELECT id, username, password_hash, two_factor_secret, two_factor_enabled
            FROM accounts WHERE username = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );

        sqlx::query_as::<_, Account>(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| {
                StoreError::Backend(anyhow::Error::new(err).context("failed to look up account"))
            })
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<Account, StoreError> {
        let query = r"
            INSERT INTO accounts (id, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, two_factor_secret, two_factor_enabled
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );

        let row = sqlx::query_as::<_, Account>(query)
            .bind(Uuid::new_v4())
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(account) => Ok(account),
            Err(err) if is_unique_violation(&err) => Err(StoreError::Duplicate),
            Err(err) => Err(StoreError::Backend(
                anyhow::Error::new(err).context("failed to create account"),
            )),
        }
    }

    async fn enable_two_factor(
        &self,
        username: &str,
        secret: &str,
    ) -> Result<Account, StoreError> {
        let query = r"
            UPDATE accounts
            SET two_factor_secret = $2, two_factor_enabled = TRUE
            WHERE username = $1
            RETURNING id, username, password_hash, two_factor_secret, two_factor_enabled
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );

        sqlx::query_as::<_, Account>(query)
            .bind(username)
            .bind(secret)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| {
                StoreError::Backend(anyhow::Error::new(err).context("failed to enable 2FA"))
            })?
            .ok_or(StoreError::Missing)
    }
}

/// In-memory store used as a test double and for local development.
///
/// A single mutex around the map plays the role Postgres's unique index
/// plays for [`PgCredentialStore`]: concurrent creates for the same
/// username serialize here and at most one succeeds.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    accounts: Mutex<HashMap<String, Account>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Account>>, StoreError> {
        self.accounts
            .lock()
            .map_err(|_| StoreError::Backend(anyhow::anyhow!("account map mutex poisoned")))
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.locked()?.get(username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<Account, StoreError> {
        let mut accounts = self.locked()?;

        if accounts.contains_key(username) {
            return Err(StoreError::Duplicate);
        }

        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            two_factor_secret: None,
            two_factor_enabled: false,
        };
        accounts.insert(username.to_string(), account.clone());

        Ok(account)
    }

    async fn enable_two_factor(
        &self,
        username: &str,
        secret: &str,
    ) -> Result<Account, StoreError> {
        let mut accounts = self.locked()?;

        let account = accounts.get_mut(username).ok_or(StoreError::Missing)?;
        account.two_factor_secret = Some(secret.to_string());
        account.two_factor_enabled = true;

        Ok(account.clone())
    }
}
