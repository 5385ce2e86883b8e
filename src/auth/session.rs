//! Backend session management.
//!
//! A session is created when a one-time code is verified. The session
//! secret is an opaque value handed to the cookie layer; it is the only
//! thing the client ever holds.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{Result, VaultError};

/// Default session lifetime in days.
pub const DEFAULT_SESSION_LIFETIME_DAYS: u32 = 30;

/// Backend session entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Session ID.
    pub id: String,
    /// Account this session authenticates.
    pub account_id: String,
    /// Opaque session secret (cookie value).
    pub secret: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Expiration timestamp.
    pub expires_at: String,
}

/// Repository for backend session operations.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
    lifetime_days: u32,
}

impl<'a> SessionRepository<'a> {
    /// Create a new repository instance with the default lifetime.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            lifetime_days: DEFAULT_SESSION_LIFETIME_DAYS,
        }
    }

    /// Override the session lifetime.
    pub fn with_lifetime_days(mut self, lifetime_days: u32) -> Self {
        self.lifetime_days = lifetime_days;
        self
    }

    /// Create a new session for an account.
    pub async fn create(&self, account_id: &str) -> Result<Session> {
        let id = Uuid::new_v4().to_string();
        let secret = Uuid::new_v4().to_string();
        let expires_at = (Utc::now() + chrono::Duration::days(self.lifetime_days as i64))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        sqlx::query(
            "INSERT INTO sessions (id, account_id, secret, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(account_id)
        .bind(&secret)
        .bind(&expires_at)
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        self.get_active(&secret)
            .await?
            .ok_or_else(|| VaultError::NotFound("session".to_string()))
    }

    /// Get a session by secret, provided it has not expired.
    pub async fn get_active(&self, secret: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, account_id, secret, created_at, expires_at
             FROM sessions
             WHERE secret = ? AND expires_at > datetime('now')",
        )
        .bind(secret)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(session)
    }

    /// Delete a session by secret.
    ///
    /// Returns true if a session was deleted.
    pub async fn delete_by_secret(&self, secret: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE secret = ?")
            .bind(secret)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete expired sessions (cleanup).
    pub async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= datetime('now')")
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
