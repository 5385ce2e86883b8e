//! Email one-time-code repository.
//!
//! One-time codes are short-lived 6-digit codes emailed to a user to prove
//! email ownership. Only the code hash is stored; consumption is atomic so
//! a code can be used exactly once even under concurrent verification.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::{Result, VaultError};

/// Default one-time code lifetime in minutes.
pub const DEFAULT_OTP_LIFETIME_MINS: u32 = 15;

/// Number of digits in a one-time code.
const CODE_DIGITS: u32 = 6;

/// Email token entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmailToken {
    /// Token ID.
    pub id: i64,
    /// Account the code was issued for.
    pub account_id: String,
    /// SHA-256 hex digest of the code.
    pub code_hash: String,
    /// Expiration timestamp.
    pub expires_at: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Used timestamp (None if not used).
    pub used_at: Option<String>,
}

impl EmailToken {
    /// Check if the token has been used.
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }
}

/// Hash a one-time code for storage and lookup.
fn hash_code(code: &str) -> String {
    let digest = Sha256::digest(code.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Generate a random 6-digit code, zero-padded.
fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..10u32.pow(CODE_DIGITS));
    format!("{n:0width$}", width = CODE_DIGITS as usize)
}

/// Repository for email one-time-code operations.
pub struct EmailTokenRepository<'a> {
    pool: &'a SqlitePool,
    lifetime_mins: u32,
}

impl<'a> EmailTokenRepository<'a> {
    /// Create a new repository instance with the default code lifetime.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            lifetime_mins: DEFAULT_OTP_LIFETIME_MINS,
        }
    }

    /// Override the code lifetime.
    pub fn with_lifetime_mins(mut self, lifetime_mins: u32) -> Self {
        self.lifetime_mins = lifetime_mins;
        self
    }

    /// Issue a new one-time code for an account.
    ///
    /// Returns the plaintext code; it exists only long enough to be handed
    /// to the mailer and is never stored.
    pub async fn issue(&self, account_id: &str) -> Result<String> {
        let code = generate_code();
        let expires_at = (Utc::now() + chrono::Duration::minutes(self.lifetime_mins as i64))
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        sqlx::query(
            "INSERT INTO email_tokens (account_id, code_hash, expires_at) VALUES (?, ?, ?)",
        )
        .bind(account_id)
        .bind(hash_code(&code))
        .bind(&expires_at)
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(code)
    }

    /// Consume a valid (not expired, not used) code and mark it as used
    /// atomically.
    ///
    /// Returns the token if it was valid and successfully marked as used.
    /// The UPDATE ... RETURNING form ensures the code can only be used once
    /// even with concurrent requests.
    pub async fn consume(&self, account_id: &str, code: &str) -> Result<Option<EmailToken>> {
        let result = sqlx::query_as::<_, EmailToken>(
            "UPDATE email_tokens
             SET used_at = datetime('now')
             WHERE account_id = ?
               AND code_hash = ?
               AND used_at IS NULL
               AND expires_at > datetime('now')
             RETURNING id, account_id, code_hash, expires_at, created_at, used_at",
        )
        .bind(account_id)
        .bind(hash_code(code))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Delete expired and used codes (cleanup).
    pub async fn cleanup(&self) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM email_tokens WHERE expires_at < datetime('now') OR used_at IS NOT NULL",
        )
        .execute(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
