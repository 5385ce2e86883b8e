//! User directory.
//!
//! Sign-up, sign-in, one-time code verification and current-user
//! resolution. The directory owns the account rows of the embedded backend
//! (one per email, created on first code issuance) and the user documents
//! that sit on top of them.

use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use super::gateway::Gateway;
use super::otp::EmailTokenRepository;
use super::session::SessionRepository;
use crate::db::{NewUser, User, UserRepository};
use crate::mail::OtpMailer;
use crate::{Result, VaultError};

/// Result of resolving the caller's identity.
///
/// The branches are deliberately explicit so callers can tell "no session"
/// from "backend unreachable" from "session without a user document".
#[derive(Debug)]
pub enum CurrentUser {
    /// An authenticated user with a matching user document.
    Found(User),
    /// The session is valid but no user document matches the account.
    Missing,
    /// No session secret, or the secret matches no active session.
    Unauthenticated,
    /// The backend could not be reached; the caller is treated as signed
    /// out but the condition is distinguishable.
    Unavailable(String),
}

impl CurrentUser {
    /// Collapse to the user, discarding the failure reason.
    pub fn into_option(self) -> Option<User> {
        match self {
            CurrentUser::Found(user) => Some(user),
            _ => None,
        }
    }
}

/// Result of starting a sign-in.
#[derive(Debug)]
pub enum SignInOutcome {
    /// A one-time code was sent; verification continues with this account.
    OtpSent {
        /// Backend account identifier to verify against.
        account_id: String,
    },
    /// No user document exists for the email. This is a value, not an
    /// error; note it still leaks existence through the response shape.
    UserNotFound,
}

/// A verified session, ready to be stored in the cookie.
#[derive(Debug)]
pub struct VerifiedSession {
    /// Backend session identifier.
    pub session_id: String,
    /// Opaque session secret (the cookie value).
    pub secret: String,
}

/// User directory over the session gateway.
pub struct UserDirectory<'a> {
    gateway: &'a Gateway<'a>,
    otp_lifetime_mins: u32,
    session_lifetime_days: u32,
}

impl<'a> UserDirectory<'a> {
    /// Create a directory with default code/session lifetimes.
    pub fn new(gateway: &'a Gateway<'a>) -> Self {
        Self {
            gateway,
            otp_lifetime_mins: super::otp::DEFAULT_OTP_LIFETIME_MINS,
            session_lifetime_days: super::session::DEFAULT_SESSION_LIFETIME_DAYS,
        }
    }

    /// Override the code and session lifetimes.
    pub fn with_lifetimes(mut self, otp_lifetime_mins: u32, session_lifetime_days: u32) -> Self {
        self.otp_lifetime_mins = otp_lifetime_mins;
        self.session_lifetime_days = session_lifetime_days;
        self
    }

    fn pool(&self) -> &'a SqlitePool {
        self.gateway.admin().pool()
    }

    /// Look up a user document by exact email match (first match wins).
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserRepository::new(self.pool()).get_by_email(email).await
    }

    /// Find or create the backend account for an email.
    async fn get_or_create_account(&self, email: &str) -> Result<String> {
        let pool = self.pool();

        let existing: Option<String> = sqlx::query_scalar("SELECT id FROM accounts WHERE email = ?")
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO accounts (id, email) VALUES (?, ?)")
            .bind(&id)
            .bind(email)
            .execute(pool)
            .await
            .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(id)
    }

    /// Issue a one-time code for an email and queue the delivery mail.
    ///
    /// Creates the backend account on first contact. Returns the account
    /// identifier used later to verify. Any failure along the way surfaces
    /// as a delivery error; nothing is retried.
    pub async fn send_email_otp(&self, email: &str) -> Result<String> {
        let account_id = self
            .get_or_create_account(email)
            .await
            .map_err(|e| VaultError::Delivery(e.to_string()))?;

        let code = EmailTokenRepository::new(self.pool())
            .with_lifetime_mins(self.otp_lifetime_mins)
            .issue(&account_id)
            .await
            .map_err(|e| VaultError::Delivery(e.to_string()))?;

        OtpMailer::new(self.pool())
            .send_otp(email, &code, self.otp_lifetime_mins)
            .await?;

        info!(account_id = %account_id, "Issued one-time code");
        Ok(account_id)
    }

    /// Start the sign-up flow.
    ///
    /// A code is issued whether or not the user already exists; the user
    /// document is only created when absent (placeholder avatar, zero
    /// usage counter). Returns the account identifier, not a session.
    pub async fn create_account(&self, full_name: &str, email: &str) -> Result<String> {
        let existing = self.get_user_by_email(email).await?;

        let account_id = self
            .send_email_otp(email)
            .await
            .map_err(|e| VaultError::OtpIssuance(e.to_string()))?;

        if existing.is_none() {
            UserRepository::new(self.pool())
                .create(&NewUser::new(full_name, email, account_id.clone()))
                .await?;
            info!(email = %email, "Created user document");
        }

        Ok(account_id)
    }

    /// Start the sign-in flow for an existing user.
    pub async fn sign_in(&self, email: &str) -> Result<SignInOutcome> {
        match self.get_user_by_email(email).await? {
            Some(_) => {
                let account_id = self.send_email_otp(email).await?;
                Ok(SignInOutcome::OtpSent { account_id })
            }
            None => {
                info!(email = %email, "Sign-in attempt for unknown user");
                Ok(SignInOutcome::UserNotFound)
            }
        }
    }

    /// Exchange a one-time code for a session.
    ///
    /// On success the caller stores the returned secret in the session
    /// cookie. On rejection (wrong, expired or reused code) the attempt is
    /// logged and `None` is returned so the caller can re-prompt.
    pub async fn verify_otp(&self, account_id: &str, code: &str) -> Result<Option<VerifiedSession>> {
        let consumed = EmailTokenRepository::new(self.pool())
            .consume(account_id, code)
            .await?;

        if consumed.is_none() {
            warn!(account_id = %account_id, "One-time code rejected");
            return Ok(None);
        }

        let session = SessionRepository::new(self.pool())
            .with_lifetime_days(self.session_lifetime_days)
            .create(account_id)
            .await?;

        info!(account_id = %account_id, session_id = %session.id, "Session created");

        Ok(Some(VerifiedSession {
            session_id: session.id,
            secret: session.secret,
        }))
    }

    /// Resolve the caller's identity from a session secret.
    ///
    /// Transport errors never propagate out of this method; they collapse
    /// into the `Unavailable` branch.
    pub async fn current_user(&self, secret: Option<&str>) -> CurrentUser {
        let handle = match self.gateway.session(secret) {
            Some(handle) => handle,
            None => return CurrentUser::Unauthenticated,
        };

        let account_id = match handle.account_id().await {
            Ok(Some(account_id)) => account_id,
            Ok(None) => return CurrentUser::Unauthenticated,
            Err(e) => {
                warn!("Failed to resolve session account: {e}");
                return CurrentUser::Unavailable(e.to_string());
            }
        };

        match UserRepository::new(self.pool())
            .get_by_account_id(&account_id)
            .await
        {
            Ok(Some(user)) => CurrentUser::Found(user),
            Ok(None) => CurrentUser::Missing,
            Err(e) => {
                warn!("Failed to load user document: {e}");
                CurrentUser::Unavailable(e.to_string())
            }
        }
    }

    /// End the session behind the secret.
    ///
    /// Returns true when a session was deleted, false when there was none.
    /// The web layer clears the cookie and redirects to the sign-in entry
    /// point regardless of the outcome.
    pub async fn sign_out(&self, secret: Option<&str>) -> Result<bool> {
        let handle = match self.gateway.session(secret) {
            Some(handle) => handle,
            None => return Ok(false),
        };

        match handle.delete_session().await {
            Ok(()) => Ok(true),
            Err(VaultError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
