//! Outgoing mail for Filevault.
//!
//! The application never talks SMTP itself. Messages are appended to a
//! mail_outbox table and drained by an external relay; the only message the
//! system sends today is the one-time sign-in code.

use sqlx::SqlitePool;
use tracing::info;

use crate::{Result, VaultError};

/// Subject line for one-time code mail.
pub const OTP_MAIL_SUBJECT: &str = "Your Filevault sign-in code";

/// Body template for one-time code mail.
pub const OTP_MAIL_BODY: &str = r#"
Hello,

Your one-time sign-in code is:

    {code}

The code expires in {minutes} minutes. If you did not request it, you can
ignore this message.

--
Filevault
"#;

/// A queued outbox message.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutboxMessage {
    /// Message ID.
    pub id: i64,
    /// Recipient email address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Mailer that queues one-time code messages for delivery.
pub struct OtpMailer<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OtpMailer<'a> {
    /// Create a new mailer over the outbox table.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Queue a one-time code message for the given recipient.
    pub async fn send_otp(&self, recipient: &str, code: &str, lifetime_mins: u32) -> Result<()> {
        let body = OTP_MAIL_BODY
            .replace("{code}", code)
            .replace("{minutes}", &lifetime_mins.to_string())
            .trim()
            .to_string();

        sqlx::query("INSERT INTO mail_outbox (recipient, subject, body) VALUES (?, ?, ?)")
            .bind(recipient)
            .bind(OTP_MAIL_SUBJECT)
            .bind(&body)
            .execute(self.pool)
            .await
            .map_err(|e| VaultError::Delivery(e.to_string()))?;

        info!(recipient = %recipient, "Queued one-time code mail");
        Ok(())
    }

    /// List queued messages for a recipient, newest first.
    pub async fn list_for_recipient(&self, recipient: &str) -> Result<Vec<OutboxMessage>> {
        let messages = sqlx::query_as::<_, OutboxMessage>(
            "SELECT id, recipient, subject, body, created_at
             FROM mail_outbox
             WHERE recipient = ?
             ORDER BY id DESC",
        )
        .bind(recipient)
        .fetch_all(self.pool)
        .await
        .map_err(|e| VaultError::Database(e.to_string()))?;

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_send_otp_queues_message() {
        let db = Database::open_in_memory().await.unwrap();
        let mailer = OtpMailer::new(db.pool());

        mailer
            .send_otp("ada@example.com", "123456", 15)
            .await
            .unwrap();

        let messages = mailer.list_for_recipient("ada@example.com").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].subject, OTP_MAIL_SUBJECT);
        assert!(messages[0].body.contains("123456"));
        assert!(messages[0].body.contains("15 minutes"));
    }

    #[tokio::test]
    async fn test_messages_ordered_newest_first() {
        let db = Database::open_in_memory().await.unwrap();
        let mailer = OtpMailer::new(db.pool());

        mailer
            .send_otp("ada@example.com", "111111", 15)
            .await
            .unwrap();
        mailer
            .send_otp("ada@example.com", "222222", 15)
            .await
            .unwrap();

        let messages = mailer.list_for_recipient("ada@example.com").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].body.contains("222222"));
    }

    #[tokio::test]
    async fn test_other_recipients_not_listed() {
        let db = Database::open_in_memory().await.unwrap();
        let mailer = OtpMailer::new(db.pool());

        mailer
            .send_otp("ada@example.com", "111111", 15)
            .await
            .unwrap();

        let messages = mailer.list_for_recipient("bob@example.com").await.unwrap();
        assert!(messages.is_empty());
    }
}
