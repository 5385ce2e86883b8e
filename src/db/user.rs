//! User model for Filevault.

use serde::Serialize;

/// Placeholder avatar used until the user uploads a real one.
pub const DEFAULT_AVATAR_URL: &str =
    "https://img.freepik.com/free-psd/3d-illustration-person-with-sunglasses_23-2149436188.jpg";

/// User document representing a registered user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user document ID.
    pub id: String,
    /// Full display name.
    pub full_name: String,
    /// Email address (unique).
    pub email: String,
    /// Avatar URL.
    pub avatar: String,
    /// Backend account identifier this user belongs to.
    pub account_id: String,
    /// Display-only storage counter, initialized to zero at sign-up.
    /// Actual usage is always derived by aggregation over the files.
    pub used_storage: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

/// Data for creating a new user document.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Full display name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL.
    pub avatar: String,
    /// Backend account identifier.
    pub account_id: String,
}

impl NewUser {
    /// Create a new user with the placeholder avatar.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            avatar: DEFAULT_AVATAR_URL.to_string(),
            account_id: account_id.into(),
        }
    }

    /// Set a specific avatar URL.
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = avatar.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = NewUser::new("Ada Lovelace", "ada@example.com", "acc-1");

        assert_eq!(user.full_name, "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.account_id, "acc-1");
        assert_eq!(user.avatar, DEFAULT_AVATAR_URL);
    }

    #[test]
    fn test_new_user_with_avatar() {
        let user = NewUser::new("Ada", "ada@example.com", "acc-1")
            .with_avatar("https://example.com/ada.png");

        assert_eq!(user.avatar, "https://example.com/ada.png");
    }
}
