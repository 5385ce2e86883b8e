//! Request DTOs for the Web API.

use serde::Deserialize;
use validator::Validate;

/// Sign-up request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpRequest {
    /// Full display name.
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Sign-in request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// One-time code resend request.
#[derive(Debug, Deserialize, Validate)]
pub struct ResendOtpRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// One-time code verification request.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    /// Account identifier returned when the code was issued.
    #[validate(length(min = 1, message = "Account id is required"))]
    pub account_id: String,
    /// The 6-digit code from the email.
    #[validate(length(equal = 6, message = "Code must be 6 digits"))]
    pub code: String,
}

/// File rename request.
#[derive(Debug, Deserialize, Validate)]
pub struct RenameFileRequest {
    /// New base name, without extension.
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    /// Extension to reattach.
    pub extension: String,
    /// Owning account id attached to the request.
    pub account_id: String,
    /// Route path to invalidate.
    pub path: String,
}

/// Shared-user replacement request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFileUsersRequest {
    /// Complete replacement set of shared emails.
    pub emails: Vec<String>,
    /// Owning account id attached to the request.
    pub account_id: String,
    /// Route path to invalidate.
    pub path: String,
}

/// File delete request.
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteFileRequest {
    /// Object id of the paired blob.
    #[validate(length(min = 1, message = "Bucket file id is required"))]
    pub bucket_file_id: String,
    /// Owning account id attached to the request.
    pub account_id: String,
    /// Route path to invalidate.
    pub path: String,
}

/// Query parameters for listing files.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilesQuery {
    /// Comma-separated categories, e.g. `video,audio`.
    pub types: Option<String>,
    /// Substring match on the display name.
    pub search: Option<String>,
    /// Sort specification, e.g. `created_at-desc`.
    pub sort: Option<String>,
    /// Maximum number of results.
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_up_validation() {
        let ok = SignUpRequest {
            full_name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = SignUpRequest {
            full_name: "Ada".to_string(),
            email: "not-an-email".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let empty_name = SignUpRequest {
            full_name: String::new(),
            email: "ada@example.com".to_string(),
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_verify_otp_validation() {
        let ok = VerifyOtpRequest {
            account_id: "acc-1".to_string(),
            code: "123456".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short_code = VerifyOtpRequest {
            account_id: "acc-1".to_string(),
            code: "123".to_string(),
        };
        assert!(short_code.validate().is_err());
    }
}
