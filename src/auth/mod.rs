//! Authentication for Filevault: one-time email codes, backend sessions,
//! the session gateway and the user directory.

mod directory;
mod gateway;
mod otp;
mod session;

pub use directory::{CurrentUser, SignInOutcome, UserDirectory, VerifiedSession};
pub use gateway::{
    expired_session_cookie, session_cookie, AdminHandle, Gateway, SessionHandle, SESSION_COOKIE,
    SESSION_COOKIE_MAX_AGE_SECS,
};
pub use otp::{EmailToken, EmailTokenRepository, DEFAULT_OTP_LIFETIME_MINS};
pub use session::{Session, SessionRepository, DEFAULT_SESSION_LIFETIME_DAYS};
