//! Session cookie extraction.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use std::convert::Infallible;

use crate::auth::SESSION_COOKIE;

/// Extractor for the session secret stored in the session cookie.
///
/// Always succeeds; an absent or empty cookie yields `None`, which the
/// services treat as the explicit "no session" signal.
#[derive(Debug, Clone)]
pub struct SessionSecret(pub Option<String>);

impl SessionSecret {
    /// The secret as an optional borrowed string.
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for SessionSecret
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let secret = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty());

        Ok(SessionSecret(secret))
    }
}
