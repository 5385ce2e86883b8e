//! Authentication handlers.

use axum::{extract::State, response::Redirect, Json};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use validator::Validate;

use crate::auth::{
    expired_session_cookie, session_cookie, CurrentUser, Gateway, SignInOutcome, UserDirectory,
};
use crate::web::dto::{
    ApiResponse, OtpIssuedResponse, ResendOtpRequest, SessionCreatedResponse, SignInRequest,
    SignInResponse, SignUpRequest, UserResponse, VerifyOtpRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SessionSecret;

fn directory<'a>(state: &AppState, gateway: &'a Gateway<'a>) -> UserDirectory<'a> {
    UserDirectory::new(gateway).with_lifetimes(
        state.config.session.otp_lifetime_mins,
        state.config.session.lifetime_days,
    )
}

/// POST /api/auth/sign-up - Start the sign-up flow.
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<ApiResponse<OtpIssuedResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let gateway = Gateway::new(&state.db, &state.bucket);
    let account_id = directory(&state, &gateway)
        .create_account(&req.full_name, &req.email)
        .await?;

    Ok(Json(ApiResponse::new(OtpIssuedResponse { account_id })))
}

/// POST /api/auth/sign-in - Start the sign-in flow.
///
/// An unknown email answers with a distinct in-band shape, not an error
/// status.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<ApiResponse<SignInResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let gateway = Gateway::new(&state.db, &state.bucket);
    let outcome = directory(&state, &gateway).sign_in(&req.email).await?;

    let response = match outcome {
        SignInOutcome::OtpSent { account_id } => SignInResponse {
            account_id: Some(account_id),
            error: None,
        },
        SignInOutcome::UserNotFound => SignInResponse {
            account_id: None,
            error: Some("user not found".to_string()),
        },
    };

    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/auth/otp/resend - Re-issue a one-time code.
pub async fn resend_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResendOtpRequest>,
) -> Result<Json<ApiResponse<OtpIssuedResponse>>, ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let gateway = Gateway::new(&state.db, &state.bucket);
    let account_id = directory(&state, &gateway)
        .send_email_otp(&req.email)
        .await?;

    Ok(Json(ApiResponse::new(OtpIssuedResponse { account_id })))
}

/// POST /api/auth/verify - Exchange a one-time code for a session.
///
/// On success the session secret is stored in the session cookie.
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<(CookieJar, Json<ApiResponse<SessionCreatedResponse>>), ApiError> {
    req.validate().map_err(ApiError::from_validation_errors)?;

    let gateway = Gateway::new(&state.db, &state.bucket);
    let verified = directory(&state, &gateway)
        .verify_otp(&req.account_id, &req.code)
        .await?;

    match verified {
        Some(session) => Ok((
            jar.add(session_cookie(session.secret)),
            Json(ApiResponse::new(SessionCreatedResponse {
                session_id: session.session_id,
            })),
        )),
        None => Err(ApiError::unauthorized("Invalid or expired code")),
    }
}

/// GET /api/auth/me - Resolve the current user.
pub async fn me(
    State(state): State<Arc<AppState>>,
    secret: SessionSecret,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let gateway = Gateway::new(&state.db, &state.bucket);

    match directory(&state, &gateway)
        .current_user(secret.as_deref())
        .await
    {
        CurrentUser::Found(user) => Ok(Json(ApiResponse::new(user.into()))),
        CurrentUser::Unavailable(reason) => {
            tracing::error!("Current-user resolution unavailable: {reason}");
            Err(ApiError::internal("Backend unavailable"))
        }
        CurrentUser::Missing | CurrentUser::Unauthenticated => {
            Err(ApiError::unauthorized("Not signed in"))
        }
    }
}

/// POST /api/auth/sign-out - End the session.
///
/// The cookie is cleared and the caller redirected to the sign-in entry
/// point even when the backend deletion fails.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    secret: SessionSecret,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    let gateway = Gateway::new(&state.db, &state.bucket);

    if let Err(e) = directory(&state, &gateway)
        .sign_out(secret.as_deref())
        .await
    {
        tracing::warn!("Sign-out failed: {e}");
    }

    (jar.add(expired_session_cookie()), Redirect::to("/sign-in"))
}
