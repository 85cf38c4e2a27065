//! Handlers for sign-up and login.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::auth::{LoginRequest, SignupRequest, TokenResponse};
use crate::api::extract::ApiJson;
use crate::application::services::SignUp;
use crate::error::AppError;
use crate::state::AppState;

/// Registers a user with the `user` role and returns an access token.
///
/// # Endpoint
///
/// `POST /auth/signup`
///
/// # Errors
///
/// - 400 if the body fails validation
/// - 409 if the email or username is taken
pub async fn signup_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let token = state
        .auth_service
        .sign_up(SignUp {
            username: payload.username,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok(Json(TokenResponse::bearer(token)))
}

/// Exchanges credentials for an access token.
///
/// # Endpoint
///
/// `POST /auth/login`
///
/// # Errors
///
/// - 400 if the body fails validation
/// - 401 on unknown email or wrong password
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    payload.validate()?;

    let token = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(TokenResponse::bearer(token)))
}
