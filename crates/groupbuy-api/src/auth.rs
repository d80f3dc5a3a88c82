use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use groupbuy_types::api::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    UpdateUsernameRequest,
};

use crate::AppState;
use crate::error::{ApiError, required};
use crate::token;

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = required(req.email, "email")?;
    let password = required(req.password, "password")?;
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::validation("email and password are required"));
    }

    if state.db.get_user_by_email(&email)?.is_some() {
        return Err(ApiError::Conflict("email already registered".into()));
    }

    let password_hash = hash_password(&password)?;
    let user_id = Uuid::new_v4().to_string();
    state
        .db
        .create_user(&user_id, &email, &req.username, &password_hash)?;

    Ok(Json(AuthResponse {
        success: true,
        user_id,
        username: req.username,
        email,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = required(req.email, "email")?;
    let password = required(req.password, "password")?;

    let invalid = || ApiError::Unauthorized("wrong email or password".into());
    let user = state.db.get_user_by_email(&email)?.ok_or_else(invalid)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt password hash: {}", e)))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| invalid())?;

    Ok(Json(AuthResponse {
        success: true,
        user_id: user.id,
        username: user.username,
        email: user.email,
    }))
}

/// Always answers with the same generic success message: neither the
/// existence of the account nor a delivery failure is disclosed.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(email) = req.email.filter(|e| !e.is_empty()) {
        if state.db.get_user_by_email(&email)?.is_some() {
            let reset_token = token::issue_reset_token(&state.token_secret, &email)?;
            let reset_url = format!("{}/{}", state.reset_url_base, reset_token);
            if let Err(e) = state.mailer.send_reset_link(&email, &reset_url) {
                warn!(%email, "reset email delivery failed: {:#}", e);
            }
        }
    }

    Ok(Json(json!({
        "success": true,
        "message": "If that address is registered, a reset link has been sent"
    })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reset_token = required(req.token, "token")?;
    let new_password = required(req.new_password, "new_password")?;
    if new_password.is_empty() {
        return Err(ApiError::validation("new_password must not be empty"));
    }

    let email = token::verify_reset_token(&state.token_secret, &reset_token)?;

    let password_hash = hash_password(&new_password)?;
    // Account deleted between issue and redeem reads as a dead link.
    if !state.db.update_password(&email, &password_hash)? {
        return Err(ApiError::TokenInvalid);
    }

    Ok(Json(json!({
        "success": true,
        "message": "password updated, please log in again"
    })))
}

pub async fn update_username(
    State(state): State<AppState>,
    Json(req): Json<UpdateUsernameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = required(req.user_id, "user_id")?;

    if !state.db.update_username(&user_id, &req.username)? {
        return Err(ApiError::NotFound("user"));
    }

    Ok(Json(json!({ "success": true, "username": req.username })))
}
