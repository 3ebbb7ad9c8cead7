use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub is_valid: bool,
}

/// POST /auth/register - create an account and receive an identity token
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    validate_registration(&payload)?;

    let users = UserRepository::new(state.db.clone());

    if users.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::bad_request("User with this email already exists"));
    }

    let digest = auth::hash_password(&payload.password).map_err(|e| {
        tracing::error!("password hashing failed: {}", e);
        ApiError::bad_request("An unexpected error occurred during registration.")
    })?;

    let user = users
        .insert(&payload.first_name, &payload.last_name, &payload.email, &digest)
        .await?;

    tracing::info!(user_id = user.id, "registered new user");

    let token = issue_for(&user)?;
    Ok(Json(TokenResponse { token }))
}

/// POST /auth/login - authenticate and receive an identity token. Unknown
/// email and wrong password fail identically.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let users = UserRepository::new(state.db.clone());

    let user = users
        .find_by_email(&payload.email)
        .await?
        .filter(|user| auth::verify_password(&payload.password, &user.password_hash))
        .ok_or_else(|| ApiError::bad_request("Invalid email or password"))?;

    let token = issue_for(&user)?;
    Ok(Json(TokenResponse { token }))
}

/// POST /auth/validate - report whether a token is currently valid. Always
/// answers 200; validity is carried in the body.
pub async fn validate(Json(payload): Json<ValidateRequest>) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        is_valid: auth::verify_token(&payload.token).is_ok(),
    })
}

fn issue_for(user: &crate::database::models::User) -> Result<String, ApiError> {
    auth::issue_token(user).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::bad_request("An unexpected error occurred while processing the request.")
    })
}

fn validate_registration(payload: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();

    if payload.first_name.trim().is_empty() {
        errors.push("First name is required".to_string());
    }
    if payload.last_name.trim().is_empty() {
        errors.push("Last name is required".to_string());
    }
    if !is_plausible_email(&payload.email) {
        errors.push("Email address is invalid".to_string());
    }
    if payload.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error(errors.join(", ")))
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
