//! User signup and login endpoints

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cadenza_core::{CadenzaError, Role};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(signup))
        .route("/users/admin", post(admin_signup))
        .route("/users/login", post(login))
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct AdminSignupRequest {
    pub email: String,
    pub password: String,
    pub admin_pass: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user_id: Uuid,
}

/// POST /users/signup - Register a regular user
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_credentials(&req.email, &req.password)?;
    let pass_hash = hash_password(&req.password)?;
    let user_id = state
        .identities
        .create_user(&req.email, pass_hash, Role::User)
        .await?;
    Ok(Json(UserResponse { user_id }))
}

/// POST /users/admin - Register an admin; requires the configured admin pass
async fn admin_signup(
    State(state): State<AppState>,
    Json(req): Json<AdminSignupRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let expected = state.admin_pass.as_deref().ok_or_else(|| {
        AppError::from(CadenzaError::Unauthorized(
            "admin signup is disabled".to_string(),
        ))
    })?;
    if req.admin_pass != expected {
        return Err(CadenzaError::Unauthorized("admin signup failed".to_string()).into());
    }

    validate_credentials(&req.email, &req.password)?;
    let pass_hash = hash_password(&req.password)?;
    let user_id = state
        .identities
        .create_user(&req.email, pass_hash, Role::Admin)
        .await?;
    Ok(Json(UserResponse { user_id }))
}

/// POST /users/login - Verify credentials, returning the user id
async fn login(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .identities
        .find_by_email(&req.email)
        .await
        .ok_or_else(|| {
            AppError::from(CadenzaError::NotFound(format!(
                "no account for {}",
                req.email
            )))
        })?;

    if !verify_password(&req.password, &user.pass_hash) {
        return Err(CadenzaError::Unauthorized("login failed".to_string()).into());
    }

    Ok(Json(UserResponse {
        user_id: user.identity.id,
    }))
}

fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(CadenzaError::Validation("a valid email is required".to_string()).into());
    }
    if password.is_empty() {
        return Err(CadenzaError::Validation("a password is required".to_string()).into());
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CadenzaError::Internal(format!("password hashing failed: {err}")).into())
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-valid-hash"));
    }

    #[test]
    fn credentials_are_validated() {
        assert!(validate_credentials("alice@example.com", "pw").is_ok());
        assert!(validate_credentials("", "pw").is_err());
        assert!(validate_credentials("not-an-email", "pw").is_err());
        assert!(validate_credentials("alice@example.com", "").is_err());
    }
}
