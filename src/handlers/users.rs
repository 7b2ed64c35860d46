//! User registration and lookup

use serde::Deserialize;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Rejection;

use crate::auth::password::hash_password;
use crate::auth::{NewPrincipal, Principal};
use crate::constants::MIN_PASSWORD_LENGTH;
use crate::core::AppState;
use crate::error::{PostboardError, Result};
use crate::handlers::{json_reply, required_text};
use crate::security_logger::SecurityEvent;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Create a principal with a freshly hashed password
pub async fn register(state: &AppState, request: RegisterRequest) -> Result<Principal> {
    let name = required_text("name", request.name)?;
    let email = required_text("email", request.email)?.to_lowercase();
    if !email.contains('@') {
        return Err(PostboardError::ValidationError("email is invalid".to_string()));
    }

    let password = request.password.unwrap_or_default();
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PostboardError::ValidationError(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let password_hash = hash_password(password).await?;

    let result = state
        .store
        .users()
        .create_user(NewPrincipal {
            email: email.clone(),
            name,
            password_hash,
        })
        .await;

    match &result {
        Ok(principal) => log::info!("Registered user {}", principal.id),
        Err(PostboardError::ConstraintViolation(reason)) => {
            state
                .security
                .log_event(SecurityEvent::RegistrationRejected {
                    email,
                    reason: reason.clone(),
                })
                .await;
        }
        Err(_) => {}
    }
    result
}

pub async fn get_user(state: &AppState, user_id: i64) -> Result<Principal> {
    state
        .store
        .users()
        .find_user(user_id)
        .await?
        .ok_or_else(|| PostboardError::NotFound("User".to_string()))
}

pub async fn handle_register(request: RegisterRequest, state: AppState) -> std::result::Result<Response, Rejection> {
    json_reply(register(&state, request).await, StatusCode::CREATED)
}

pub async fn handle_current_user(principal: Principal) -> std::result::Result<Response, Rejection> {
    json_reply(Ok(principal), StatusCode::OK)
}

pub async fn handle_get_user(user_id: i64, state: AppState) -> std::result::Result<Response, Rejection> {
    json_reply(get_user(&state, user_id).await, StatusCode::OK)
}
