//! Authentication handlers: bearer-token gating and password login

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection};

use crate::auth::token::extract_bearer_token;
use crate::auth::{Credentials, Principal};
use crate::core::state::{with_state, AppState};
use crate::error::{AuthFailure, PostboardError, Result};
use crate::handlers::{json_reply, required_text};
use crate::security_logger::SecurityEvent;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: Principal,
}

/// Resolve the Authorization header of a request to a principal.
///
/// Every failure is logged with its reason and surfaces as the same
/// `AuthenticationFailure`.
pub async fn authenticate_request(
    state: &AppState,
    auth_header: Option<&str>,
    addr: Option<SocketAddr>,
) -> Result<Principal> {
    let result = match auth_header.and_then(extract_bearer_token) {
        Some(token) => {
            state
                .authenticator
                .authenticate(Credentials::Token(token.to_string()))
                .await
        }
        None => Err(AuthFailure::MissingToken.into()),
    };

    if let Err(PostboardError::AuthenticationFailure(reason)) = &result {
        state
            .security
            .log_event(SecurityEvent::TokenValidationFailed { addr, reason: *reason })
            .await;
    }
    result
}

/// Filter extracting the authenticated principal, rejecting otherwise
pub fn with_principal(state: AppState) -> impl Filter<Extract = (Principal,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::addr::remote())
        .and(with_state(state))
        .and_then(|header: Option<String>, addr: Option<SocketAddr>, state: AppState| async move {
            authenticate_request(&state, header.as_deref(), addr)
                .await
                .map_err(warp::reject::custom)
        })
}

/// Check credentials and mint a bearer token
pub async fn login(state: &AppState, request: LoginRequest, addr: Option<SocketAddr>) -> Result<LoginResponse> {
    let email = required_text("email", request.email)?.to_lowercase();
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| PostboardError::ValidationError("password is required".to_string()))?;

    let principal = match state
        .authenticator
        .authenticate(Credentials::Password { email: email.clone(), password })
        .await
    {
        Ok(principal) => principal,
        Err(PostboardError::AuthenticationFailure(reason)) => {
            state
                .security
                .log_event(SecurityEvent::AuthenticationFailed {
                    email: Some(email),
                    addr,
                    reason,
                })
                .await;
            return Err(PostboardError::AuthenticationFailure(reason));
        }
        Err(e) => return Err(e),
    };

    let tokens = state.authenticator.tokens();
    let token = tokens.issue(&principal)?;

    state
        .security
        .log_event(SecurityEvent::AuthenticationSuccess { user_id: principal.id, addr })
        .await;

    Ok(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: tokens.validity_secs(),
        user: principal,
    })
}

pub async fn handle_login(
    request: LoginRequest,
    addr: Option<SocketAddr>,
    state: AppState,
) -> std::result::Result<Response, Rejection> {
    json_reply(login(&state, request, addr).await, StatusCode::OK)
}
