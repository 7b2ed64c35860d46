//! Request handlers for the HTTP API
//!
//! Each handler pairs a plain async function returning `Result<T>` with a thin
//! warp-facing wrapper. Failures become custom rejections which the router's
//! recovery turns into exactly one status code.

pub mod auth;
pub mod comments;
pub mod posts;
pub mod users;

use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

use crate::auth::guard::{self, Action, Owned};
use crate::auth::Principal;
use crate::core::AppState;
use crate::error::{PostboardError, Result};
use crate::security_logger::SecurityEvent;

pub use auth::with_principal;

/// Serialize a handler result with `status`, or reject with its error
pub fn json_reply<T: Serialize>(result: Result<T>, status: StatusCode) -> std::result::Result<Response, Rejection> {
    match result {
        Ok(value) => Ok(warp::reply::with_status(warp::reply::json(&value), status).into_response()),
        Err(e) => Err(warp::reject::custom(e)),
    }
}

/// Liveness plus a store round-trip; 503 while the store is unhealthy
pub async fn handle_health(state: AppState) -> std::result::Result<Response, Rejection> {
    let healthy = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            log::error!("Store health check failed: {}", e);
            false
        }
    };

    let reply = if healthy {
        warp::reply::with_status("OK", StatusCode::OK)
    } else {
        log::warn!("Health check reporting store unavailable");
        warp::reply::with_status("Unavailable", StatusCode::SERVICE_UNAVAILABLE)
    };
    Ok(reply.into_response())
}

/// Trimmed, non-empty value of a required text field
pub(crate) fn required_text(field: &str, value: Option<String>) -> Result<String> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    if value.is_empty() {
        return Err(PostboardError::ValidationError(format!("{} is required", field)));
    }
    Ok(value)
}

/// Like [`required_text`] but absence is fine; only a blank value is rejected
pub(crate) fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>> {
    value.map(|v| required_text(field, Some(v))).transpose()
}

/// Ownership check that records denials in the security log
pub(crate) async fn require_owned<R: Owned>(
    state: &AppState,
    principal: &Principal,
    resource: Option<R>,
    action: Action,
) -> Result<R> {
    let target = resource
        .as_ref()
        .map(|r| format!("{} {}", R::KIND, r.id()))
        .unwrap_or_default();

    let result = guard::require(principal, resource, action);
    if let Err(PostboardError::Forbidden) = &result {
        state
            .security
            .log_event(SecurityEvent::PermissionDenied {
                user_id: principal.id,
                action: action.to_string(),
                resource: target,
            })
            .await;
    }
    result
}
