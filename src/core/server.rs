//! HTTP router and server startup

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::config::ServerConfig;
use crate::constants::MAX_BODY_BYTES;
use crate::core::state::{with_state, AppState};
use crate::error::{PostboardError, Result};
use crate::handlers::{auth, comments, handle_health, posts, users, with_principal};
use crate::security::{with_api_security_headers, HSTS_HEADER};
use crate::tls::TlsConfigBuilder;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn user_routes(state: AppState) -> BoxedFilter<(Response,)> {
    let register = warp::path!("user")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(users::handle_register);

    let current_user = warp::path!("user")
        .and(warp::get())
        .and(with_principal(state.clone()))
        .and_then(users::handle_current_user);

    let get_user = warp::path!("user" / i64)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(users::handle_get_user);

    let login = warp::path!("login")
        .and(warp::post())
        .and(json_body())
        .and(warp::addr::remote())
        .and(with_state(state))
        .and_then(auth::handle_login);

    register
        .or(current_user)
        .unify()
        .or(get_user)
        .unify()
        .or(login)
        .unify()
        .boxed()
}

fn post_routes(state: AppState) -> BoxedFilter<(Response,)> {
    let create = warp::path!("post")
        .and(warp::post())
        .and(with_principal(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(posts::handle_create_post);

    let list = warp::path!("posts")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(posts::handle_list_posts);

    let get = warp::path!("post" / i64)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(posts::handle_get_post);

    let update = warp::path!("post" / i64)
        .and(warp::patch())
        .and(with_principal(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(posts::handle_update_post);

    let delete = warp::path!("post" / i64)
        .and(warp::delete())
        .and(with_principal(state.clone()))
        .and(with_state(state))
        .and_then(posts::handle_delete_post);

    create
        .or(list)
        .unify()
        .or(get)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

fn comment_routes(state: AppState) -> BoxedFilter<(Response,)> {
    let create = warp::path!("post" / i64 / "comment")
        .and(warp::post())
        .and(with_principal(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(comments::handle_create_comment);

    let list = warp::path!("post" / i64 / "comments")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(comments::handle_list_comments);

    let update = warp::path!("post" / i64 / "comment" / i64)
        .and(warp::patch())
        .and(with_principal(state.clone()))
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(comments::handle_update_comment);

    let delete = warp::path!("post" / i64 / "comment" / i64)
        .and(warp::delete())
        .and(with_principal(state.clone()))
        .and(with_state(state))
        .and_then(comments::handle_delete_comment);

    create
        .or(list)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

/// Every route of the API with error recovery and security headers applied
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .map(|| "Hello World".into_response());

    let health = warp::path!("health")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_health);

    index
        .or(health)
        .unify()
        .or(user_routes(state.clone()))
        .unify()
        .or(post_routes(state.clone()))
        .unify()
        .or(comment_routes(state))
        .unify()
        .recover(handle_rejection)
        .map(|reply| with_api_security_headers(reply))
        .with(warp::log("postboard::api"))
}

/// Map any rejection to exactly one status with a JSON error body
pub async fn handle_rejection(err: Rejection) -> std::result::Result<Response, Infallible> {
    let (status, message) = if let Some(e) = err.find::<PostboardError>() {
        if e.status_code().is_server_error() {
            log::error!("Request failed: {}", e);
        } else {
            log::debug!("Request rejected: {}", e);
        }
        (e.status_code(), e.public_message())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e))
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Content-Length required".to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Expected application/json".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    let body = warp::reply::json(&ErrorBody { error: message });
    Ok(warp::reply::with_status(body, status).into_response())
}

/// Serve the API until the process exits
pub async fn run(config: ServerConfig, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| PostboardError::ConfigError(format!("Failed to parse server address: {}", e)))?;

    state.security.clone().start_cleanup_task();
    let api = routes(state);

    if config.enable_tls {
        let (cert_path, key_path) = match (config.tls_cert_path, config.tls_key_path) {
            (Some(cert), Some(key)) => (cert, key),
            _ => {
                return Err(PostboardError::ConfigError(
                    "TLS is enabled but certificate or key path is missing".to_string(),
                ))
            }
        };

        // Fail startup on unreadable or mismatched material before binding
        TlsConfigBuilder::new(cert_path.clone(), key_path.clone()).build()?;

        log::info!("Starting Postboard server on https://{}", addr);
        warp::serve(api.with(warp::reply::with::header(HSTS_HEADER.0, HSTS_HEADER.1)))
            .tls()
            .cert_path(cert_path)
            .key_path(key_path)
            .run(addr)
            .await;
    } else {
        if !config.development_mode {
            log::warn!("TLS is disabled; bearer tokens travel in plaintext unless a proxy terminates TLS");
        }
        log::info!("Starting Postboard server on http://{}", addr);
        warp::serve(api).run(addr).await;
    }

    Ok(())
}
