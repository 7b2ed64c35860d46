//! Post endpoints

use serde::{Deserialize, Serialize};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Rejection;

use crate::auth::{Action, Principal};
use crate::core::AppState;
use crate::error::{PostboardError, Result};
use crate::handlers::{json_reply, optional_text, require_owned, required_text};
use crate::storage::{NewPost, Post, PostUpdate};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletePostResponse {
    pub id: i64,
    pub comments_deleted: usize,
}

pub async fn create_post(state: &AppState, principal: &Principal, request: CreatePostRequest) -> Result<Post> {
    let title = required_text("title", request.title)?;
    let content = optional_text("content", request.content)?;

    state
        .store
        .posts()
        .create_post(NewPost {
            owner_id: principal.id,
            title,
            content,
        })
        .await
}

pub async fn list_posts(state: &AppState) -> Result<Vec<Post>> {
    state.store.posts().list_posts().await
}

pub async fn get_post(state: &AppState, post_id: i64) -> Result<Post> {
    state
        .store
        .posts()
        .find_post(post_id)
        .await?
        .ok_or_else(|| PostboardError::NotFound("Post".to_string()))
}

/// Owner-only partial update
pub async fn update_post(
    state: &AppState,
    principal: &Principal,
    post_id: i64,
    request: UpdatePostRequest,
) -> Result<Post> {
    let existing = state.store.posts().find_post(post_id).await?;
    require_owned(state, principal, existing, Action::Update).await?;

    let update = PostUpdate {
        title: optional_text("title", request.title)?,
        content: optional_text("content", request.content)?,
    };
    if update.title.is_none() && update.content.is_none() {
        return Err(PostboardError::ValidationError(
            "nothing to update, provide title or content".to_string(),
        ));
    }

    // The post can vanish between the check and the write
    state
        .store
        .posts()
        .update_post(post_id, update)
        .await?
        .ok_or_else(|| PostboardError::NotFound("Post".to_string()))
}

/// Owner-only delete, taking every comment on the post with it.
///
/// Comments go first and the post second, in two separate store calls, so a
/// failure in between leaves a post without comments. Nothing is locked
/// across the calls: a comment created concurrently can land after the
/// cascade and outlive its post.
pub async fn delete_post(state: &AppState, principal: &Principal, post_id: i64) -> Result<DeletePostResponse> {
    let existing = state.store.posts().find_post(post_id).await?;
    let post = require_owned(state, principal, existing, Action::Delete).await?;

    let comments_deleted = state.store.comments().delete_comments_for_post(post.id).await?;
    if !state.store.posts().delete_post(post.id).await? {
        return Err(PostboardError::NotFound("Post".to_string()));
    }

    log::info!(
        "User {} deleted post {} and {} comment(s)",
        principal.id,
        post.id,
        comments_deleted
    );

    Ok(DeletePostResponse {
        id: post.id,
        comments_deleted,
    })
}

pub async fn handle_create_post(
    principal: Principal,
    request: CreatePostRequest,
    state: AppState,
) -> std::result::Result<Response, Rejection> {
    json_reply(create_post(&state, &principal, request).await, StatusCode::CREATED)
}

pub async fn handle_list_posts(state: AppState) -> std::result::Result<Response, Rejection> {
    json_reply(list_posts(&state).await, StatusCode::OK)
}

pub async fn handle_get_post(post_id: i64, state: AppState) -> std::result::Result<Response, Rejection> {
    json_reply(get_post(&state, post_id).await, StatusCode::OK)
}

pub async fn handle_update_post(
    post_id: i64,
    principal: Principal,
    request: UpdatePostRequest,
    state: AppState,
) -> std::result::Result<Response, Rejection> {
    json_reply(update_post(&state, &principal, post_id, request).await, StatusCode::OK)
}

pub async fn handle_delete_post(
    post_id: i64,
    principal: Principal,
    state: AppState,
) -> std::result::Result<Response, Rejection> {
    json_reply(delete_post(&state, &principal, post_id).await, StatusCode::OK)
}
