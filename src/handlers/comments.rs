//! Comment endpoints, always addressed through their parent post

use serde::Deserialize;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Rejection;

use crate::auth::{Action, Principal};
use crate::core::AppState;
use crate::error::{PostboardError, Result};
use crate::handlers::posts::get_post;
use crate::handlers::{json_reply, require_owned, required_text};
use crate::storage::{Comment, NewComment};

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: Option<String>,
}

/// The comment if it exists and hangs off `post_id`
async fn find_comment_on_post(state: &AppState, post_id: i64, comment_id: i64) -> Result<Option<Comment>> {
    get_post(state, post_id).await?;

    let comment = state.store.comments().find_comment(comment_id).await?;
    Ok(comment.filter(|c| c.post_id == post_id))
}

/// Comment on an existing post; the caller becomes its owner
pub async fn create_comment(
    state: &AppState,
    principal: &Principal,
    post_id: i64,
    request: CommentRequest,
) -> Result<Comment> {
    let post = get_post(state, post_id).await?;
    let content = required_text("content", request.content)?;

    state
        .store
        .comments()
        .create_comment(NewComment {
            post_id: post.id,
            owner_id: principal.id,
            content,
        })
        .await
}

pub async fn list_comments(state: &AppState, post_id: i64) -> Result<Vec<Comment>> {
    get_post(state, post_id).await?;
    state.store.comments().list_comments_for_post(post_id).await
}

pub async fn update_comment(
    state: &AppState,
    principal: &Principal,
    post_id: i64,
    comment_id: i64,
    request: CommentRequest,
) -> Result<Comment> {
    let existing = find_comment_on_post(state, post_id, comment_id).await?;
    require_owned(state, principal, existing, Action::Update).await?;

    let content = required_text("content", request.content)?;
    state
        .store
        .comments()
        .update_comment(comment_id, content)
        .await?
        .ok_or_else(|| PostboardError::NotFound("Comment".to_string()))
}

pub async fn delete_comment(
    state: &AppState,
    principal: &Principal,
    post_id: i64,
    comment_id: i64,
) -> Result<Comment> {
    let existing = find_comment_on_post(state, post_id, comment_id).await?;
    let comment = require_owned(state, principal, existing, Action::Delete).await?;

    if !state.store.comments().delete_comment(comment.id).await? {
        return Err(PostboardError::NotFound("Comment".to_string()));
    }
    Ok(comment)
}

pub async fn handle_create_comment(
    post_id: i64,
    principal: Principal,
    request: CommentRequest,
    state: AppState,
) -> std::result::Result<Response, Rejection> {
    json_reply(create_comment(&state, &principal, post_id, request).await, StatusCode::CREATED)
}

pub async fn handle_list_comments(post_id: i64, state: AppState) -> std::result::Result<Response, Rejection> {
    json_reply(list_comments(&state, post_id).await, StatusCode::OK)
}

pub async fn handle_update_comment(
    post_id: i64,
    comment_id: i64,
    principal: Principal,
    request: CommentRequest,
    state: AppState,
) -> std::result::Result<Response, Rejection> {
    json_reply(
        update_comment(&state, &principal, post_id, comment_id, request).await,
        StatusCode::OK,
    )
}

pub async fn handle_delete_comment(
    post_id: i64,
    comment_id: i64,
    principal: Principal,
    state: AppState,
) -> std::result::Result<Response, Rejection> {
    json_reply(delete_comment(&state, &principal, post_id, comment_id).await, StatusCode::OK)
}
