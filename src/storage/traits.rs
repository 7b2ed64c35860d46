//! Abstract storage interfaces for pluggable backends
//!
//! Every operation is keyed and returns the record or its absence. Each call
//! is atomic for the records it touches; nothing spans calls, so multi-step
//! flows (post deletion with its comments) are not transactional.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::user::{NewPrincipal, Principal};
use crate::error::Result;

/// A post owned by a principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub owner_id: i64,
    pub title: String,
    pub content: Option<String>,
}

/// Partial post update; `None` leaves the field as is
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// A comment on a post, owned by its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub owner_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub owner_id: i64,
    pub content: String,
}

/// User data storage interface
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Create a user; fails with `ConstraintViolation` if the email is taken
    async fn create_user(&self, user: NewPrincipal) -> Result<Principal>;

    /// Get user by ID
    async fn find_user(&self, user_id: i64) -> Result<Option<Principal>>;

    /// Get user by email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<Principal>>;

    /// Delete a user, returning whether it existed
    async fn delete_user(&self, user_id: i64) -> Result<bool>;
}

/// Post storage interface
#[async_trait]
pub trait PostStorage: Send + Sync {
    async fn create_post(&self, post: NewPost) -> Result<Post>;

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>>;

    /// All posts in ascending id order
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Apply a partial update, returning the new record if the post exists
    async fn update_post(&self, post_id: i64, update: PostUpdate) -> Result<Option<Post>>;

    async fn delete_post(&self, post_id: i64) -> Result<bool>;
}

/// Comment storage interface
#[async_trait]
pub trait CommentStorage: Send + Sync {
    async fn create_comment(&self, comment: NewComment) -> Result<Comment>;

    async fn find_comment(&self, comment_id: i64) -> Result<Option<Comment>>;

    /// Comments of one post in ascending id order
    async fn list_comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    async fn update_comment(&self, comment_id: i64, content: String) -> Result<Option<Comment>>;

    async fn delete_comment(&self, comment_id: i64) -> Result<bool>;

    /// Remove every comment of a post regardless of author; returns the count
    async fn delete_comments_for_post(&self, post_id: i64) -> Result<usize>;
}

/// Combined storage provider interface
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Get user storage backend
    fn users(&self) -> &dyn UserStorage;

    /// Get post storage backend
    fn posts(&self) -> &dyn PostStorage;

    /// Get comment storage backend
    fn comments(&self) -> &dyn CommentStorage;

    /// Health check for the storage backend
    async fn health_check(&self) -> Result<bool>;
}
