//! In-memory storage implementation for development and testing
//!
//! Each table sits behind its own `RwLock`; a write lock is held for the
//! whole of one operation, which gives per-record atomicity.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::traits::*;
use crate::auth::user::{NewPrincipal, Principal};
use crate::error::{PostboardError, Result};

/// Rows keyed by id plus the next id to hand out
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// In-memory storage provider
pub struct MemoryStorageProvider {
    users: RwLock<Table<Principal>>,
    posts: RwLock<Table<Post>>,
    comments: RwLock<Table<Comment>>,
}

impl MemoryStorageProvider {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Table::new()),
            posts: RwLock::new(Table::new()),
            comments: RwLock::new(Table::new()),
        }
    }
}

impl Default for MemoryStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStorage for MemoryStorageProvider {
    async fn create_user(&self, user: NewPrincipal) -> Result<Principal> {
        let mut users = self.users.write().await;

        if users.rows.values().any(|existing| existing.email == user.email) {
            return Err(PostboardError::ConstraintViolation(format!(
                "email {} is already registered",
                user.email
            )));
        }

        let principal = Principal {
            id: users.allocate_id(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.rows.insert(principal.id, principal.clone());

        Ok(principal)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<Principal>> {
        Ok(self.users.read().await.rows.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Principal>> {
        let users = self.users.read().await;
        Ok(users.rows.values().find(|user| user.email == email).cloned())
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool> {
        Ok(self.users.write().await.rows.remove(&user_id).is_some())
    }
}

#[async_trait]
impl PostStorage for MemoryStorageProvider {
    async fn create_post(&self, post: NewPost) -> Result<Post> {
        let mut posts = self.posts.write().await;
        let now = Utc::now();

        let post = Post {
            id: posts.allocate_id(),
            owner_id: post.owner_id,
            title: post.title,
            content: post.content,
            created_at: now,
            updated_at: now,
        };
        posts.rows.insert(post.id, post.clone());

        Ok(post)
    }

    async fn find_post(&self, post_id: i64) -> Result<Option<Post>> {
        Ok(self.posts.read().await.rows.get(&post_id).cloned())
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.read().await.rows.values().cloned().collect())
    }

    async fn update_post(&self, post_id: i64, update: PostUpdate) -> Result<Option<Post>> {
        let mut posts = self.posts.write().await;

        match posts.rows.get_mut(&post_id) {
            Some(post) => {
                if let Some(title) = update.title {
                    post.title = title;
                }
                if let Some(content) = update.content {
                    post.content = Some(content);
                }
                post.updated_at = Utc::now();
                Ok(Some(post.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_post(&self, post_id: i64) -> Result<bool> {
        Ok(self.posts.write().await.rows.remove(&post_id).is_some())
    }
}

#[async_trait]
impl CommentStorage for MemoryStorageProvider {
    async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        let mut comments = self.comments.write().await;
        let now = Utc::now();

        let comment = Comment {
            id: comments.allocate_id(),
            post_id: comment.post_id,
            owner_id: comment.owner_id,
            content: comment.content,
            created_at: now,
            updated_at: now,
        };
        comments.rows.insert(comment.id, comment.clone());

        Ok(comment)
    }

    async fn find_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        Ok(self.comments.read().await.rows.get(&comment_id).cloned())
    }

    async fn list_comments_for_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let comments = self.comments.read().await;
        Ok(comments
            .rows
            .values()
            .filter(|comment| comment.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn update_comment(&self, comment_id: i64, content: String) -> Result<Option<Comment>> {
        let mut comments = self.comments.write().await;

        match comments.rows.get_mut(&comment_id) {
            Some(comment) => {
                comment.content = content;
                comment.updated_at = Utc::now();
                Ok(Some(comment.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool> {
        Ok(self.comments.write().await.rows.remove(&comment_id).is_some())
    }

    async fn delete_comments_for_post(&self, post_id: i64) -> Result<usize> {
        let mut comments = self.comments.write().await;
        let before = comments.rows.len();
        comments.rows.retain(|_, comment| comment.post_id != post_id);
        Ok(before - comments.rows.len())
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn users(&self) -> &dyn UserStorage {
        self
    }

    fn posts(&self) -> &dyn PostStorage {
        self
    }

    fn comments(&self) -> &dyn CommentStorage {
        self
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewPrincipal {
        NewPrincipal {
            email: email.to_string(),
            name: "Test".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_ids_increment_and_email_is_unique() {
        let store = MemoryStorageProvider::new();

        let a = store.create_user(new_user("a@x.com")).await.unwrap();
        let b = store.create_user(new_user("b@x.com")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let duplicate = store.create_user(new_user("a@x.com")).await;
        assert!(matches!(duplicate, Err(PostboardError::ConstraintViolation(_))));

        let found = store.find_user_by_email("b@x.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(2));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let store = MemoryStorageProvider::new();
        let a = store.create_user(new_user("a@x.com")).await.unwrap();

        assert!(store.delete_user(a.id).await.unwrap());
        assert!(!store.delete_user(a.id).await.unwrap());
        assert!(store.find_user(a.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_partial_post_update() {
        let store = MemoryStorageProvider::new();
        let post = store
            .create_post(NewPost {
                owner_id: 1,
                title: "p1".to_string(),
                content: Some("body".to_string()),
            })
            .await
            .unwrap();

        let updated = store
            .update_post(
                post.id,
                PostUpdate {
                    title: Some("p1 edited".to_string()),
                    content: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "p1 edited");
        assert_eq!(updated.content.as_deref(), Some("body"));
        assert!(store.update_post(99, PostUpdate::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_comments_for_post_leaves_other_posts() {
        let store = MemoryStorageProvider::new();

        for (post_id, owner_id) in [(5, 1), (5, 2), (5, 3), (6, 1)] {
            store
                .create_comment(NewComment {
                    post_id,
                    owner_id,
                    content: "hi".to_string(),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.delete_comments_for_post(5).await.unwrap(), 3);
        assert!(store.list_comments_for_post(5).await.unwrap().is_empty());
        assert_eq!(store.list_comments_for_post(6).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_comment_inserted_after_cascade_outlives_post() {
        let store = MemoryStorageProvider::new();
        let post = store
            .create_post(NewPost {
                owner_id: 1,
                title: "p1".to_string(),
                content: None,
            })
            .await
            .unwrap();
        let comment = |content: &str| NewComment {
            post_id: post.id,
            owner_id: 2,
            content: content.to_string(),
        };

        store.create_comment(comment("before")).await.unwrap();
        assert_eq!(store.delete_comments_for_post(post.id).await.unwrap(), 1);

        // A writer that saw the post before the cascade is not blocked
        store.create_comment(comment("late")).await.unwrap();
        assert!(store.delete_post(post.id).await.unwrap());

        let orphans = store.list_comments_for_post(post.id).await.unwrap();
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].content, "late");
    }
}
