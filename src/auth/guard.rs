//! Ownership authorization
//!
//! Reads are open to everyone, creation needs only an authenticated principal
//! (who becomes the owner), and updates and deletes are reserved to the
//! recorded owner. Existence is checked before ownership so a missing target
//! is always `NotFound`, never `Forbidden`.

use std::fmt;

use crate::auth::user::Principal;
use crate::error::{PostboardError, Result};
use crate::storage::traits::{Comment, Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_mutation(self) -> bool {
        matches!(self, Action::Update | Action::Delete)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Post,
    Comment,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Post => f.write_str("Post"),
            ResourceKind::Comment => f.write_str("Comment"),
        }
    }
}

/// A record with a single owning principal
pub trait Owned {
    const KIND: ResourceKind;

    fn id(&self) -> i64;

    fn owner_id(&self) -> i64;
}

impl Owned for Post {
    const KIND: ResourceKind = ResourceKind::Post;

    fn id(&self) -> i64 {
        self.id
    }

    fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

impl Owned for Comment {
    const KIND: ResourceKind = ResourceKind::Comment;

    fn id(&self) -> i64 {
        self.id
    }

    fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// Target does not exist
    NotFound,
    /// Target exists but belongs to someone else
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(Denial),
}

/// Decide whether `principal` may perform `action` on `resource`.
///
/// `resource` is `None` when the lookup found nothing. For `Create` the
/// argument is ignored.
pub fn authorize<R: Owned>(principal: &Principal, resource: Option<&R>, action: Action) -> Decision {
    if action == Action::Create {
        return Decision::Allowed;
    }

    let Some(resource) = resource else {
        return Decision::Denied(Denial::NotFound);
    };

    if !action.is_mutation() || principal.owns(resource.owner_id()) {
        Decision::Allowed
    } else {
        Decision::Denied(Denial::Forbidden)
    }
}

/// Run [`authorize`] and hand back the resource when allowed.
///
/// Not meant for `Create`, which has no resource to hand back.
pub fn require<R: Owned>(principal: &Principal, resource: Option<R>, action: Action) -> Result<R> {
    match authorize(principal, resource.as_ref(), action) {
        Decision::Allowed => resource.ok_or_else(|| PostboardError::NotFound(R::KIND.to_string())),
        Decision::Denied(Denial::NotFound) => Err(PostboardError::NotFound(R::KIND.to_string())),
        Decision::Denied(Denial::Forbidden) => Err(PostboardError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn principal(id: i64) -> Principal {
        Principal {
            id,
            email: format!("user{}@x.com", id),
            name: format!("user{}", id),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn post(id: i64, owner_id: i64) -> Post {
        let now = Utc::now();
        Post {
            id,
            owner_id,
            title: "p".to_string(),
            content: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn comment(id: i64, post_id: i64, owner_id: i64) -> Comment {
        let now = Utc::now();
        Comment {
            id,
            post_id,
            owner_id,
            content: "c".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_owner_may_mutate() {
        let owner = principal(1);
        let target = post(5, 1);

        assert_eq!(authorize(&owner, Some(&target), Action::Update), Decision::Allowed);
        assert_eq!(authorize(&owner, Some(&target), Action::Delete), Decision::Allowed);
    }

    #[test]
    fn test_non_owner_is_forbidden() {
        let other = principal(2);
        let target = post(5, 1);

        assert_eq!(
            authorize(&other, Some(&target), Action::Delete),
            Decision::Denied(Denial::Forbidden)
        );
        assert_eq!(
            authorize(&other, Some(&comment(3, 5, 1)), Action::Update),
            Decision::Denied(Denial::Forbidden)
        );
    }

    #[test]
    fn test_missing_resource_is_not_found_for_anyone() {
        for action in [Action::Read, Action::Update, Action::Delete] {
            assert_eq!(
                authorize::<Post>(&principal(1), None, action),
                Decision::Denied(Denial::NotFound)
            );
        }
    }

    #[test]
    fn test_reads_are_open() {
        assert_eq!(
            authorize(&principal(2), Some(&post(5, 1)), Action::Read),
            Decision::Allowed
        );
    }

    #[test]
    fn test_create_needs_no_ownership() {
        assert_eq!(authorize::<Comment>(&principal(9), None, Action::Create), Decision::Allowed);
    }

    #[test]
    fn test_require_maps_to_error_kinds() {
        let owner = principal(1);
        let other = principal(2);

        let allowed = require(&owner, Some(post(5, 1)), Action::Delete).unwrap();
        assert_eq!(allowed.id, 5);

        assert!(matches!(
            require(&other, Some(post(5, 1)), Action::Delete),
            Err(PostboardError::Forbidden)
        ));
        assert!(matches!(
            require::<Post>(&owner, None, Action::Delete),
            Err(PostboardError::NotFound(ref what)) if what == "Post"
        ));
    }
}
