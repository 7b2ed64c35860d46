//! Storage collaborators for users, posts and comments

pub mod memory;
pub mod traits;

pub use memory::MemoryStorageProvider;
pub use traits::{
    Comment, CommentStorage, NewComment, NewPost, Post, PostStorage, PostUpdate,
    StorageProvider, UserStorage,
};
