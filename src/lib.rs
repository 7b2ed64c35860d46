//! Postboard - users, posts and comments over HTTP
//!
//! This library provides the authentication and ownership-authorization
//! layer of the service: password login, signed bearer tokens, and a guard
//! that only lets a resource's owner update or delete it.

pub mod auth;
pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod handlers;
pub mod security;
pub mod security_logger;
pub mod storage;
pub mod tls;

// Re-export main components
pub use config::*;
pub use constants::*;
pub use error::{PostboardError, Result};
