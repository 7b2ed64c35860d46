//! Authentication and authorization module

pub mod authenticator;
pub mod guard;
pub mod password;
pub mod token;
pub mod user;

// Re-export main components
pub use authenticator::{Authenticator, Credentials};
pub use guard::{authorize, require, Action, Decision, Denial, Owned, ResourceKind};
pub use token::{extract_bearer_token, Claims, TokenManager};
pub use user::{NewPrincipal, Principal};
