//! Resolving inbound credentials to a live principal
//!
//! Two strategies exist, a password login and a bearer token. Both resolve
//! against the store on every call, so callers always act on current data
//! rather than whatever the token carried when it was minted.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::password::{hash_password_blocking, verify_password};
use crate::auth::token::TokenManager;
use crate::auth::user::Principal;
use crate::error::{AuthFailure, Result};
use crate::security::AuthTimer;
use crate::storage::StorageProvider;

/// Credentials presented by a caller
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Email and plaintext password from a login request
    Password { email: String, password: String },
    /// Raw bearer token from the Authorization header
    Token(String),
}

/// Authenticates credentials against the store
pub struct Authenticator {
    store: Arc<dyn StorageProvider>,
    tokens: Arc<TokenManager>,
    // Verified against when the email is unknown so both failure paths do the same work
    decoy_hash: String,
    login_min_duration: Duration,
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn StorageProvider>,
        tokens: Arc<TokenManager>,
        login_min_duration: Duration,
    ) -> Result<Self> {
        let decoy_hash = hash_password_blocking("decoy password for unknown accounts")?;

        Ok(Self {
            store,
            tokens,
            decoy_hash,
            login_min_duration,
        })
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Resolve credentials of either kind to a principal.
    ///
    /// Fails with `AuthenticationFailure` carrying the precise reason; store
    /// errors pass through unchanged.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<Principal> {
        match credentials {
            Credentials::Password { email, password } => {
                self.authenticate_password(&email, password).await
            }
            Credentials::Token(token) => self.authenticate_token(&token).await,
        }
    }

    /// Check an email/password pair.
    ///
    /// Unknown email and wrong password both end in `BadCredentials` after a
    /// full hash comparison and the same minimum duration.
    pub async fn authenticate_password(&self, email: &str, password: String) -> Result<Principal> {
        let timer = AuthTimer::new(self.login_min_duration);

        let candidate = match self.store.users().find_user_by_email(email).await {
            Ok(candidate) => candidate,
            Err(e) => {
                timer.wait().await;
                return Err(e);
            }
        };

        let stored_hash = candidate
            .as_ref()
            .map(|principal| principal.password_hash.clone())
            .unwrap_or_else(|| self.decoy_hash.clone());
        let matched = verify_password(password, stored_hash).await;

        timer.wait().await;

        match candidate {
            Some(principal) if matched => Ok(principal),
            _ => Err(AuthFailure::BadCredentials.into()),
        }
    }

    /// Validate a bearer token: signature, then expiry, then subject lookup.
    pub async fn authenticate_token(&self, token: &str) -> Result<Principal> {
        let claims = self.tokens.decode(token)?;

        self.store
            .users()
            .find_user(claims.subject_id)
            .await?
            .ok_or_else(|| AuthFailure::UnknownSubject.into())
    }
}
