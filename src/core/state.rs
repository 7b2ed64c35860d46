//! Shared state handed to every request handler

use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

use crate::auth::{Authenticator, TokenManager};
use crate::config::ServerConfig;
use crate::error::Result;
use crate::security_logger::SecurityLogger;
use crate::storage::{MemoryStorageProvider, StorageProvider};

/// Store, authenticator and security log, cheap to clone per request
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StorageProvider>,
    pub authenticator: Arc<Authenticator>,
    pub security: Arc<SecurityLogger>,
}

impl AppState {
    /// Wire the auth layer over a store using the signing secret from `config`
    pub fn new(config: &ServerConfig, store: Arc<dyn StorageProvider>) -> Result<Self> {
        let tokens = Arc::new(TokenManager::new(&config.jwt_secret));
        let authenticator = Authenticator::new(store.clone(), tokens, config.login_min_duration)?;

        Ok(Self {
            store,
            authenticator: Arc::new(authenticator),
            security: Arc::new(SecurityLogger::new()),
        })
    }

    /// State over a fresh in-memory store
    pub fn in_memory(config: &ServerConfig) -> Result<Self> {
        Self::new(config, Arc::new(MemoryStorageProvider::new()))
    }
}

// Helper function to include state in request
pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}
