use log::{error, info, warn};

use postboard::config::ServerConfig;
use postboard::core::{run, AppState};

#[tokio::main]
async fn main() {
    // Initialize env
    let dotenv_result = dotenvy::dotenv();

    // Initialize logging
    env_logger::init();

    match dotenv_result {
        Ok(path) => info!("Environment variables loaded from {}", path.display()),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration: host={}, port={}, tls={}, development_mode={}",
        config.host, config.port, config.enable_tls, config.development_mode
    );

    let state = match AppState::in_memory(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config, state).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
