//! Server configuration module
//! Handles configuration parameters for the HTTP API server

use crate::constants::{
    DEFAULT_HOST, DEFAULT_LOGIN_MIN_DURATION_MS, DEFAULT_PORT, MIN_SECRET_LENGTH,
};
use crate::error::{PostboardError, Result};
use std::env;
use std::time::Duration;

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JWT secret for token signing/validation
    pub jwt_secret: String,
    /// Minimum wall-clock duration of a login attempt
    pub login_min_duration: Duration,
    /// Development mode (relaxes nothing security-related, only logging)
    pub development_mode: bool,
    /// TLS configuration
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
    /// Enable TLS
    pub enable_tls: bool,
}

impl ServerConfig {
    /// Create a test configuration - DANGEROUS: Only for testing!
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            jwt_secret: "test-jwt-key-only-for-unit-tests-never-use-in-production".to_string(),
            login_min_duration: Duration::from_millis(0),
            development_mode: true,
            tls_cert_path: None,
            tls_key_path: None,
            enable_tls: false,
        }
    }

    /// Validate that a secret meets security requirements
    fn validate_secret(secret: &str) -> Result<()> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(PostboardError::ConfigError(format!(
                "JWT secret must be at least {} characters long",
                MIN_SECRET_LENGTH
            )));
        }

        // Check for insecure default or example values
        let insecure_patterns = [
            "your_jwt_secret_key",
            "your-secret-key",
            "change-this",
            "changeme",
            "default",
            "password",
            "12345",
        ];

        let lowered = secret.to_lowercase();
        for pattern in &insecure_patterns {
            if lowered.contains(pattern) {
                return Err(PostboardError::ConfigError(format!(
                    "JWT secret contains insecure pattern '{}'. Please use a secure random secret generated with: openssl rand -base64 32",
                    pattern
                )));
            }
        }

        if secret.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(PostboardError::ConfigError(
                "JWT secret should contain mixed characters (letters, numbers, symbols) for security".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// `from_env` is this with the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false)
        };

        let host = lookup("POSTBOARD_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("POSTBOARD_PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                PostboardError::ConfigError(format!("POSTBOARD_PORT is not a valid port: {}", raw))
            })?,
            None => DEFAULT_PORT,
        };

        let login_min_ms = lookup("POSTBOARD_LOGIN_MIN_DURATION_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LOGIN_MIN_DURATION_MS);

        // SECURITY: no fallback secret, a missing one is a deployment error
        let jwt_secret = lookup("POSTBOARD_JWT_SECRET")
            .or_else(|| lookup("JWT_SECRET"))
            .ok_or_else(|| {
                PostboardError::ConfigError(
                    "JWT_SECRET environment variable is required for security. \
                     Generate one with: openssl rand -base64 32"
                        .to_string(),
                )
            })?;
        Self::validate_secret(&jwt_secret)?;

        let development_mode = flag("POSTBOARD_DEVELOPMENT_MODE");

        // TLS configuration
        let enable_tls = flag("POSTBOARD_ENABLE_TLS");
        let tls_cert_path = lookup("POSTBOARD_TLS_CERT_PATH");
        let tls_key_path = lookup("POSTBOARD_TLS_KEY_PATH");

        if enable_tls {
            match (&tls_cert_path, &tls_key_path) {
                (Some(cert_path), Some(key_path)) => {
                    if !std::path::Path::new(cert_path).exists() {
                        return Err(PostboardError::ConfigError(format!(
                            "TLS certificate file does not exist: {}",
                            cert_path
                        )));
                    }
                    if !std::path::Path::new(key_path).exists() {
                        return Err(PostboardError::ConfigError(format!(
                            "TLS private key file does not exist: {}",
                            key_path
                        )));
                    }
                }
                _ => {
                    return Err(PostboardError::ConfigError(
                        "TLS is enabled but POSTBOARD_TLS_CERT_PATH or POSTBOARD_TLS_KEY_PATH is not set".to_string(),
                    ));
                }
            }
        }

        Ok(Self {
            host,
            port,
            jwt_secret,
            login_min_duration: Duration::from_millis(login_min_ms),
            development_mode,
            enable_tls,
            tls_cert_path,
            tls_key_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const GOOD_SECRET: &str = "k9V2q7Lm4xT8rB1nZ6cW3yH5pJ0sD7fQ";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_for_testing_works_in_tests() {
        let config = ServerConfig::for_testing();
        assert!(config.jwt_secret.contains("test"));
        assert!(config.development_mode);
    }

    #[test]
    fn test_missing_secret_fails_startup() {
        let result = ServerConfig::from_lookup(lookup_from(&[]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_plain_jwt_secret_variable_is_accepted() {
        let config = ServerConfig::from_lookup(lookup_from(&[("JWT_SECRET", GOOD_SECRET)])).unwrap();
        assert_eq!(config.jwt_secret, GOOD_SECRET);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(
            config.login_min_duration,
            Duration::from_millis(DEFAULT_LOGIN_MIN_DURATION_MS)
        );
    }

    #[test]
    fn test_prefixed_secret_wins() {
        let other = "Zq1Wx2Ec3Rv4Tb5Yn6Um7Ii8Oo9Pp0Aa1S";
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", GOOD_SECRET),
            ("POSTBOARD_JWT_SECRET", other),
        ]))
        .unwrap();
        assert_eq!(config.jwt_secret, other);
    }

    #[test]
    fn test_original_placeholder_secret_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[(
            "JWT_SECRET",
            "your_jwt_secret_key_padded_out_to_32_chars_1",
        )]));
        assert!(result.is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[("JWT_SECRET", "short1")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_alphabetic_secret_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[(
            "JWT_SECRET",
            "abcdefghijklmnopqrstuvwxyzABCDEFGH",
        )]));
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_port_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", GOOD_SECRET),
            ("POSTBOARD_PORT", "http"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_tls_requires_paths() {
        let result = ServerConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", GOOD_SECRET),
            ("POSTBOARD_ENABLE_TLS", "true"),
        ]));
        assert!(result.unwrap_err().to_string().contains("TLS"));
    }
}
