// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

// Bearer tokens are valid for one hour after issuance
pub const TOKEN_VALIDITY_SECS: i64 = 3600;

// Login attempts never answer faster than this, success or failure
pub const DEFAULT_LOGIN_MIN_DURATION_MS: u64 = 100;

pub const MIN_SECRET_LENGTH: usize = 32;
pub const MIN_PASSWORD_LENGTH: usize = 6;

// Upper bound for JSON request bodies
pub const MAX_BODY_BYTES: u64 = 16 * 1024;
