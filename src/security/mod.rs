//! Security utilities and middleware

pub mod headers;
pub mod timing;

pub use headers::{with_api_security_headers, HSTS_HEADER};
pub use timing::{add_auth_delay, AuthTimer};
