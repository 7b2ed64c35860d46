//! Security headers for HTTP responses
//!
//! Every response of the JSON API carries these.

/// Strict Content Security Policy for API endpoints
const STRICT_CSP: &str = "default-src 'none'; frame-ancestors 'none';";

const PERMISSIONS_POLICY: &str = "geolocation=(), microphone=(), camera=(), payment=(), usb=()";

/// Wrap a reply with strict security headers for API endpoints
pub fn with_api_security_headers<T: warp::Reply>(reply: T) -> impl warp::Reply {
    let reply = warp::reply::with_header(reply, "X-Frame-Options", "DENY");
    let reply = warp::reply::with_header(reply, "X-Content-Type-Options", "nosniff");
    let reply = warp::reply::with_header(reply, "Referrer-Policy", "no-referrer");
    let reply = warp::reply::with_header(reply, "Content-Security-Policy", STRICT_CSP);
    // Responses may carry bearer tokens or account data
    let reply = warp::reply::with_header(reply, "Cache-Control", "no-cache, no-store, must-revalidate");
    warp::reply::with_header(reply, "Permissions-Policy", PERMISSIONS_POLICY)
}

/// Header to add when serving over TLS
pub const HSTS_HEADER: (&str, &str) = ("Strict-Transport-Security", "max-age=31536000; includeSubDomains");

#[cfg(test)]
mod tests {
    use super::*;
    use warp::Reply;

    #[test]
    fn test_strict_csp_for_api() {
        assert!(STRICT_CSP.contains("default-src 'none'"));
        assert!(STRICT_CSP.contains("frame-ancestors 'none'"));
        assert!(!STRICT_CSP.contains("unsafe-inline"));
    }

    #[test]
    fn test_headers_applied() {
        let response = with_api_security_headers(warp::reply()).into_response();
        let headers = response.headers();

        assert_eq!(headers["X-Frame-Options"], "DENY");
        assert_eq!(headers["X-Content-Type-Options"], "nosniff");
        assert_eq!(headers["Cache-Control"], "no-cache, no-store, must-revalidate");
    }
}
