use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::{errors::ServiceError, AppState};

/// Header carrying the static API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Gates mutating requests behind the configured API key. Reads stay open so
/// dashboards can poll without credentials; when no key is configured the
/// whole surface is open.
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    authorize(request.method(), presented, state.config.api_key.as_deref())?;

    Ok(next.run(request).await)
}

fn authorize(
    method: &Method,
    presented: Option<&str>,
    expected: Option<&str>,
) -> Result<(), ServiceError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    if !requires_key(method) {
        return Ok(());
    }

    match presented {
        None => Err(ServiceError::AuthError("API key required".to_string())),
        Some(presented) if keys_match(presented, expected) => Ok(()),
        Some(_) => Err(ServiceError::AuthError("Invalid API key".to_string())),
    }
}

fn requires_key(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Comparison covers the full key length regardless of where it diverges.
fn keys_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_configured_key_leaves_everything_open() {
        assert!(authorize(&Method::POST, None, None).is_ok());
        assert!(authorize(&Method::DELETE, Some("anything"), None).is_ok());
    }

    #[test]
    fn reads_bypass_the_key_check() {
        assert!(authorize(&Method::GET, None, Some("secret-key-0123")).is_ok());
        assert!(authorize(&Method::HEAD, None, Some("secret-key-0123")).is_ok());
    }

    #[test]
    fn mutations_require_the_exact_key() {
        let expected = Some("secret-key-0123");

        assert!(authorize(&Method::POST, Some("secret-key-0123"), expected).is_ok());
        assert!(authorize(&Method::POST, None, expected).is_err());
        assert!(authorize(&Method::PUT, Some("wrong-key"), expected).is_err());
        assert!(authorize(&Method::DELETE, Some("secret-key-012"), expected).is_err());
    }

    #[test]
    fn key_comparison_is_exact() {
        assert!(keys_match("abc123", "abc123"));
        assert!(!keys_match("abc123", "abc124"));
        assert!(!keys_match("abc12", "abc123"));
        assert!(!keys_match("", "abc123"));
    }
}
