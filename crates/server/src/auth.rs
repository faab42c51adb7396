//! Bearer-token authentication

use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

/// Enforce `Authorization: Bearer <token>` against the configured token
/// list; failures are rejected with 403 before routing
pub async fn require_bearer(tokens: Arc<Vec<String>>, req: Request, next: Next) -> Response {
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match presented {
        Some(token) if token_allowed(&tokens, token) => next.run(req).await,
        _ => StatusCode::FORBIDDEN.into_response(),
    }
}

/// Whether `presented` matches any configured token.
///
/// Every token is compared in constant time and the scan never exits
/// early, so response timing leaks neither match position nor prefix
/// length.
fn token_allowed(tokens: &[String], presented: &str) -> bool {
    let mut pass = false;
    for token in tokens {
        if bool::from(token.as_bytes().ct_eq(presented.as_bytes())) {
            pass = true;
        }
    }
    pass
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_allowed() {
        let tokens = vec!["1234".to_string(), "2345".to_string()];
        assert!(token_allowed(&tokens, "1234"));
        assert!(token_allowed(&tokens, "2345"));
        assert!(!token_allowed(&tokens, "3456"));
        assert!(!token_allowed(&tokens, "123"));
        assert!(!token_allowed(&tokens, ""));
    }

    #[test]
    fn test_empty_token_list_rejects_everything() {
        assert!(!token_allowed(&[], "1234"));
    }
}
