use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::infrastructure::config::Config;

/// Header the feed producer sends the shared secret in
pub const TOKEN_HEADER: &str = "token";

/// Reject requests that do not present the configured bearer secret.
///
/// The secret is accepted either as `Authorization: Bearer <secret>` or in a
/// bare `token` header.
pub async fn auth_middleware(
    State(config): State<Arc<Config>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = presented_token(request.headers())
        .ok_or_else(|| AppError::Unauthorized("token header missing".to_string()))?;

    if !constant_time_eq(token.as_bytes(), config.bearer_secret.as_bytes()) {
        return Err(AppError::Unauthorized("Invalid bearer token".to_string()));
    }

    Ok(next.run(request).await)
}

fn presented_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(auth_header) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token);
        }
    }

    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|t| !t.is_empty())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
