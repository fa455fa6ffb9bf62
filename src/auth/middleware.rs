use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::server::AppState;

/// Extractor that resolves the request's credential to a tenant id before
/// any handler logic runs. The wrapped id is the only tenant identity
/// handlers may use; ids arriving in bodies or paths are never trusted.
pub struct RequireTenant(pub Uuid);

#[derive(Debug)]
pub enum AuthError {
    MissingAuth,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Malformed and expired tokens are deliberately indistinguishable
        // to the caller.
        let message = match self {
            AuthError::MissingAuth => "Authentication required",
            AuthError::InvalidToken => "Invalid or expired token",
        };

        let body = json!({ "data": null, "error": message });

        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        response.headers_mut().insert(
            "WWW-Authenticate",
            "Bearer realm=\"replaydeck\"".parse().unwrap(),
        );

        response
    }
}

impl FromRequestParts<Arc<AppState>> for RequireTenant {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Query parameter first: media elements issuing range requests
        // cannot set headers, so streams authenticate with `?token=`.
        let raw_token = token_from_query(parts.uri.query())
            .or_else(|| token_from_header(parts))
            .map(str::to_string);

        match raw_token {
            Some(token) => state
                .auth
                .validate(&token)
                .map(RequireTenant)
                .map_err(|_| AuthError::InvalidToken),
            // Single-user deployments may opt into a default tenant; a
            // supplied-but-bad credential is still rejected above.
            None => state
                .default_tenant
                .map(RequireTenant)
                .ok_or(AuthError::MissingAuth),
        }
    }
}

fn token_from_query(query: Option<&str>) -> Option<&str> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|t| !t.is_empty())
}

fn token_from_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_query() {
        assert_eq!(token_from_query(Some("token=abc")), Some("abc"));
        assert_eq!(token_from_query(Some("download=1&token=abc")), Some("abc"));
        assert_eq!(token_from_query(Some("download=1")), None);
        assert_eq!(token_from_query(Some("token=")), None);
        assert_eq!(token_from_query(None), None);
    }
}
