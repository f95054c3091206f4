use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::claims;
use crate::auth::context::RequestContext;
use crate::config;
use crate::error::ApiError;

/// Bearer-token authentication middleware for the API surface.
///
/// Decodes and verifies the token, then attaches a [`RequestContext`] to
/// the request's extensions. A failed decode terminates the request here;
/// no later stage ever runs with unverified claims, and there is no
/// fallback to anonymous access.
pub async fn auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let security = &config::config().security;
    let algorithm = security
        .algorithm()
        .map_err(|e| ApiError::internal_server_error(e))?;

    let decoded = claims::decode(&token, &security.jwt_secret, algorithm, &security.module);
    let claims = match decoded {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("token rejected: {}", e);
            return Err(e.into());
        }
    };

    tracing::debug!("token validated for {} on tenant {}", claims.email, claims.tenant_id);

    let ctx = RequestContext::from(claims);
    request.extensions_mut().insert(ctx);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_and_malformed_headers() {
        let headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcg=="));
        assert!(extract_bearer_token(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_err());
    }
}
