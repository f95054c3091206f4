use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Duration;
use uuid::Uuid;

use crate::auth::context::RequestContext;
use crate::auth::session::SessionStore;
use crate::config;
use crate::error::ApiError;

/// Session id for the current console request, injected so logout can
/// destroy exactly this session.
#[derive(Clone, Copy, Debug)]
pub struct SessionId(pub Uuid);

/// Cookie-session middleware for the admin console.
///
/// Reconstructs the request context from session-stored claims without
/// re-verifying the original token; the trust window is bounded by the
/// configured idle and absolute timeouts. Anonymous or expired requests
/// are rejected before any handler runs.
pub async fn session_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cfg = &config::config().session;
    let session_id = session_cookie(&headers, &cfg.cookie_name)
        .ok_or_else(|| ApiError::unauthorized("Login required"))?;

    let claims = SessionStore::instance()
        .resume(
            session_id,
            Duration::seconds(cfg.idle_timeout_secs as i64),
            Duration::seconds(cfg.absolute_timeout_secs as i64),
        )
        .await?;

    let ctx = RequestContext::from(claims);
    request.extensions_mut().insert(ctx);
    request.extensions_mut().insert(SessionId(session_id));

    Ok(next.run(request).await)
}

/// Pull the session id out of the Cookie header
fn session_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<Uuid> {
    let cookies = headers.get("cookie")?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == cookie_name {
            Uuid::parse_str(value.trim()).ok()
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn parses_session_cookie_among_others() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_str(&format!("theme=dark; hms_session={}; lang=en", id)).unwrap(),
        );
        assert_eq!(session_cookie(&headers, "hms_session"), Some(id));
    }

    #[test]
    fn missing_or_invalid_cookie_is_none() {
        let headers = HeaderMap::new();
        assert_eq!(session_cookie(&headers, "hms_session"), None);

        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("hms_session=not-a-uuid"));
        assert_eq!(session_cookie(&headers, "hms_session"), None);
    }
}
