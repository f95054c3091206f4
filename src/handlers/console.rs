use axum::{
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse, Json, Response},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::claims;
use crate::auth::context::RequestContext;
use crate::auth::session::SessionStore;
use crate::auth::superadmin;
use crate::config;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::session::SessionId;

/// Console login body: either SuperAdmin credentials to be forwarded, or an
/// already-issued access token.
#[derive(Debug, Deserialize)]
pub struct ConsoleLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub access_token: Option<String>,
}

/// POST /console/login - start a cookie session for the admin console.
///
/// Credentials are never checked locally: they go to SuperAdmin, whose
/// response token is decoded exactly like an API bearer token. A raw
/// token skips the forwarding step. Either way the token is fully
/// verified here, once, before the session trust window opens.
pub async fn login(Json(req): Json<ConsoleLoginRequest>) -> Result<Response, ApiError> {
    let token = match req.access_token {
        Some(token) => token,
        None => {
            let (email, password) = match (req.email.as_deref(), req.password.as_deref()) {
                (Some(e), Some(p)) => (e, p),
                _ => {
                    return Err(ApiError::bad_request(
                        "Provide access_token, or email and password",
                    ))
                }
            };
            superadmin::login(email, password).await?
        }
    };

    let security = &config::config().security;
    let algorithm = security.algorithm().map_err(ApiError::internal_server_error)?;
    let decoded = claims::decode(&token, &security.jwt_secret, algorithm, &security.module)?;

    let tenant_slug = decoded.tenant_slug.clone();
    let email = decoded.email.clone();
    let session_id = SessionStore::instance().create(decoded).await;
    tracing::info!("console login for {} on tenant {}", email, tenant_slug);

    let session_cfg = &config::config().session;
    let cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        session_cfg.cookie_name, session_id, session_cfg.absolute_timeout_secs
    );

    Ok((
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(json!({
            "success": true,
            "data": {
                "email": email,
                "tenant_slug": tenant_slug,
            }
        })),
    )
        .into_response())
}

/// GET /console/whoami - session-derived identity.
pub async fn whoami(Extension(ctx): Extension<RequestContext>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "user_id": ctx.user_id,
        "email": ctx.email,
        "tenant_id": ctx.tenant_id,
        "tenant_slug": ctx.tenant_slug,
        "is_super_admin": ctx.is_super_admin,
    })))
}

/// POST /console/logout - terminal transition; all session state is
/// removed before the response goes out.
pub async fn logout(Extension(SessionId(session_id)): Extension<SessionId>) -> Response {
    SessionStore::instance().destroy(session_id).await;

    let session_cfg = &config::config().session;
    let clear_cookie = format!(
        "{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0",
        session_cfg.cookie_name
    );

    (
        StatusCode::OK,
        AppendHeaders([(header::SET_COOKIE, clear_cookie)]),
        Json(json!({ "success": true, "data": { "logged_out": true } })),
    )
        .into_response()
}
