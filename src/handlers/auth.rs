use axum::Extension;
use serde_json::{json, Value};

use crate::auth::context::RequestContext;
use crate::middleware::response::{ApiResponse, ApiResult};

/// GET /api/auth/whoami - identity, tenant, and permissions of the caller
/// as carried by the validated token.
pub async fn whoami(Extension(ctx): Extension<RequestContext>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "user_id": ctx.user_id,
        "email": ctx.email,
        "tenant_id": ctx.tenant_id,
        "tenant_slug": ctx.tenant_slug,
        "is_super_admin": ctx.is_super_admin,
        "permissions": ctx.permissions,
        "enabled_modules": ctx.enabled_modules,
    })))
}
