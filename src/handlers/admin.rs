use axum::{extract::Path, Extension};
use serde_json::{json, Value};

use crate::auth::context::RequestContext;
use crate::database::registry::{TenantPoolInfo, TenantRegistry};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

fn require_super_admin(ctx: &RequestContext) -> Result<(), ApiError> {
    if ctx.is_super_admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("Super admin access required"))
    }
}

/// GET /api/admin/tenants/pools - live registry entries.
pub async fn list_pools(
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<Vec<TenantPoolInfo>> {
    require_super_admin(&ctx)?;
    Ok(ApiResponse::success(
        TenantRegistry::instance().entries().await,
    ))
}

/// DELETE /api/admin/tenants/:tenant_id/pool - administrative eviction.
/// In-flight requests keep their already-resolved pool; the next request
/// for this tenant re-resolves.
pub async fn invalidate_pool(
    Extension(ctx): Extension<RequestContext>,
    Path(tenant_id): Path<String>,
) -> ApiResult<Value> {
    require_super_admin(&ctx)?;
    let invalidated = TenantRegistry::instance().invalidate(&tenant_id).await;
    Ok(ApiResponse::success(json!({
        "tenant_id": tenant_id,
        "invalidated": invalidated,
    })))
}
