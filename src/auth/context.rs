use std::collections::HashMap;

use crate::auth::claims::{Claims, PermissionValue};

/// Authenticated request context derived 1:1 from verified [`Claims`].
///
/// Created at the start of request processing and carried in the request's
/// extension map, so it is reachable by every downstream layer of that one
/// request and dropped with it. Never stored globally, never shared across
/// requests.
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub user_id: String,
    pub email: String,
    pub tenant_id: String,
    pub tenant_slug: String,
    pub is_super_admin: bool,
    pub permissions: HashMap<String, PermissionValue>,
    pub enabled_modules: Vec<String>,
    pub database_url: Option<String>,
}

impl From<Claims> for RequestContext {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            tenant_id: claims.tenant_id,
            tenant_slug: claims.tenant_slug,
            is_super_admin: claims.is_super_admin,
            permissions: claims.permissions,
            enabled_modules: claims.enabled_modules,
            database_url: claims.database_url,
        }
    }
}
