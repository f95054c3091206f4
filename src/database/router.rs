use sqlx::PgPool;

use crate::auth::context::RequestContext;
use crate::database::registry::{ConnectionError, TenantRegistry};

/// Entity kinds holding clinical/operational data. Always routed to the
/// requesting tenant's database.
pub const TENANT_ENTITIES: &[&str] = &[
    "patients",
    "doctors",
    "appointments",
    "hospital",
    "opd",
    "pharmacy",
    "payments",
    "orders",
    "services",
];

/// Entity kinds holding identity/audit/migration metadata. Always routed
/// to the shared database, regardless of tenant.
pub const SHARED_ENTITIES: &[&str] = &["accounts", "audit_log", "migrations", "sessions"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    TenantScoped,
    Shared,
}

/// Static classification of an entity kind. `None` means the kind is
/// unmapped, which is a configuration error caught at startup.
pub fn classify(entity_kind: &str) -> Option<StorageClass> {
    if TENANT_ENTITIES.contains(&entity_kind) {
        Some(StorageClass::TenantScoped)
    } else if SHARED_ENTITIES.contains(&entity_kind) {
        Some(StorageClass::Shared)
    } else {
        None
    }
}

/// Startup check that the routing table is total and unambiguous: every
/// kind maps to exactly one class. Run before serving; an error here is
/// fatal, never a per-request failure.
pub fn verify_routing_table() -> Result<(), String> {
    for kind in TENANT_ENTITIES {
        if SHARED_ENTITIES.contains(kind) {
            return Err(format!("entity kind '{}' is classified as both tenant-scoped and shared", kind));
        }
    }
    for kind in TENANT_ENTITIES.iter().chain(SHARED_ENTITIES) {
        if classify(kind).is_none() {
            return Err(format!("entity kind '{}' has no storage classification", kind));
        }
    }
    Ok(())
}

/// Bind the storage connection all queries for `entity_kind` must run on
/// within this request. Tenant-scoped kinds go through the registry using
/// the context's tenant identity; shared kinds always use the default pool.
pub async fn connection_for(
    entity_kind: &str,
    ctx: &RequestContext,
) -> Result<PgPool, ConnectionError> {
    match classify(entity_kind) {
        Some(StorageClass::TenantScoped) => {
            let pool = TenantRegistry::instance()
                .resolve(&ctx.tenant_id, ctx.database_url.as_deref())
                .await?;
            tracing::debug!("routing '{}' to tenant database for {}", entity_kind, ctx.tenant_id);
            Ok(pool)
        }
        Some(StorageClass::Shared) => TenantRegistry::instance().shared().await,
        // Unreachable after verify_routing_table(), kept as a hard stop
        None => Err(ConnectionError::UnmappedEntity(entity_kind.to_string())),
    }
}

/// Pings the shared pool to ensure connectivity
pub async fn health_check() -> Result<(), ConnectionError> {
    let pool = TenantRegistry::instance().shared().await?;
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(|e| ConnectionError::Unreachable(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routing_table_is_total() {
        assert!(verify_routing_table().is_ok());
    }

    #[test]
    fn clinical_entities_are_tenant_scoped() {
        for kind in ["patients", "appointments", "pharmacy", "opd"] {
            assert_eq!(classify(kind), Some(StorageClass::TenantScoped), "{}", kind);
        }
    }

    #[test]
    fn metadata_entities_are_shared() {
        for kind in ["accounts", "audit_log", "migrations"] {
            assert_eq!(classify(kind), Some(StorageClass::Shared), "{}", kind);
        }
    }

    #[test]
    fn unknown_entity_is_unmapped() {
        assert_eq!(classify("spaceships"), None);
    }
}
