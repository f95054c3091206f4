use std::fmt;

use crate::auth::claims::{PermissionValue, Scope};
use crate::auth::context::RequestContext;
use crate::config;

/// Actions a permission claim can grant. `View` carries a scope; the rest
/// are plain allow/deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Action::View)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of a permission check. `GrantedScoped` instructs the caller to
/// additionally constrain the result set; it is not a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Granted,
    GrantedScoped(Scope),
    Denied,
}

impl Decision {
    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Denied)
    }
}

/// Build the claim key for a (resource, action) pair, e.g. "hms.patients.view".
pub fn permission_key(resource: &str, action: Action) -> String {
    format!("{}.{}.{}", config::config().security.module, resource, action)
}

/// Evaluate a (resource, action) pair against the context's permission set.
///
/// Permissions are allow-listed: a missing key is a deny, never a default
/// grant. A value of the wrong category for the action (a scope on a
/// mutating key, a boolean on a view key) is also a deny - claim values are
/// tagged per action category, not shape-sniffed.
pub fn authorize(ctx: &RequestContext, resource: &str, action: Action) -> Decision {
    // Super admins bypass scope narrowing entirely; the module-enabled
    // check was already enforced at decode time.
    if ctx.is_super_admin {
        return if action.is_mutating() {
            Decision::Granted
        } else {
            Decision::GrantedScoped(Scope::All)
        };
    }

    let key = permission_key(resource, action);
    let value = match ctx.permissions.get(&key) {
        Some(v) => v,
        None => {
            tracing::debug!("permission '{}' not present for user {}", key, ctx.email);
            return Decision::Denied;
        }
    };

    match (action.is_mutating(), value) {
        (true, PermissionValue::Bool(true)) => Decision::Granted,
        (true, PermissionValue::Bool(false)) => Decision::Denied,
        (false, PermissionValue::Scope(Scope::None)) => Decision::Denied,
        (false, PermissionValue::Scope(scope)) => Decision::GrantedScoped(*scope),
        // Wrong category for the action
        _ => {
            tracing::warn!("permission '{}' has wrong value category", key);
            Decision::Denied
        }
    }
}

/// Ownership-aware check for operations that target one existing record.
///
/// Allows iff the (resource, action) permission passes and the grant is
/// either unscoped/`all` or the record belongs to the requesting user.
/// `team` grants require ownership here as well; team membership resolution
/// is an external collaborator concern.
pub fn authorize_instance(
    ctx: &RequestContext,
    resource: &str,
    action: Action,
    owner_id: &str,
) -> bool {
    match authorize(ctx, resource, action) {
        Decision::Granted => true,
        Decision::GrantedScoped(Scope::All) => true,
        Decision::GrantedScoped(_) => owner_id == ctx.user_id,
        Decision::Denied => false,
    }
}

/// Scope tag a read query for `resource` must be constrained by. Missing
/// view permission yields `Scope::None` (empty result set).
pub fn scoped_query_filter(ctx: &RequestContext, resource: &str) -> Scope {
    match authorize(ctx, resource, Action::View) {
        Decision::GrantedScoped(scope) => scope,
        Decision::Granted => Scope::All,
        Decision::Denied => Scope::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ctx_with(permissions: &[(&str, PermissionValue)]) -> RequestContext {
        RequestContext {
            user_id: "u-1".to_string(),
            email: "doctor@hospital.com".to_string(),
            tenant_id: "t-1".to_string(),
            tenant_slug: "hospital-one".to_string(),
            is_super_admin: false,
            permissions: permissions
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
            enabled_modules: vec!["hms".to_string()],
            database_url: None,
        }
    }

    #[test]
    fn missing_key_is_denied_never_granted() {
        let ctx = ctx_with(&[]);
        assert!(authorize(&ctx, "patients", Action::View).is_denied());
        assert!(authorize(&ctx, "patients", Action::Create).is_denied());
        assert!(authorize(&ctx, "patients", Action::Edit).is_denied());
        assert!(authorize(&ctx, "patients", Action::Delete).is_denied());
        assert_eq!(scoped_query_filter(&ctx, "patients"), Scope::None);
    }

    #[test]
    fn boolean_grant_and_deny() {
        let ctx = ctx_with(&[
            ("hms.patients.create", PermissionValue::Bool(true)),
            ("hms.patients.edit", PermissionValue::Bool(false)),
        ]);
        assert_eq!(authorize(&ctx, "patients", Action::Create), Decision::Granted);
        assert_eq!(authorize(&ctx, "patients", Action::Edit), Decision::Denied);
    }

    #[test]
    fn view_scopes_pass_through_as_tags() {
        let ctx = ctx_with(&[
            ("hms.patients.view", PermissionValue::Scope(Scope::Own)),
            ("hms.appointments.view", PermissionValue::Scope(Scope::Team)),
            ("hms.billing.view", PermissionValue::Scope(Scope::None)),
        ]);
        assert_eq!(
            authorize(&ctx, "patients", Action::View),
            Decision::GrantedScoped(Scope::Own)
        );
        assert_eq!(
            authorize(&ctx, "appointments", Action::View),
            Decision::GrantedScoped(Scope::Team)
        );
        assert_eq!(authorize(&ctx, "billing", Action::View), Decision::Denied);
        assert_eq!(scoped_query_filter(&ctx, "patients"), Scope::Own);
    }

    #[test]
    fn wrong_value_category_is_denied() {
        let ctx = ctx_with(&[
            // Scope value on a mutating key
            ("hms.patients.edit", PermissionValue::Scope(Scope::All)),
            // Boolean value on a view key
            ("hms.patients.view", PermissionValue::Bool(true)),
        ]);
        assert!(authorize(&ctx, "patients", Action::Edit).is_denied());
        assert!(authorize(&ctx, "patients", Action::View).is_denied());
    }

    #[test]
    fn own_scope_denies_foreign_records() {
        let ctx = ctx_with(&[("hms.patients.view", PermissionValue::Scope(Scope::Own))]);
        assert!(authorize_instance(&ctx, "patients", Action::View, "u-1"));
        assert!(!authorize_instance(&ctx, "patients", Action::View, "u-2"));
    }

    #[test]
    fn all_scope_allows_any_owner() {
        let ctx = ctx_with(&[("hms.patients.view", PermissionValue::Scope(Scope::All))]);
        assert!(authorize_instance(&ctx, "patients", Action::View, "someone-else"));
    }

    #[test]
    fn denied_permission_fails_instance_check_regardless_of_owner() {
        let ctx = ctx_with(&[("hms.patients.edit", PermissionValue::Bool(false))]);
        assert!(!authorize_instance(&ctx, "patients", Action::Edit, "u-1"));
    }

    #[test]
    fn super_admin_bypasses_scope_narrowing() {
        let mut ctx = ctx_with(&[]);
        ctx.is_super_admin = true;
        assert_eq!(
            authorize(&ctx, "patients", Action::View),
            Decision::GrantedScoped(Scope::All)
        );
        assert_eq!(authorize(&ctx, "patients", Action::Delete), Decision::Granted);
        assert_eq!(scoped_query_filter(&ctx, "patients"), Scope::All);
    }
}
