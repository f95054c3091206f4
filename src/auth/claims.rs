use std::collections::HashMap;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access breadth attached to view-type permissions, used to constrain
/// result sets beyond plain allow/deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    All,
    Team,
    Own,
    None,
}

/// A single permission claim value. Mutating actions (create/edit/delete)
/// carry a boolean; the view action carries a scope. The variant is fixed
/// by the claim schema, never inferred from use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionValue {
    Bool(bool),
    Scope(Scope),
}

/// Decoded, verified token payload issued by SuperAdmin.
///
/// Immutable once constructed; rebuilt fresh for every request. There is no
/// local user table - this is the only source of identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub tenant_id: String,
    pub tenant_slug: String,
    #[serde(default)]
    pub is_super_admin: bool,
    /// Keyed by "<module>.<resource>.<action>".
    #[serde(default)]
    pub permissions: HashMap<String, PermissionValue>,
    pub enabled_modules: Vec<String>,
    /// Optional per-tenant storage locator supplied by SuperAdmin.
    #[serde(default)]
    pub database_url: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("token signature verification failed")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("module '{0}' not enabled for this tenant")]
    ModuleNotEnabled(String),
}

/// Verify and decode a bearer token into [`Claims`].
///
/// Pure function of (token, secret, algorithm, required_module): no side
/// effects, no global state. The module-enabled check happens here so that
/// an un-enabled module can never reach request context construction.
pub fn decode(
    token: &str,
    secret: &str,
    algorithm: Algorithm,
    required_module: &str,
) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        // An unconfigured secret can never verify anything
        return Err(TokenError::BadSignature);
    }

    let mut validation = Validation::new(algorithm);
    // SuperAdmin and this service run on different hosts; allow clock skew
    validation.leeway = 60;

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data =
        jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            use jsonwebtoken::errors::ErrorKind;
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                // An algorithm mismatch is indistinguishable from tampering
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                _ => TokenError::Malformed,
            }
        })?;

    let claims = token_data.claims;
    if !claims.enabled_modules.iter().any(|m| m == required_module) {
        return Err(TokenError::ModuleNotEnabled(required_module.to_string()));
    }

    Ok(claims)
}

/// Sign claims into a token. Counterpart of [`decode`], used by
/// provisioning tooling and tests.
pub fn encode(
    claims: &Claims,
    secret: &str,
    algorithm: Algorithm,
) -> Result<String, jsonwebtoken::errors::Error> {
    let header = Header::new(algorithm);
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    jsonwebtoken::encode(&header, claims, &encoding_key)
}
