use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::config;

/// Shape of a successful SuperAdmin login response. Only the access token
/// matters here; everything else about the user comes from its claims.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    tokens: LoginTokens,
}

#[derive(Debug, Deserialize)]
struct LoginTokens {
    access: String,
    #[allow(dead_code)]
    refresh: Option<String>,
}

#[derive(Debug, Error)]
pub enum SuperAdminError {
    #[error("SuperAdmin unreachable: {0}")]
    Unreachable(String),

    #[error("SuperAdmin rejected credentials (status {0})")]
    Rejected(u16),

    #[error("unexpected SuperAdmin response shape")]
    MalformedResponse,
}

/// Forward console credentials to the SuperAdmin identity authority and
/// return the access token it issues. No local password store exists; this
/// is the only credential path.
pub async fn login(email: &str, password: &str) -> Result<String, SuperAdminError> {
    let cfg = &config::config().superadmin;
    let login_url = format!("{}/api/auth/login/", cfg.base_url.trim_end_matches('/'));

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .build()
        .map_err(|e| SuperAdminError::Unreachable(e.to_string()))?;

    let response = client
        .post(&login_url)
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .map_err(|e| {
            tracing::error!("error connecting to SuperAdmin: {}", e);
            SuperAdminError::Unreachable(e.to_string())
        })?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("SuperAdmin login rejected for {}: {}", email, status);
        return Err(SuperAdminError::Rejected(status.as_u16()));
    }

    let body: LoginResponse = response
        .json()
        .await
        .map_err(|_| SuperAdminError::MalformedResponse)?;

    Ok(body.tokens.access)
}
