//! Per-call credential resolution.
//!
//! The HTTP transport attaches the credential taken from each request's own
//! headers to the task handling that request with [`scope`]. Tool handlers
//! call [`CredentialResolver::resolve`], which prefers that call-scoped value
//! and otherwise uses the fallback loaded once at start-up.
//!
//! The call-scoped slot is a task-local, so concurrent requests served by the
//! same worker threads never see each other's credential, and the previous
//! value is restored when the scoped future finishes, errors or panics.

use crate::error::McpError;
use axum::http::HeaderMap;
use rolodex_core::{CredentialConfig, TenantId};
use std::future::Future;

tokio::task_local! {
    static CALL_CREDENTIAL: Option<TenantId>;
}

/// Run `fut` with `credential` attached to the current call.
pub async fn scope<F>(credential: Option<TenantId>, fut: F) -> F::Output
where
    F: Future,
{
    CALL_CREDENTIAL.scope(credential, fut).await
}

/// The credential attached to the current call, if any.
pub fn current() -> Option<TenantId> {
    CALL_CREDENTIAL.try_with(|c| c.clone()).ok().flatten()
}

/// Extract a credential from request headers.
///
/// `names` are checked in order and the first non-empty value wins. A
/// case-insensitive `Bearer ` prefix is stripped.
pub fn from_headers(headers: &HeaderMap, names: &[String]) -> Option<TenantId> {
    names.iter().find_map(|name| {
        let value = headers.get(name.as_str())?.to_str().ok()?;
        TenantId::new(strip_bearer(value))
    })
}

fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    match value.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => value[7..].trim(),
        _ => value,
    }
}

/// Resolves the tenant for a tool call.
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    fallback: Option<TenantId>,
}

impl CredentialResolver {
    pub fn new(fallback: Option<TenantId>) -> Self {
        Self { fallback }
    }

    /// Load the fallback from the environment variable named in `config`.
    pub fn from_config(config: &CredentialConfig) -> Self {
        Self::new(config.fallback_from_env().and_then(TenantId::new))
    }

    pub fn fallback(&self) -> Option<&TenantId> {
        self.fallback.as_ref()
    }

    /// Call-scoped credential first, then the fallback.
    pub fn resolve(&self) -> Result<TenantId, McpError> {
        current()
            .or_else(|| self.fallback.clone())
            .ok_or(McpError::MissingCredential)
    }
}
