//! ConnectionContext — the per-session handle pair for auth and storage.
//!
//! Constructed once at application start and shared (via `Arc`) by every
//! consumer for the lifetime of the process. Construction fails fast on
//! missing credentials; after that the context is immutable.

use std::env;
use std::sync::Arc;

use crate::{
    error::ConfigError,
    remote::{AuthGateway, DocumentStore},
};

// ============================================================================
// ConnectionConfig
// ============================================================================

/// Credentials and endpoints for the backing services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub project_id: String,
    pub api_key: String,
    pub auth_domain: Option<String>,
}

impl ConnectionConfig {
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: api_key.into(),
            auth_domain: None,
        }
    }

    /// Read the config from `CLASSHUB_PROJECT_ID`, `CLASSHUB_API_KEY`, and
    /// optionally `CLASSHUB_AUTH_DOMAIN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let project_id =
            env::var("CLASSHUB_PROJECT_ID").map_err(|_| ConfigError::Missing("project_id"))?;
        let api_key = env::var("CLASSHUB_API_KEY").map_err(|_| ConfigError::Missing("api_key"))?;
        let auth_domain = env::var("CLASSHUB_AUTH_DOMAIN").ok();

        let config = Self {
            project_id,
            api_key,
            auth_domain,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::Empty("project_id"));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::Empty("api_key"));
        }
        Ok(())
    }
}

// ============================================================================
// ConnectionContext
// ============================================================================

/// Long-lived, immutable handles to the auth service and document store.
///
/// `auth` is optional — a store-only deployment (public read dashboards)
/// carries no auth gateway, and the session tracker reports
/// `AuthUnavailable` for it.
pub struct ConnectionContext {
    config: ConnectionConfig,
    auth: Option<Arc<dyn AuthGateway>>,
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("config", &self.config)
            .field("auth", &self.auth.as_ref().map(|_| "dyn AuthGateway"))
            .field("store", &"dyn DocumentStore")
            .finish()
    }
}

impl ConnectionContext {
    /// Validate `config` and bind the service handles.
    pub fn connect(
        config: ConnectionConfig,
        auth: Option<Arc<dyn AuthGateway>>,
        store: Arc<dyn DocumentStore>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            auth,
            store,
        })
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn auth(&self) -> Option<&Arc<dyn AuthGateway>> {
        self.auth.as_ref()
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}
