//! Upstream database configuration types.
//!
//! This module defines configuration for the shared PostgreSQL connection and
//! the contact table it serves. The connection string can come from:
//! 1. `database_url_env` - an environment variable (default `DATABASE_URL`)
//! 2. `database_url` - the URL written directly in the config file
//! 3. Individual fields (host, port, database, username, password)
//!
//! When none of these yields a value there is no connection string at all,
//! which callers treat as a fatal configuration error at start-up.

use serde::{Deserialize, Serialize};

/// Configuration for the upstream Postgres connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Environment variable name containing the PostgreSQL connection URL.
    /// Highest precedence.
    #[serde(default = "default_database_url_env")]
    pub database_url_env: Option<String>,

    /// Full PostgreSQL connection URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    /// Hostname of the upstream Postgres server. Only used when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Port of the upstream Postgres server.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name to connect to.
    #[serde(default = "default_database")]
    pub database: String,

    /// Username for upstream connection.
    #[serde(default = "default_username")]
    pub username: String,

    /// Password for upstream connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// SSL mode for the connection. When unset, the URL's `sslmode` (or the
    /// driver default, `prefer`) applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_mode: Option<SslMode>,

    /// Table holding the contact records.
    #[serde(default = "default_table")]
    pub table: String,

    /// Column holding the tenant identifier.
    #[serde(default = "default_tenant_column")]
    pub tenant_column: String,

    /// Column holding the internal record id.
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Connection pool configuration.
    #[serde(default)]
    pub pool: ConnectionPoolConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            database_url_env: default_database_url_env(),
            database_url: None,
            host: None,
            port: default_port(),
            database: default_database(),
            username: default_username(),
            password: None,
            password_env: None,
            ssl_mode: None,
            table: default_table(),
            tenant_column: default_tenant_column(),
            id_column: default_id_column(),
            pool: ConnectionPoolConfig::default(),
        }
    }
}

/// SSL mode for database connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    /// Disable SSL.
    Disable,
    /// Allow SSL but don't require it.
    Allow,
    /// Prefer SSL (default).
    #[default]
    Prefer,
    /// Require SSL.
    Require,
    /// Require SSL with CA verification.
    #[serde(rename = "verify-ca")]
    VerifyCa,
    /// Require SSL with full verification.
    #[serde(rename = "verify-full")]
    VerifyFull,
}

/// Connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionPoolConfig {
    /// Minimum number of connections to maintain.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Timeout in seconds when acquiring a connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u32,

    /// How long a connection can remain idle before being closed.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u32,

    /// Server-side `statement_timeout` applied to every pooled session.
    /// Zero disables the timeout.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_seconds: u32,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            statement_timeout_seconds: default_statement_timeout(),
        }
    }
}

fn default_min_connections() -> u32 {
    0
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u32 {
    30
}

fn default_idle_timeout() -> u32 {
    600
}

fn default_statement_timeout() -> u32 {
    30
}

impl UpstreamConfig {
    /// Resolve the PostgreSQL connection string, if one is configured.
    ///
    /// Precedence:
    /// 1. database_url_env (environment variable)
    /// 2. database_url (direct URL)
    /// 3. Individual fields, only when `host` is set
    pub fn connection_string(&self) -> Option<String> {
        if let Some(env_var) = &self.database_url_env
            && let Ok(url) = std::env::var(env_var)
            && !url.trim().is_empty()
        {
            return Some(url);
        }

        if let Some(url) = &self.database_url
            && !url.trim().is_empty()
        {
            return Some(url.clone());
        }

        let host = self.host.as_deref()?;
        Some(match self.get_password() {
            Some(password) => format!(
                "postgresql://{}:{}@{}:{}/{}",
                self.username, password, host, self.port, self.database
            ),
            None => format!(
                "postgresql://{}@{}:{}/{}",
                self.username, host, self.port, self.database
            ),
        })
    }

    /// Get the password, checking password_env first.
    fn get_password(&self) -> Option<String> {
        if let Some(env_var) = &self.password_env
            && let Ok(password) = std::env::var(env_var)
        {
            return Some(password);
        }
        self.password.clone()
    }
}

fn default_database_url_env() -> Option<String> {
    Some("DATABASE_URL".to_string())
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "postgres".to_string()
}

fn default_username() -> String {
    "postgres".to_string()
}

fn default_table() -> String {
    "people".to_string()
}

fn default_tenant_column() -> String {
    "user_id".to_string()
}

fn default_id_column() -> String {
    "id".to_string()
}
