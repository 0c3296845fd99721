//! Process-wide connection pool.
//!
//! The pool is created on first use and shared by every request afterwards.
//! Concurrent first users race on a [`OnceCell`], so exactly one pool is ever
//! built. Connections are opened lazily by the pool itself; a failed connect
//! surfaces as [`StoreError::Query`] for that call only and later calls retry.

use crate::error::StoreError;
use rolodex_core::{ConnectionPoolConfig, SslMode, UpstreamConfig};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Postgres};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;

pub struct PoolManager {
    connect_options: PgConnectOptions,
    pool_config: ConnectionPoolConfig,
    pool: OnceCell<PgPool>,
    created: AtomicUsize,
}

impl PoolManager {
    /// Build a manager from the upstream configuration.
    ///
    /// Fails when no connection string is configured or the URL cannot be
    /// parsed. No connection is attempted here.
    pub fn from_config(upstream: &UpstreamConfig) -> Result<Self, StoreError> {
        let url = upstream.connection_string().ok_or_else(|| {
            StoreError::configuration(
                "no database connection configured (set DATABASE_URL or upstream.database_url)",
            )
        })?;
        Self::from_url(&url, upstream)
    }

    /// Build a manager for an explicit URL, taking pool and SSL settings from
    /// `upstream`.
    pub fn from_url(url: &str, upstream: &UpstreamConfig) -> Result<Self, StoreError> {
        let mut options = PgConnectOptions::from_str(url)
            .map_err(|e| StoreError::configuration(format!("invalid database URL: {}", e)))?;

        if let Some(mode) = upstream.ssl_mode {
            options = options.ssl_mode(pg_ssl_mode(mode));
        }

        let statement_timeout = upstream.pool.statement_timeout_seconds;
        if statement_timeout > 0 {
            options = options.options([("statement_timeout", format!("{}s", statement_timeout))]);
        }

        Ok(Self {
            connect_options: options,
            pool_config: upstream.pool.clone(),
            pool: OnceCell::new(),
            created: AtomicUsize::new(0),
        })
    }

    /// The shared pool, created on first call.
    pub async fn pool(&self) -> &PgPool {
        self.pool
            .get_or_init(|| async {
                let cfg = &self.pool_config;
                let pool = PgPoolOptions::new()
                    .min_connections(cfg.min_connections)
                    .max_connections(cfg.max_connections.max(1))
                    .acquire_timeout(Duration::from_secs(
                        u64::from(cfg.acquire_timeout_seconds).max(1),
                    ))
                    .idle_timeout(Some(Duration::from_secs(u64::from(
                        cfg.idle_timeout_seconds,
                    ))))
                    .connect_lazy_with(self.connect_options.clone());
                self.created.fetch_add(1, Ordering::SeqCst);
                tracing::info!(
                    max_connections = cfg.max_connections,
                    statement_timeout_seconds = cfg.statement_timeout_seconds,
                    "Created upstream connection pool"
                );
                pool
            })
            .await
    }

    /// Borrow one connection for the duration of a call. Dropping the
    /// connection returns it to the pool on every path.
    pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, StoreError> {
        let conn = self.pool().await.acquire().await?;
        Ok(conn)
    }

    /// Whether the pool has been created yet.
    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// How many pools this manager has built. Never more than one.
    pub fn pools_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Close the pool if it was ever created.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!("Closed upstream connection pool");
        }
    }
}

fn pg_ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Allow => PgSslMode::Allow,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}
