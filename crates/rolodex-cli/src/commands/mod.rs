//! CLI command implementations for the Rolodex MCP server.

pub mod check;
pub mod export;
pub mod serve;
pub mod tools;

use anyhow::{Context, Result};
use clap::Args;
use rolodex_core::RolodexConfig;
use rolodex_store::{PgContactStore, PoolManager};
use std::path::PathBuf;
use std::sync::Arc;

/// Options shared by every command.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Configuration file. Missing means defaults.
    #[arg(short, long, global = true, env = "ROLODEX_CONFIG", default_value = "rolodex.yaml")]
    pub config: PathBuf,

    /// PostgreSQL connection URL. Overrides the config file.
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,
}

impl ConfigArgs {
    /// Load the config file (or defaults) and apply overrides.
    pub fn load(&self) -> Result<RolodexConfig> {
        let mut config = RolodexConfig::load_or_default(&self.config)
            .with_context(|| format!("Failed to load configuration from {:?}", self.config))?;
        if let Some(url) = &self.database_url {
            config.upstream.database_url = Some(url.clone());
            config.upstream.database_url_env = None;
        }
        Ok(config)
    }
}

/// Build the Postgres-backed store. The pool itself connects on first use.
pub fn open_store(config: &RolodexConfig) -> Result<Arc<PgContactStore>> {
    let pool = PoolManager::from_config(&config.upstream)
        .context("No database connection configured (set DATABASE_URL or upstream.database_url)")?;
    Ok(Arc::new(PgContactStore::new(Arc::new(pool), &config.upstream)))
}
