//! `rolodex serve` - run the MCP server.

use super::{ConfigArgs, open_store};
use anyhow::{Context, Result};
use clap::Args;
use rolodex_core::{CredentialConfig, McpConfig, TenantId, Transport};
use rolodex_export::Exporter;
use rolodex_mcp::{CredentialResolver, McpServer, ToolExecutor};

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Transport (stdio or http). Overrides the config file.
    #[arg(long)]
    pub transport: Option<Transport>,

    /// HTTP bind host. Overrides the config file.
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP port. When set without --transport, selects HTTP.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,
}

impl ServeArgs {
    fn apply(&self, mcp: &mut McpConfig) {
        if let Some(port) = self.port {
            mcp.port = port;
            if self.transport.is_none() {
                mcp.transport = Transport::Http;
            }
        }
        if let Some(transport) = self.transport {
            mcp.transport = transport;
        }
        if let Some(host) = &self.host {
            mcp.host = host.clone();
        }
    }
}

/// The fallback credential honoured by the selected transport.
fn fallback_for_transport(
    mcp: &McpConfig,
    credential: &CredentialConfig,
    fallback: Option<TenantId>,
) -> Option<TenantId> {
    if mcp.is_http() && !credential.http_fallback {
        if let Some(tenant) = &fallback {
            tracing::info!(tenant = %tenant, "Fallback credential disabled for HTTP");
        }
        return None;
    }
    fallback
}

pub async fn run(config_args: &ConfigArgs, args: ServeArgs) -> Result<()> {
    let mut config = config_args.load()?;
    args.apply(&mut config.mcp);

    let store = open_store(&config)?;
    let loaded = CredentialResolver::from_config(&config.credential);
    let credentials = CredentialResolver::new(fallback_for_transport(
        &config.mcp,
        &config.credential,
        loaded.fallback().cloned(),
    ));
    match credentials.fallback() {
        Some(tenant) if config.mcp.is_http() => tracing::warn!(
            tenant = %tenant,
            "Fallback credential applies to HTTP requests without a credential header"
        ),
        Some(tenant) => tracing::info!(tenant = %tenant, "Fallback credential loaded"),
        None if config.mcp.is_http() => {
            tracing::info!("No fallback credential; every request must carry one")
        }
        None => tracing::warn!(
            env = %config.credential.fallback_env,
            "No fallback credential; stdio calls will fail"
        ),
    }

    let executor = ToolExecutor::new(
        store.clone(),
        Exporter::new(config.export.clone()),
        config.limits.clone(),
    );
    let server = McpServer::new(config.mcp.clone(), executor)
        .context("Failed to build tool registry")?
        .with_credentials(credentials)
        .with_header_names(config.credential.headers.clone());

    tracing::info!(
        project = config.project.as_deref().unwrap_or("rolodex"),
        transport = ?config.mcp.transport,
        table = %config.upstream.table,
        "Starting MCP server"
    );

    let result = server.run().await;
    store.pool().close().await;
    result.context("MCP server failed")
}
