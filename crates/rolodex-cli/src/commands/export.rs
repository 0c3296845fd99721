//! `rolodex export` - write the fallback tenant's network to a local file.
//!
//! Exit codes: 0 on success, 2 when the network is empty (no file written).

use super::{ConfigArgs, open_store};
use anyhow::{Context, Result};
use clap::Args;
use rolodex_export::{ExportFormat, ExportOutcome, Exporter};
use rolodex_mcp::CredentialResolver;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code for an empty network.
pub const EXIT_EMPTY: u8 = 2;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file. Defaults to `network.csv` or `network.md`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// csv or table. Inferred from the output extension when omitted.
    #[arg(long)]
    pub format: Option<ExportFormat>,
}

impl ExportArgs {
    fn resolve(&self) -> (ExportFormat, PathBuf) {
        let format = self.format.unwrap_or_else(|| {
            self.output
                .as_deref()
                .and_then(|p| p.to_str())
                .map(ExportFormat::from_file_name)
                .unwrap_or_default()
        });
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format.default_file_name()));
        (format, output)
    }
}

pub async fn run(config_args: &ConfigArgs, args: ExportArgs) -> Result<ExitCode> {
    let config = config_args.load()?;
    let tenant = CredentialResolver::from_config(&config.credential)
        .resolve()
        .with_context(|| {
            format!(
                "No credential: set {} to the account to export",
                config.credential.fallback_env
            )
        })?;
    let store = open_store(&config)?;
    let exporter = Exporter::new(config.export.clone());
    let (format, output) = args.resolve();

    let outcome = exporter
        .export_to_path(store.as_ref(), &tenant, format, &output)
        .await
        .with_context(|| format!("Export to {:?} failed", output));
    store.pool().close().await;

    match outcome? {
        ExportOutcome::Persisted {
            path,
            row_count,
            size_bytes,
            ..
        } => {
            println!("✅ Exported {} contacts", row_count);
            println!("   File: {}", path.display());
            println!("   Format: {}", format);
            println!("   Size: {:.2} KB", size_bytes as f64 / 1024.0);
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            eprintln!("⚠️  No contacts found for this account; nothing written");
            Ok(ExitCode::from(EXIT_EMPTY))
        }
    }
}
