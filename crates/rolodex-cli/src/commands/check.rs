//! `rolodex check` command implementation.
//!
//! Verifies, in order:
//! - the configuration file loads and validates
//! - a database connection string is configured and the database answers
//! - a fallback credential is set and owns at least one contact
//!
//! The credential is only ever printed as its fingerprint.

use super::ConfigArgs;
use anyhow::Result;
use rolodex_core::{RolodexConfig, TenantId};
use rolodex_mcp::CredentialResolver;
use rolodex_store::{PgContactStore, PoolManager};
use std::sync::Arc;

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    pub category: &'static str,
    pub message: String,
}

impl CheckFinding {
    fn error(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            message: message.into(),
        }
    }

    fn warning(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            message: message.into(),
        }
    }

    fn info(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            category,
            message: message.into(),
        }
    }
}

/// Results from running all checks.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub findings: Vec<CheckFinding>,
}

impl CheckResults {
    fn add(&mut self, finding: CheckFinding) {
        self.findings.push(finding);
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    /// Print human-readable summary.
    pub fn print_summary(&self) {
        for finding in &self.findings {
            let icon = match finding.severity {
                Severity::Error => "✗",
                Severity::Warning => "⚠",
                Severity::Info => "✓",
            };
            println!("  {} [{}] {}", icon, finding.category, finding.message);
        }

        println!();
        println!("{}", "═".repeat(60));
        let errors = self.count(Severity::Error);
        let warnings = self.count(Severity::Warning);
        if errors == 0 && warnings == 0 {
            println!("✅ All checks passed!");
        } else {
            println!("Summary: {} error(s), {} warning(s)", errors, warnings);
        }
    }
}

/// Run every check without printing.
pub async fn run_quiet(config_args: &ConfigArgs) -> CheckResults {
    let mut results = CheckResults::default();

    let config = match config_args.load() {
        Ok(config) => {
            results.add(CheckFinding::info(
                "config",
                format!(
                    "Loaded {} (table {}, tenant column {})",
                    config_args.config.display(),
                    config.upstream.table,
                    config.upstream.tenant_column
                ),
            ));
            config
        }
        Err(e) => {
            results.add(CheckFinding::error("config", format!("{:#}", e)));
            return results;
        }
    };

    let credentials = CredentialResolver::from_config(&config.credential);
    match credentials.fallback() {
        Some(tenant) => results.add(CheckFinding::info(
            "credential",
            format!("Fallback credential {}", tenant),
        )),
        None => results.add(CheckFinding::warning(
            "credential",
            format!(
                "{} is not set; stdio calls and `rolodex export` need it",
                config.credential.fallback_env
            ),
        )),
    }

    let pool = match PoolManager::from_config(&config.upstream) {
        Ok(pool) => Arc::new(pool),
        Err(e) => {
            results.add(CheckFinding::error("database", e.to_string()));
            return results;
        }
    };
    check_database(&config, pool.clone(), credentials.fallback(), &mut results).await;
    pool.close().await;

    results
}

async fn check_database(
    config: &RolodexConfig,
    pool: Arc<PoolManager>,
    fallback: Option<&TenantId>,
    results: &mut CheckResults,
) {
    if let Err(e) = pool.acquire().await {
        results.add(CheckFinding::error(
            "database",
            format!("Cannot connect: {}", e),
        ));
        return;
    }
    results.add(CheckFinding::info("database", "Connected"));

    let Some(tenant) = fallback else {
        return;
    };
    let store = PgContactStore::new(pool, &config.upstream);
    match store.count(tenant).await {
        Ok(0) => results.add(CheckFinding::warning(
            "database",
            format!("No contacts in {} for {}", config.upstream.table, tenant),
        )),
        Ok(n) => results.add(CheckFinding::info(
            "database",
            format!("{} contacts in {} for {}", n, config.upstream.table, tenant),
        )),
        Err(e) => results.add(CheckFinding::error(
            "database",
            format!("Query on {} failed: {}", config.upstream.table, e),
        )),
    }
}

/// Run all checks and print the report.
pub async fn run(config_args: &ConfigArgs) -> Result<()> {
    println!("🔍 Checking Rolodex configuration...");
    println!();

    let results = run_quiet(config_args).await;
    results.print_summary();

    if results.has_errors() {
        anyhow::bail!(
            "Check failed with {} error(s)",
            results.count(Severity::Error)
        );
    }
    Ok(())
}
