//! Shared test infrastructure for Rolodex MCP end-to-end tests.
//!
//! This module provides:
//! - Docker container management for PostgreSQL
//! - The contact table schema and seed data for three tenants
//! - Helpers that drive tool calls through the full JSON-RPC path

use rolodex_core::{ExportConfig, LimitsConfig, McpConfig, TenantId, UpstreamConfig};
use rolodex_export::Exporter;
use rolodex_mcp::credential::{self, CredentialResolver};
use rolodex_mcp::{JsonRpcRequest, JsonRpcResponse, McpServer, ToolExecutor};
use rolodex_store::{PgContactStore, PoolManager};
use serde_json::{Value, json};
use sqlx::PgPool;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// DOCKER CONTAINER CONFIGURATION
// =============================================================================

pub const CONTAINER_NAME: &str = "rolodex_test_postgres";
pub const POSTGRES_PORT: u16 = 5433;
pub const POSTGRES_PASSWORD: &str = "rolodex_test_password";
pub const DATABASE_NAME: &str = "rolodex_test";

/// Tenant with four contacts.
pub const ALICE: &str = "alice-key";
/// Tenant with one contact.
pub const BOB: &str = "bob-key";
/// Tenant with no contacts.
pub const CAROL: &str = "carol-key";

pub fn database_url() -> String {
    format!(
        "postgres://postgres:{}@localhost:{}/{}",
        POSTGRES_PASSWORD, POSTGRES_PORT, DATABASE_NAME
    )
}

// =============================================================================
// DOCKER CONTAINER MANAGEMENT
// =============================================================================

/// Start a PostgreSQL container for testing
pub fn start_postgres_container() -> Result<(), String> {
    let output = Command::new("docker")
        .args(["ps", "-a", "-q", "-f", &format!("name={}", CONTAINER_NAME)])
        .output()
        .map_err(|e| format!("Failed to check existing container: {}", e))?;

    if !String::from_utf8_lossy(&output.stdout).trim().is_empty() {
        stop_postgres_container();
    }

    let status = Command::new("docker")
        .args([
            "run",
            "-d",
            "--name",
            CONTAINER_NAME,
            "-e",
            &format!("POSTGRES_PASSWORD={}", POSTGRES_PASSWORD),
            "-e",
            &format!("POSTGRES_DB={}", DATABASE_NAME),
            "-p",
            &format!("{}:5432", POSTGRES_PORT),
            "postgres:16-alpine",
        ])
        .status()
        .map_err(|e| format!("Failed to start container: {}", e))?;

    if !status.success() {
        return Err("Failed to start PostgreSQL container".to_string());
    }

    Ok(())
}

/// Stop and remove the PostgreSQL container
pub fn stop_postgres_container() {
    let _ = Command::new("docker")
        .args(["rm", "-f", CONTAINER_NAME])
        .output();
}

/// Wait for PostgreSQL to be ready
pub async fn wait_for_postgres() -> Result<PgPool, String> {
    for attempt in 1..=30 {
        match PgPool::connect(&database_url()).await {
            Ok(pool) => {
                if sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok() {
                    println!("✅ PostgreSQL ready after {} attempts", attempt);
                    return Ok(pool);
                }
            }
            Err(_) => {
                if attempt % 5 == 0 {
                    println!("⏳ Waiting for PostgreSQL... (attempt {})", attempt);
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    Err("PostgreSQL did not become ready in time".to_string())
}

// =============================================================================
// DATABASE INITIALIZATION
// =============================================================================

/// Semi-structured columns use a mix of `jsonb`, `text[]` and `text` so every
/// read goes through the `::text` cast.
const SCHEMA_SQL: &str = r#"
DROP TABLE IF EXISTS people;
CREATE TABLE people (
    id SERIAL PRIMARY KEY,
    user_id TEXT NOT NULL,
    full_name TEXT,
    email TEXT,
    linkedin_url TEXT,
    headline TEXT,
    about TEXT,
    current_company TEXT,
    current_company_linkedin_url TEXT,
    current_company_website_url TEXT,
    current_company_detail JSONB,
    experiences JSONB,
    skills TEXT[],
    education JSONB,
    keywords TEXT
);
CREATE INDEX people_user_id_idx ON people (user_id);
"#;

const SEED_SQL: &str = r#"
INSERT INTO people (user_id, full_name, email, headline, about, current_company, experiences, skills, education, keywords) VALUES
('alice-key', 'Ada Lovelace', 'ada@engines.test', 'Mathematician', 'Wrote the first program for the Analytical Engine, a machine that could do far more than arithmetic.', 'Analytical Engines',
 '[{"title": "Analyst", "company": "Analytical Engines"}]', '{math,poetry}', '[{"degree": "Private tutoring", "school": "Home"}]', '["math", "computing"]'),
('alice-key', 'Grace Hopper', 'grace@navy.test', 'Rear Admiral', NULL, '  US Navy  ',
 NULL, '{compilers}', NULL, '["computing", "navy", "null", ""]'),
('alice-key', 'Charles O''Brien', NULL, '100% remote engineer', NULL, 'Analytical Engines',
 NULL, NULL, NULL, 'rust, postgres'),
('alice-key', NULL, 'anonymous@example.test', 'Unnamed contact', NULL, '', NULL, NULL, NULL, NULL),
('bob-key', 'Alan Turing', 'alan@bletchley.test', 'Codebreaker', NULL, 'Bletchley Park',
 NULL, NULL, NULL, '["math"]');
"#;

pub async fn initialize_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    sqlx::raw_sql(SEED_SQL).execute(pool).await?;
    println!("✅ Database initialized with schema and seed data");
    Ok(())
}

// =============================================================================
// TEST CONTEXT
// =============================================================================

pub struct TestContext {
    pub pool: PgPool,
    pub store: Arc<PgContactStore>,
}

impl TestContext {
    pub async fn setup() -> Result<Self, String> {
        start_postgres_container()?;
        let pool = wait_for_postgres().await?;
        initialize_database(&pool)
            .await
            .map_err(|e| format!("Failed to initialize database: {}", e))?;

        let upstream = UpstreamConfig::default();
        let manager = PoolManager::from_url(&database_url(), &upstream)
            .map_err(|e| format!("Failed to configure pool: {}", e))?;
        let store = Arc::new(PgContactStore::new(Arc::new(manager), &upstream));

        Ok(Self { pool, store })
    }

    /// A server over the seeded table, writing artifacts below `export_dir`.
    pub fn server(&self, export_dir: &Path, fallback: Option<&str>) -> McpServer {
        let exporter = Exporter::new(ExportConfig {
            directory: export_dir.to_path_buf(),
            public_base_url: Some("https://rolodex.test".to_string()),
            ..Default::default()
        });
        let executor = ToolExecutor::new(self.store.clone(), exporter, LimitsConfig::default());
        McpServer::new(McpConfig::default(), executor)
            .expect("tool registry builds")
            .with_credentials(CredentialResolver::new(fallback.and_then(TenantId::new)))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        stop_postgres_container();
    }
}

// =============================================================================
// HELPERS
// =============================================================================

pub fn tenant(raw: &str) -> TenantId {
    TenantId::new(raw).expect("non-empty credential")
}

/// Send `tools/call` with `credential` attached to the call.
pub async fn call_raw(
    server: &McpServer,
    credential: Option<&str>,
    tool: &str,
    arguments: Value,
) -> JsonRpcResponse {
    let request = JsonRpcRequest::new(
        1,
        "tools/call",
        Some(json!({"name": tool, "arguments": arguments})),
    );
    credential::scope(credential.map(tenant), server.handle_request(request)).await
}

/// Call a tool and return its decoded JSON payload and error flag.
pub async fn call(
    server: &McpServer,
    credential: Option<&str>,
    tool: &str,
    arguments: Value,
) -> (Value, bool) {
    let response = call_raw(server, credential, tool, arguments).await;
    assert!(
        response.error.is_none(),
        "{} returned a JSON-RPC error: {:?}",
        tool,
        response.error
    );
    let result = response.result.expect("tools/call result");
    let text = result["content"][0]["text"]
        .as_str()
        .expect("text content")
        .to_string();
    let is_error = result["isError"].as_bool().unwrap_or(false);
    (serde_json::from_str(&text).expect("payload is JSON"), is_error)
}

/// Names in a list payload, in returned order.
pub fn names(payload: &Value) -> Vec<Option<String>> {
    payload
        .as_array()
        .expect("list payload")
        .iter()
        .map(|row| row["full_name"].as_str().map(str::to_string))
        .collect()
}
