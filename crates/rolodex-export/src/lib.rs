//! # rolodex-export
//!
//! Exports a tenant's whole contact network as CSV or as a markdown table,
//! either inline or as a file artifact under the export directory.
//!
//! An empty network never produces a file: [`Exporter::export`] returns
//! [`ExportOutcome::Empty`] before anything is written.

pub mod artifact;
pub mod delimited;
pub mod error;
pub mod table;

use rolodex_core::{ContactRecord, ExportConfig, TenantId, normalize};
use rolodex_store::ContactStore;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use error::ExportError;

/// Export columns: header label and record column.
pub const EXPORT_COLUMNS: [(&str, &str); 13] = [
    ("Name", "full_name"),
    ("Email", "email"),
    ("LinkedIn URL", "linkedin_url"),
    ("Headline", "headline"),
    ("About", "about"),
    ("Company", "current_company"),
    ("Company LinkedIn", "current_company_linkedin_url"),
    ("Company Website", "current_company_website_url"),
    ("Company Detail", "current_company_detail"),
    ("Experiences", "experiences"),
    ("Skills", "skills"),
    ("Education", "education"),
    ("Keywords", "keywords"),
];

/// Text of one export cell. Semi-structured columns are normalized to their
/// display or canonical form; plain columns are used as stored.
pub(crate) fn cell_value(record: &ContactRecord, column: &str, display: bool) -> String {
    let raw = record.get(column);
    if ContactRecord::is_semi_structured(column) {
        let normalized = normalize(raw);
        if display {
            normalized.display
        } else {
            normalized.canonical
        }
    } else {
        raw.unwrap_or_default().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "csv")]
    Delimited,
    #[serde(rename = "table")]
    Table,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Delimited => "csv",
            Self::Table => "md",
        }
    }

    pub fn default_file_name(self) -> String {
        format!("network.{}", self.extension())
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Delimited => "text/csv; charset=utf-8",
            Self::Table => "text/markdown; charset=utf-8",
        }
    }

    /// Whether a file name ending in `.ext` holds this format.
    pub fn matches_extension(self, ext: &str) -> bool {
        match self {
            Self::Delimited => ext.eq_ignore_ascii_case("csv"),
            Self::Table => ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("txt"),
        }
    }

    /// Format implied by a file name: `.md` and `.txt` are tables, anything
    /// else is CSV.
    pub fn from_file_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("md") | Some("txt") => Self::Table,
            _ => Self::Delimited,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delimited => write!(f, "csv"),
            Self::Table => write!(f, "table"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Delimited),
            "table" | "md" | "markdown" => Ok(Self::Table),
            other => Err(format!("unknown export format '{}' (expected csv or table)", other)),
        }
    }
}

/// Where the export goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExportTarget {
    #[default]
    Inline,
    /// A file in the tenant's artifact directory; `None` uses the format's
    /// default name.
    File { name: Option<String> },
}

#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub target: ExportTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Empty,
    Inline {
        format: ExportFormat,
        content: String,
        row_count: usize,
    },
    Persisted {
        format: ExportFormat,
        path: PathBuf,
        file_name: String,
        row_count: usize,
        size_bytes: u64,
        download_url: Option<String>,
    },
}

impl ExportOutcome {
    /// JSON payload returned to tool callers.
    pub fn to_payload(&self) -> Value {
        match self {
            Self::Empty => json!({
                "status": "empty",
                "row_count": 0,
                "message": "No contacts found for this account"
            }),
            Self::Inline {
                format,
                content,
                row_count,
            } => json!({
                "status": "success",
                "format": format,
                "row_count": row_count,
                "size_bytes": content.len(),
                "content": content,
            }),
            Self::Persisted {
                format,
                path,
                file_name,
                row_count,
                size_bytes,
                download_url,
            } => {
                let mut payload = json!({
                    "status": "success",
                    "format": format,
                    "path": path.display().to_string(),
                    "file_name": file_name,
                    "row_count": row_count,
                    "size_bytes": size_bytes,
                    "size_kb": size_kb(*size_bytes),
                });
                if let Some(url) = download_url {
                    payload["download_url"] = json!(url);
                }
                payload
            }
        }
    }
}

fn size_kb(bytes: u64) -> f64 {
    (bytes as f64 / 1024.0 * 100.0).round() / 100.0
}

/// A retrieved artifact.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub content: Vec<u8>,
}

/// Renders and persists exports according to [`ExportConfig`].
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Render records in the given format.
    pub fn render(
        &self,
        records: &[ContactRecord],
        format: ExportFormat,
    ) -> Result<String, ExportError> {
        match format {
            ExportFormat::Delimited => delimited::render(records),
            ExportFormat::Table => Ok(table::render(
                records,
                self.config.table_cell_max_chars,
                self.config.about_max_chars,
            )),
        }
    }

    /// Export the tenant's whole network.
    pub async fn export(
        &self,
        store: &dyn ContactStore,
        tenant: &TenantId,
        request: &ExportRequest,
    ) -> Result<ExportOutcome, ExportError> {
        let file_name = match &request.target {
            ExportTarget::Inline => None,
            ExportTarget::File { name: Some(name) } => {
                Some(artifact::sanitize_file_name(name, request.format)?)
            }
            ExportTarget::File { name: None } => Some(request.format.default_file_name()),
        };

        let records = store.list_all(tenant).await?;
        if records.is_empty() {
            tracing::info!(tenant = %tenant, "Nothing to export");
            return Ok(ExportOutcome::Empty);
        }
        let content = self.render(&records, request.format)?;

        let Some(file_name) = file_name else {
            tracing::info!(
                tenant = %tenant,
                format = %request.format,
                rows = records.len(),
                "Rendered inline export"
            );
            return Ok(ExportOutcome::Inline {
                format: request.format,
                content,
                row_count: records.len(),
            });
        };

        let path = self.artifact_path(tenant, &file_name);
        artifact::write_atomic(&path, content.as_bytes()).await?;
        tracing::info!(
            tenant = %tenant,
            format = %request.format,
            rows = records.len(),
            file = %file_name,
            "Wrote export artifact"
        );

        Ok(ExportOutcome::Persisted {
            format: request.format,
            download_url: self.download_url(&file_name),
            path,
            file_name,
            row_count: records.len(),
            size_bytes: content.len() as u64,
        })
    }

    /// Export the tenant's network to an explicit path (CLI use).
    pub async fn export_to_path(
        &self,
        store: &dyn ContactStore,
        tenant: &TenantId,
        format: ExportFormat,
        path: &Path,
    ) -> Result<ExportOutcome, ExportError> {
        let records = store.list_all(tenant).await?;
        if records.is_empty() {
            return Ok(ExportOutcome::Empty);
        }
        let content = self.render(&records, format)?;
        artifact::write_atomic(path, content.as_bytes()).await?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ExportOutcome::Persisted {
            format,
            path: path.to_path_buf(),
            file_name,
            row_count: records.len(),
            size_bytes: content.len() as u64,
            download_url: None,
        })
    }

    /// Fetch a tenant's artifact by name, regenerating it when it does not
    /// exist. Returns `None` when the tenant has no contacts to export.
    pub async fn retrieve(
        &self,
        store: &dyn ContactStore,
        tenant: &TenantId,
        name: &str,
    ) -> Result<Option<Artifact>, ExportError> {
        let format = ExportFormat::from_file_name(name);
        let file_name = artifact::sanitize_file_name(name, format)?;
        let path = self.artifact_path(tenant, &file_name);

        match tokio::fs::read(&path).await {
            Ok(content) => {
                return Ok(Some(Artifact {
                    file_name,
                    format,
                    content,
                }));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        tracing::info!(tenant = %tenant, file = %file_name, "Regenerating missing export artifact");
        let request = ExportRequest {
            format,
            target: ExportTarget::File {
                name: Some(file_name),
            },
        };
        match self.export(store, tenant, &request).await? {
            ExportOutcome::Persisted {
                path, file_name, ..
            } => Ok(Some(Artifact {
                content: tokio::fs::read(&path).await?,
                file_name,
                format,
            })),
            _ => Ok(None),
        }
    }

    fn artifact_path(&self, tenant: &TenantId, file_name: &str) -> PathBuf {
        artifact::tenant_dir(&self.config.directory, &tenant.fingerprint()).join(file_name)
    }

    fn download_url(&self, file_name: &str) -> Option<String> {
        self.config
            .public_base_url
            .as_deref()
            .map(|base| format!("{}/exports/{}", base.trim_end_matches('/'), file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rolodex_store::MemoryContactStore;

    fn tenant(raw: &str) -> TenantId {
        TenantId::new(raw).unwrap()
    }

    fn exporter(dir: &Path) -> Exporter {
        Exporter::new(ExportConfig {
            directory: dir.to_path_buf(),
            public_base_url: Some("https://rolodex.example.com/".to_string()),
            ..Default::default()
        })
    }

    fn store() -> MemoryContactStore {
        MemoryContactStore::new().with_records(
            &tenant("owner-key"),
            [ContactRecord {
                full_name: Some("Ada Lovelace".to_string()),
                skills: Some(r#"["math"]"#.to_string()),
                ..Default::default()
            }],
        )
    }

    #[tokio::test]
    async fn test_empty_export_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter(dir.path());
        let request = ExportRequest {
            format: ExportFormat::Delimited,
            target: ExportTarget::File { name: None },
        };

        let outcome = exporter
            .export(&store(), &tenant("stranger-key"), &request)
            .await
            .unwrap();

        assert_eq!(outcome, ExportOutcome::Empty);
        assert_eq!(outcome.to_payload()["status"], "empty");
        assert_eq!(outcome.to_payload()["row_count"], 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_file_export_is_keyed_by_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter(dir.path());
        let owner = tenant("owner-key");
        let request = ExportRequest {
            format: ExportFormat::Table,
            target: ExportTarget::File { name: None },
        };

        let outcome = exporter.export(&store(), &owner, &request).await.unwrap();
        let payload = outcome.to_payload();

        let expected = dir.path().join(owner.fingerprint()).join("network.md");
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["row_count"], 1);
        assert_eq!(payload["path"], expected.display().to_string());
        assert_eq!(
            payload["download_url"],
            "https://rolodex.example.com/exports/network.md"
        );
        assert!(!payload.to_string().contains("owner-key"));
        assert!(
            std::fs::read_to_string(&expected)
                .unwrap()
                .contains("Ada Lovelace")
        );
    }

    #[tokio::test]
    async fn test_file_name_extension_matches_content() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter(dir.path());
        let owner = tenant("owner-key");
        let request = ExportRequest {
            format: ExportFormat::Table,
            target: ExportTarget::File {
                name: Some("network.csv".to_string()),
            },
        };

        let payload = exporter
            .export(&store(), &owner, &request)
            .await
            .unwrap()
            .to_payload();
        assert_eq!(payload["file_name"], "network.csv.md");

        let artifact = exporter
            .retrieve(&store(), &owner, "network.csv.md")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(artifact.format, ExportFormat::Table);
        assert!(String::from_utf8(artifact.content).unwrap().starts_with("| Name"));
    }

    #[tokio::test]
    async fn test_inline_export() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = exporter(dir.path())
            .export(&store(), &tenant("owner-key"), &ExportRequest::default())
            .await
            .unwrap();
        let payload = outcome.to_payload();
        assert_eq!(payload["format"], "csv");
        assert!(payload["content"].as_str().unwrap().contains("\"[\"\"math\"\"]\""));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_retrieve_regenerates_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter(dir.path());
        let owner = tenant("owner-key");

        let artifact = exporter
            .retrieve(&store(), &owner, "contacts.txt")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(artifact.format, ExportFormat::Table);
        assert!(String::from_utf8(artifact.content).unwrap().starts_with("| Name"));

        let missing = exporter
            .retrieve(&store(), &tenant("stranger-key"), "network.csv")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Delimited);
        assert_eq!("table".parse::<ExportFormat>().unwrap(), ExportFormat::Table);
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::from_file_name("a.MD"), ExportFormat::Table);
        assert_eq!(ExportFormat::from_file_name("a"), ExportFormat::Delimited);
    }
}
