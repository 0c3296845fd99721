//! Export artifacts on disk.
//!
//! Artifacts live under `<export.directory>/<tenant fingerprint>/`. File names
//! supplied by callers are reduced to a single plain path component.

use crate::ExportFormat;
use crate::error::ExportError;
use std::path::{Path, PathBuf};

/// Reduce a caller-supplied name to a safe file name.
///
/// The result always ends in an extension of `format`; any other extension
/// is kept as part of the stem (`contacts.json` becomes `contacts.json.csv`).
pub fn sanitize_file_name(name: &str, format: ExportFormat) -> Result<String, ExportError> {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '.') {
        return Err(ExportError::InvalidFileName(name.to_string()));
    }

    let has_format_extension = Path::new(cleaned)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| format.matches_extension(ext));
    if has_format_extension {
        Ok(cleaned.to_string())
    } else {
        Ok(format!("{}.{}", cleaned, format.extension()))
    }
}

/// Write `content` to `path`, replacing any existing file.
///
/// The content goes to a sibling temporary file first, so a failed write
/// never leaves a partial artifact under the final name.
pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExportError::InvalidFileName(path.display().to_string()))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    if let Err(e) = tokio::fs::write(&tmp, content).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// Directory holding one tenant's artifacts.
pub fn tenant_dir(root: &Path, fingerprint: &str) -> PathBuf {
    root.join(fingerprint)
}
