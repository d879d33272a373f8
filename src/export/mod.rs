pub mod csv;
pub mod report;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::errors::CiphertraceError;
use crate::models::{AnalysisRecord, ScanSession, ToolKind};
use tracing::info;

pub use self::csv::records_to_csv;
pub use report::format_text_report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Text => "text/plain; charset=utf-8",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "text",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = CiphertraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" | "report" => Ok(Self::Text),
            other => Err(CiphertraceError::InvalidInput(format!(
                "Unknown export format '{}'; expected json, csv or text", other
            ))),
        }
    }
}

/// An export ready to be downloaded or written to disk.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub format: ExportFormat,
    pub body: String,
}

impl ExportArtifact {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Pretty-printed JSON of the whole session.
pub fn session_to_json<R: AnalysisRecord>(session: &ScanSession<R>) -> Result<String, CiphertraceError> {
    Ok(serde_json::to_string_pretty(session)?)
}

/// `<tool>-<first 8 of session id>-<UTC timestamp>.<ext>`
pub fn artifact_filename(
    tool: ToolKind,
    session_id: &str,
    format: ExportFormat,
    at: DateTime<Utc>,
) -> String {
    let short_id: String = session_id.chars().filter(|c| c.is_ascii_alphanumeric()).take(8).collect();
    format!("{}-{}-{}.{}", tool, short_id, at.format("%Y%m%dT%H%M%SZ"), format.extension())
}

/// Write the artifact into `dir`: write to a temp file, then rename.
pub async fn write_artifact(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf, CiphertraceError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&artifact.filename);
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, &artifact.body).await?;
    tokio::fs::rename(&tmp, &path).await?;
    info!(path = %path.display(), bytes = artifact.body.len(), "Export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_formats() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_artifact_filename() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let name = artifact_filename(
            ToolKind::PhishingDetector,
            "0f1e2d3c-4b5a-6978-8796-a5b4c3d2e1f0",
            ExportFormat::Csv,
            at,
        );
        assert_eq!(name, "phishing-detector-0f1e2d3c-20240309T140500Z.csv");
    }

    #[tokio::test]
    async fn test_write_artifact_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("exports");
        let artifact = ExportArtifact {
            filename: "call-tracer-abc.json".into(),
            format: ExportFormat::Json,
            body: "{}".into(),
        };
        let path = write_artifact(&out, &artifact).await.unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "{}");
        assert!(!out.join("call-tracer-abc.tmp").exists());
    }
}
