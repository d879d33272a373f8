use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::errors::CiphertraceError;
use tracing::debug;

/// Metadata of a file handed to a tool. Contents are never read; the
/// analysis is synthesized from the name and size alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub media_type: Option<String>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self { name: name.into(), size_bytes, media_type: None }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Build from a file on disk, reading only its metadata.
    pub async fn from_path(path: &Path) -> Result<Self, CiphertraceError> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(CiphertraceError::InvalidInput(format!(
                "Not a regular file: {}", path.display()
            )));
        }
        let name = path.file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CiphertraceError::InvalidInput(format!(
                "File name is not valid UTF-8: {}", path.display()
            )))?
            .to_string();
        Ok(Self::new(name, metadata.len()))
    }

    /// Lower-cased extension without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

/// Which uploads a tool accepts.
#[derive(Debug, Clone, Copy)]
pub struct FilePolicy {
    pub extensions: &'static [&'static str],
    /// Accepted media type prefix (e.g. `audio/`), checked only when the
    /// upload declares a media type.
    pub media_prefix: Option<&'static str>,
    pub max_size_bytes: u64,
}

impl FilePolicy {
    /// Validate the whole batch. A single bad file rejects the batch.
    pub fn validate(&self, files: &[UploadedFile]) -> Result<(), CiphertraceError> {
        for file in files {
            self.validate_one(file)?;
        }
        debug!(count = files.len(), "Upload batch accepted");
        Ok(())
    }

    fn validate_one(&self, file: &UploadedFile) -> Result<(), CiphertraceError> {
        let ext = file.extension().ok_or_else(|| CiphertraceError::UnsupportedFile(format!(
            "{} has no extension; accepted: {}", file.name, self.accepted()
        )))?;

        if !self.extensions.contains(&ext.as_str()) {
            return Err(CiphertraceError::UnsupportedFile(format!(
                "{} (.{}) is not accepted; accepted: {}", file.name, ext, self.accepted()
            )));
        }

        if let (Some(prefix), Some(media_type)) = (self.media_prefix, &file.media_type) {
            if !media_type.to_lowercase().starts_with(prefix) {
                return Err(CiphertraceError::UnsupportedFile(format!(
                    "{} has media type {}, expected {}*", file.name, media_type, prefix
                )));
            }
        }

        if file.size_bytes == 0 {
            return Err(CiphertraceError::InvalidInput(format!("{} is empty", file.name)));
        }
        if file.size_bytes > self.max_size_bytes {
            return Err(CiphertraceError::InvalidInput(format!(
                "{} exceeds the {} MB upload limit", file.name, self.max_size_bytes / 1_048_576
            )));
        }
        Ok(())
    }

    fn accepted(&self) -> String {
        self.extensions.iter().map(|e| format!(".{}", e)).collect::<Vec<_>>().join(", ")
    }
}
