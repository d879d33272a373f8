pub mod extract;
pub mod files;

use serde::{Deserialize, Serialize};
use crate::errors::CiphertraceError;
use crate::models::InputSource;

pub use files::{FilePolicy, UploadedFile};

/// Raw input handed to a tool: pasted text or a batch of uploaded files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScanInput {
    Text { text: String },
    Files { files: Vec<UploadedFile> },
}

impl ScanInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn files(files: Vec<UploadedFile>) -> Self {
        Self::Files { files }
    }

    pub fn source(&self) -> InputSource {
        match self {
            Self::Text { text } => InputSource::Text { chars: text.chars().count() },
            Self::Files { files } => InputSource::Files {
                names: files.iter().map(|f| f.name.clone()).collect(),
            },
        }
    }

    /// Return the pasted text, rejecting file input and blank text.
    pub fn require_text(&self) -> Result<&str, CiphertraceError> {
        match self {
            Self::Text { text } if text.trim().is_empty() => Err(CiphertraceError::EmptyInput(
                "Paste some text to analyze".into(),
            )),
            Self::Text { text } => Ok(text),
            Self::Files { .. } => Err(CiphertraceError::InvalidInput(
                "This tool analyzes pasted text, not files".into(),
            )),
        }
    }

    /// Return the uploaded files, rejecting text input and empty batches.
    pub fn require_files(&self) -> Result<&[UploadedFile], CiphertraceError> {
        match self {
            Self::Files { files } if files.is_empty() => Err(CiphertraceError::EmptyInput(
                "Select at least one file to analyze".into(),
            )),
            Self::Files { files } => Ok(files),
            Self::Text { .. } => Err(CiphertraceError::InvalidInput(
                "This tool analyzes uploaded files, not text".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_rejected() {
        let err = ScanInput::text("   \n\t").require_text().unwrap_err();
        assert!(matches!(err, CiphertraceError::EmptyInput(_)));
    }

    #[test]
    fn test_files_rejected_as_text() {
        let input = ScanInput::files(vec![UploadedFile::new("a.pdf", 10)]);
        assert!(matches!(input.require_text(), Err(CiphertraceError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_file_batch_rejected() {
        let err = ScanInput::files(vec![]).require_files().unwrap_err();
        assert!(matches!(err, CiphertraceError::EmptyInput(_)));
    }

    #[test]
    fn test_source_counts_chars_not_bytes() {
        let source = ScanInput::text("héllo").source();
        assert_eq!(source, InputSource::Text { chars: 5 });
    }

    #[test]
    fn test_input_deserializes_from_tagged_json() {
        let input: ScanInput = serde_json::from_str(
            r#"{"kind": "files", "files": [{"name": "memo.docx", "size_bytes": 2048}]}"#,
        ).unwrap();
        let files = input.require_files().unwrap();
        assert_eq!(files[0].name, "memo.docx");
        assert_eq!(files[0].media_type, None);
    }
}
