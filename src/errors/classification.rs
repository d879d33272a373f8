use serde::Serialize;
use super::types::CiphertraceError;

/// Visual weight of a notice, mirroring the toast variants shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// User-facing rendering of an error: a title, a description and a variant.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub title: &'static str,
    pub description: String,
    pub variant: NoticeVariant,
}

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    /// True when the user can fix the problem by changing their input.
    pub user_fixable: bool,
}

impl CiphertraceError {
    /// Classify this error to determine its type and whether the user caused it.
    pub fn classify(&self) -> ErrorClassification {
        let (error_type, user_fixable) = match self {
            CiphertraceError::InvalidInput(_) => ("InvalidInputError", true),
            CiphertraceError::EmptyInput(_) => ("EmptyInputError", true),
            CiphertraceError::UnsupportedFile(_) => ("UnsupportedFileError", true),
            CiphertraceError::UnknownTool(_) => ("UnknownToolError", true),
            CiphertraceError::NotFound(_) => ("NotFoundError", true),
            CiphertraceError::Authentication(_) => ("AuthenticationError", true),
            CiphertraceError::Permission(_) => ("PermissionError", false),
            CiphertraceError::Config(_) => ("ConfigError", true),
            CiphertraceError::Cancelled(_) => ("CancelledError", false),
            CiphertraceError::Storage(_) => ("StorageError", false),
            CiphertraceError::Database(_) => ("DatabaseError", false),
            CiphertraceError::Io(_) => ("IoError", false),
            CiphertraceError::Json(_) => ("JsonError", false),
            CiphertraceError::Yaml(_) => ("YamlError", true),
            CiphertraceError::Csv(_) => ("CsvError", false),
            CiphertraceError::Internal(_) => ("InternalError", false),
        };
        ErrorClassification { error_type, user_fixable }
    }

    /// Render this error as a toast-shaped notice.
    pub fn notice(&self) -> Notice {
        let title = match self {
            CiphertraceError::InvalidInput(_) => "Invalid input",
            CiphertraceError::EmptyInput(_) => "Nothing to analyze",
            CiphertraceError::UnsupportedFile(_) => "Invalid file type",
            CiphertraceError::UnknownTool(_) => "Unknown tool",
            CiphertraceError::NotFound(_) => "Not found",
            CiphertraceError::Cancelled(_) => "Scan cancelled",
            CiphertraceError::Authentication(_) => "Authentication failed",
            CiphertraceError::Permission(_) => "Access denied",
            CiphertraceError::Config(_) | CiphertraceError::Yaml(_) => "Configuration problem",
            _ => "Analysis failed",
        };
        // Cancellation is an expected outcome, not a failure.
        let variant = match self {
            CiphertraceError::Cancelled(_) => NoticeVariant::Default,
            _ => NoticeVariant::Destructive,
        };
        Notice {
            title,
            description: self.to_string(),
            variant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_file_is_user_fixable() {
        let err = CiphertraceError::UnsupportedFile("payload.exe".into());
        let class = err.classify();
        assert!(class.user_fixable);
        assert_eq!(class.error_type, "UnsupportedFileError");
    }

    #[test]
    fn test_storage_error_not_user_fixable() {
        let err = CiphertraceError::Storage("corrupt value".into());
        assert!(!err.classify().user_fixable);
    }

    #[test]
    fn test_notice_for_invalid_file_type() {
        let notice = CiphertraceError::UnsupportedFile("notes.exe".into()).notice();
        assert_eq!(notice.title, "Invalid file type");
        assert_eq!(notice.variant, NoticeVariant::Destructive);
        assert!(notice.description.contains("notes.exe"));
    }

    #[test]
    fn test_cancelled_notice_is_not_destructive() {
        let notice = CiphertraceError::Cancelled("reset".into()).notice();
        assert_eq!(notice.variant, NoticeVariant::Default);
    }

    #[test]
    fn test_notice_serializes_lowercase_variant() {
        let notice = CiphertraceError::EmptyInput("paste some text".into()).notice();
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["variant"], "destructive");
        assert_eq!(json["title"], "Nothing to analyze");
    }
}
