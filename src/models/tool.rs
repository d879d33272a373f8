use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::errors::CiphertraceError;

/// The investigative tools available in the workbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    EmailChecker,
    PhishingDetector,
    CallTracer,
    VoiceIdentifier,
    DocumentScanner,
    FakeNewsTracker,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::EmailChecker,
        ToolKind::PhishingDetector,
        ToolKind::CallTracer,
        ToolKind::VoiceIdentifier,
        ToolKind::DocumentScanner,
        ToolKind::FakeNewsTracker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailChecker => "email-checker",
            Self::PhishingDetector => "phishing-detector",
            Self::CallTracer => "call-tracer",
            Self::VoiceIdentifier => "voice-identifier",
            Self::DocumentScanner => "document-scanner",
            Self::FakeNewsTracker => "fake-news-tracker",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::EmailChecker => "Email Checker",
            Self::PhishingDetector => "Phishing Detector",
            Self::CallTracer => "Call Tracer",
            Self::VoiceIdentifier => "Voice Identifier",
            Self::DocumentScanner => "Document Scanner",
            Self::FakeNewsTracker => "Fake News Tracker",
        }
    }

    /// Default number of sessions retained in this tool's history.
    pub fn default_history_cap(&self) -> usize {
        match self {
            Self::EmailChecker | Self::CallTracer | Self::VoiceIdentifier => 10,
            Self::DocumentScanner => 15,
            Self::PhishingDetector | Self::FakeNewsTracker => 20,
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = CiphertraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        ToolKind::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| CiphertraceError::UnknownTool(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tool_kind_accepts_snake_case() {
        assert_eq!("call_tracer".parse::<ToolKind>().unwrap(), ToolKind::CallTracer);
        assert_eq!("Email-Checker".parse::<ToolKind>().unwrap(), ToolKind::EmailChecker);
    }

    #[test]
    fn test_parse_unknown_tool() {
        let err = "port-scanner".parse::<ToolKind>().unwrap_err();
        assert!(matches!(err, CiphertraceError::UnknownTool(_)));
    }

    #[test]
    fn test_serde_matches_display() {
        for kind in ToolKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.to_string());
        }
    }

    #[test]
    fn test_history_caps_within_range() {
        for kind in ToolKind::ALL {
            let cap = kind.default_history_cap();
            assert!((10..=20).contains(&cap));
        }
    }
}
