use serde::{Deserialize, Serialize};

/// Where a tool's view is in its `input -> scanning -> results` flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    #[default]
    Input,
    Scanning,
    Results,
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Scanning => write!(f, "scanning"),
            Self::Results => write!(f, "results"),
        }
    }
}
