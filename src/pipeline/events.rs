use serde::Serialize;
use crate::models::ToolKind;

/// Messages sent from a running scan to whoever is displaying it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    /// Input was accepted and the phases are about to run
    ScanStarted {
        tool: ToolKind,
        items: usize,
        phases: usize,
    },
    /// A new phase has begun
    PhaseStarted {
        tool: ToolKind,
        index: usize,
        name: String,
    },
    /// Overall progress, 0-100
    Progress {
        tool: ToolKind,
        percent: u8,
    },
    /// A phase completed
    PhaseCompleted {
        tool: ToolKind,
        index: usize,
        name: String,
    },
    /// Results were synthesized and stored
    ScanCompleted {
        tool: ToolKind,
        session_id: String,
        records: usize,
    },
    /// The scan was cancelled before results were stored
    ScanCancelled {
        tool: ToolKind,
    },
}
