//! The investigative tools.
//!
//! Each tool knows how to turn raw input into items, which phases its scan
//! walks through and how to synthesize one record per item. Everything else
//! (simulation, persistence, filtering, export) is shared and lives in
//! [`crate::pipeline`], [`crate::session`], [`crate::view`] and
//! [`crate::export`].

pub mod call_tracer;
pub mod document;
pub mod email;
pub mod fake_news;
pub mod phishing;
pub mod registry;
pub mod service;
pub mod voice;

use rand::Rng;
use crate::errors::CiphertraceError;
use crate::input::{FilePolicy, ScanInput};
use crate::models::{AnalysisRecord, ScanSession, ToolKind};
use crate::pipeline::phase::PhaseDefinition;

pub use call_tracer::CallTracer;
pub use document::DocumentScanner;
pub use email::EmailChecker;
pub use fake_news::FakeNewsTracker;
pub use phishing::PhishingDetector;
pub use registry::ToolRegistry;
pub use service::{RecordRow, ScanOutcome, ToolDescriptor, ToolService};
pub use voice::VoiceIdentifier;

/// The seam between the shared scan machinery and one tool's analysis.
///
/// Results are simulated. A real analyser would implement this trait and
/// replace `synthesize` with actual detection.
pub trait Tool: Send + Sync + 'static {
    /// One unit of input: an email block, a URL, a phone number, a file.
    type Item: Send + Sync;
    type Record: AnalysisRecord;

    fn kind(&self) -> ToolKind;

    fn phases(&self) -> &'static [PhaseDefinition];

    /// Upload rules for file-based tools. `None` means the tool takes text.
    fn file_policy(&self) -> Option<FilePolicy> {
        None
    }

    /// Validate the input and split it into items. Must fail without side
    /// effects when the input is unusable or yields nothing.
    fn collect(&self, input: &ScanInput) -> Result<Vec<Self::Item>, CiphertraceError>;

    fn synthesize<G: Rng + ?Sized>(&self, index: usize, item: &Self::Item, rng: &mut G) -> Self::Record;

    /// Human-readable report for the text export, for tools that have one.
    fn text_report(&self, _session: &ScanSession<Self::Record>) -> Option<String> {
        None
    }
}

/// Shared `collect` for file-based tools.
pub(crate) fn collect_files<T: Tool>(
    tool: &T,
    input: &ScanInput,
) -> Result<Vec<crate::input::UploadedFile>, CiphertraceError> {
    let files = input.require_files()?;
    if let Some(policy) = tool.file_policy() {
        policy.validate(files)?;
    }
    Ok(files.to_vec())
}

/// Lowercased text contains any of the given markers.
pub(crate) fn contains_any(haystack: &str, markers: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}
