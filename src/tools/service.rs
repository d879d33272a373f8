use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;
use crate::errors::CiphertraceError;
use crate::export::{ExportArtifact, ExportFormat};
use crate::input::ScanInput;
use crate::models::{AnalysisRecord, ScanSession, SessionOverview, ToolKind};
use crate::pipeline::{PhaseDefinition, ScanEvent, ScanStatus, ToolHandle};
use crate::view::{ResultFilter, Selection};
use super::Tool;

/// Static description of a tool, as listed by the catalogue endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub kind: ToolKind,
    pub name: &'static str,
    /// `"text"` or `"files"`.
    pub input: &'static str,
    pub accepted_extensions: Vec<&'static str>,
    pub phases: &'static [PhaseDefinition],
    pub risk_levels: &'static [&'static str],
    pub history_cap: usize,
}

/// One record reduced to what every tool has in common.
#[derive(Debug, Clone, Serialize)]
pub struct RecordRow {
    pub id: String,
    pub risk: &'static str,
    /// Position of `risk` in the tool's bucket list, lowest first.
    pub rank: usize,
    pub ranks: usize,
    pub score: u8,
    pub subject: String,
}

/// A session in tool-independent form.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub overview: SessionOverview,
    pub session: Value,
    #[serde(skip)]
    pub rows: Vec<RecordRow>,
}

impl ScanOutcome {
    fn from_session<R: AnalysisRecord>(session: &ScanSession<R>) -> Result<Self, CiphertraceError> {
        let rows = session
            .records
            .iter()
            .map(|r| RecordRow {
                id: r.id().to_string(),
                risk: r.risk_label(),
                rank: R::BUCKETS.iter().position(|b| *b == r.risk_label()).unwrap_or(0),
                ranks: R::BUCKETS.len(),
                score: r.risk_score(),
                subject: r.search_fields().first().map(|s| s.to_string()).unwrap_or_default(),
            })
            .collect();
        Ok(Self {
            overview: session.overview(),
            session: serde_json::to_value(session)?,
            rows,
        })
    }
}

/// Object-safe face of a [`ToolHandle`], so tools with different record
/// types can sit in one registry and behind one set of routes.
#[async_trait]
pub trait ToolService: Send + Sync {
    fn kind(&self) -> ToolKind;

    fn descriptor(&self) -> ToolDescriptor;

    fn status(&self) -> ScanStatus;

    async fn run(
        &self,
        input: &ScanInput,
        events: Option<&UnboundedSender<ScanEvent>>,
    ) -> Result<ScanOutcome, CiphertraceError>;

    fn current(&self) -> Result<Option<Value>, CiphertraceError>;

    fn history(&self) -> Result<Vec<SessionOverview>, CiphertraceError>;

    fn session(&self, id: &str) -> Result<Value, CiphertraceError>;

    /// A stored session, or the current one when `id` is `None`, together
    /// with its record rows.
    fn inspect(&self, id: Option<&str>) -> Result<ScanOutcome, CiphertraceError>;

    fn export(
        &self,
        session_id: Option<&str>,
        format: ExportFormat,
        filter: &ResultFilter,
        selection: &Selection,
    ) -> Result<ExportArtifact, CiphertraceError>;

    fn reset(&self) -> Result<bool, CiphertraceError>;
}

#[async_trait]
impl<T: Tool> ToolService for ToolHandle<T> {
    fn kind(&self) -> ToolKind {
        self.tool().kind()
    }

    fn descriptor(&self) -> ToolDescriptor {
        let tool = self.tool();
        let policy = tool.file_policy();
        ToolDescriptor {
            kind: tool.kind(),
            name: tool.kind().display_name(),
            input: if policy.is_some() { "files" } else { "text" },
            accepted_extensions: policy.map(|p| p.extensions.to_vec()).unwrap_or_default(),
            phases: tool.phases(),
            risk_levels: <T::Record as AnalysisRecord>::BUCKETS,
            history_cap: self.history_cap(),
        }
    }

    fn status(&self) -> ScanStatus {
        ToolHandle::status(self)
    }

    async fn run(
        &self,
        input: &ScanInput,
        events: Option<&UnboundedSender<ScanEvent>>,
    ) -> Result<ScanOutcome, CiphertraceError> {
        let session = ToolHandle::run(self, input, events).await?;
        ScanOutcome::from_session(&session)
    }

    fn current(&self) -> Result<Option<Value>, CiphertraceError> {
        match ToolHandle::current(self)? {
            Some(session) => Ok(Some(serde_json::to_value(&session)?)),
            None => Ok(None),
        }
    }

    fn history(&self) -> Result<Vec<SessionOverview>, CiphertraceError> {
        self.overviews()
    }

    fn session(&self, id: &str) -> Result<Value, CiphertraceError> {
        Ok(serde_json::to_value(self.find(id)?)?)
    }

    fn inspect(&self, id: Option<&str>) -> Result<ScanOutcome, CiphertraceError> {
        let session = match id {
            Some(id) => self.find(id)?,
            None => ToolHandle::current(self)?.ok_or_else(|| {
                CiphertraceError::NotFound(format!("{} has no current session", self.tool().kind().display_name()))
            })?,
        };
        ScanOutcome::from_session(&session)
    }

    fn export(
        &self,
        session_id: Option<&str>,
        format: ExportFormat,
        filter: &ResultFilter,
        selection: &Selection,
    ) -> Result<ExportArtifact, CiphertraceError> {
        ToolHandle::export(self, session_id, format, filter, selection)
    }

    fn reset(&self) -> Result<bool, CiphertraceError> {
        ToolHandle::reset(self)
    }
}
