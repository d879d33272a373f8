use std::sync::Mutex;
use std::time::Instant;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use crate::errors::CiphertraceError;
use crate::export::{artifact_filename, records_to_csv, session_to_json, ExportArtifact, ExportFormat};
use crate::input::ScanInput;
use crate::models::{ScanSession, SessionOverview};
use crate::session::SessionStore;
use crate::tools::Tool;
use crate::view::{ResultFilter, Selection};
use super::events::ScanEvent;
use super::simulator::PhaseSimulator;
use super::state::ScanStatus;
use tracing::{debug, info, warn};

struct ActiveScan {
    run_id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct RunnerState {
    status: ScanStatus,
    active: Option<ActiveScan>,
    next_run_id: u64,
}

/// Drives one tool through `input -> scanning -> results`.
///
/// At most one scan is in flight per handle. Starting a scan cancels the
/// previous one, and `reset` cancels whatever is running before clearing the
/// current session, so a stale scan can never write its results.
pub struct ToolHandle<T: Tool> {
    tool: T,
    store: SessionStore,
    simulator: PhaseSimulator,
    history_cap: usize,
    seed: Option<u64>,
    state: Mutex<RunnerState>,
}

impl<T: Tool> ToolHandle<T> {
    pub fn new(tool: T, store: SessionStore, simulator: PhaseSimulator, history_cap: usize) -> Self {
        Self {
            tool,
            store,
            simulator,
            history_cap: history_cap.max(1),
            seed: None,
            state: Mutex::new(RunnerState::default()),
        }
    }

    /// Fix the synthesizer seed so repeated runs produce identical records.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn history_cap(&self) -> usize {
        self.history_cap
    }

    pub fn status(&self) -> ScanStatus {
        self.lock_state().map(|s| s.status).unwrap_or_default()
    }

    /// Run a full scan and persist the resulting session.
    ///
    /// Input is validated before anything else happens; a rejected input
    /// leaves status and stored sessions untouched.
    pub async fn run(
        &self,
        input: &ScanInput,
        events: Option<&UnboundedSender<ScanEvent>>,
    ) -> Result<ScanSession<T::Record>, CiphertraceError> {
        let kind = self.tool.kind();
        let items = self.tool.collect(input)?;
        let phases = self.tool.phases();
        let (run_id, token) = self.begin()?;
        // Dropping this future mid-scan must not leave the handle stuck in Scanning.
        let mut guard = RunGuard { state: &self.state, run_id, armed: true };

        info!(tool = %kind, items = items.len(), phases = phases.len(), "Scan started");
        emit(events, ScanEvent::ScanStarted { tool: kind, items: items.len(), phases: phases.len() });
        let started = Instant::now();

        if let Err(e) = self.simulator.run(kind, phases, &token, events).await {
            self.abort(run_id, events);
            return Err(e);
        }

        let records = {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            items
                .iter()
                .enumerate()
                .map(|(i, item)| self.tool.synthesize(i, item, &mut rng))
                .collect::<Vec<_>>()
        };

        let session = ScanSession::new(kind, input.source(), records, started.elapsed().as_millis() as u64);

        // Hold the state lock across the write so a concurrent reset either
        // happens before (and we bail) or after (and clears what we wrote).
        {
            let mut state = self.lock_state()?;
            if token.is_cancelled() || !is_current(&state, run_id) {
                drop(state);
                self.abort(run_id, events);
                return Err(CiphertraceError::Cancelled(format!("{} scan was superseded", kind.display_name())));
            }
            let evicted = match self.store.record(&session, self.history_cap) {
                Ok(evicted) => evicted,
                Err(e) => {
                    guard.disarm();
                    state.active = None;
                    state.status = ScanStatus::Input;
                    return Err(e);
                }
            };
            guard.disarm();
            if !evicted.is_empty() {
                debug!(tool = %kind, evicted = ?evicted, "History trimmed");
            }
            state.status = ScanStatus::Results;
            state.active = None;
        }

        info!(
            tool = %kind,
            session_id = %session.id,
            records = session.records.len(),
            duration_ms = session.duration_ms,
            "Scan completed"
        );
        emit(events, ScanEvent::ScanCompleted {
            tool: kind,
            session_id: session.id.clone(),
            records: session.records.len(),
        });
        Ok(session)
    }

    /// Cancel any in-flight scan and clear the current session. History is kept.
    pub fn reset(&self) -> Result<bool, CiphertraceError> {
        let mut state = self.lock_state()?;
        if let Some(active) = state.active.take() {
            active.token.cancel();
            debug!(tool = %self.tool.kind(), run_id = active.run_id, "In-flight scan cancelled by reset");
        }
        state.status = ScanStatus::Input;
        self.store.clear_current(self.tool.kind())
    }

    pub fn current(&self) -> Result<Option<ScanSession<T::Record>>, CiphertraceError> {
        self.store.load_current(self.tool.kind())
    }

    pub fn history(&self) -> Result<Vec<ScanSession<T::Record>>, CiphertraceError> {
        let history = self.store.load_history(self.tool.kind(), self.history_cap)?;
        Ok(history.entries().to_vec())
    }

    pub fn overviews(&self) -> Result<Vec<SessionOverview>, CiphertraceError> {
        Ok(self.store.load_history::<T::Record>(self.tool.kind(), self.history_cap)?.overviews())
    }

    pub fn find(&self, id: &str) -> Result<ScanSession<T::Record>, CiphertraceError> {
        self.store
            .find(self.tool.kind(), id, self.history_cap)?
            .ok_or_else(|| CiphertraceError::NotFound(format!("No {} session with id {}", self.tool.kind(), id)))
    }

    /// Export a session (the current one when `session_id` is `None`) with
    /// `filter` applied to its records.
    pub fn export(
        &self,
        session_id: Option<&str>,
        format: ExportFormat,
        filter: &ResultFilter,
        selection: &Selection,
    ) -> Result<ExportArtifact, CiphertraceError> {
        let kind = self.tool.kind();
        let session = match session_id {
            Some(id) => self.find(id)?,
            None => self.current()?.ok_or_else(|| {
                CiphertraceError::NotFound(format!("{} has no current session to export", kind.display_name()))
            })?,
        };

        let session = if filter.is_empty() && selection.is_empty() {
            session
        } else {
            let visible: Vec<_> = filter.apply(&session.records).into_iter().cloned().collect();
            session.with_records(selection.retain(&visible))
        };

        let body = match format {
            ExportFormat::Json => session_to_json(&session)?,
            ExportFormat::Csv => records_to_csv(&session.records)?,
            ExportFormat::Text => self.tool.text_report(&session).ok_or_else(|| {
                CiphertraceError::InvalidInput(format!("{} does not produce text reports", kind.display_name()))
            })?,
        };

        info!(tool = %kind, session_id = %session.id, format = %format, records = session.records.len(), "Export prepared");
        Ok(ExportArtifact {
            filename: artifact_filename(kind, &session.id, format, chrono::Utc::now()),
            format,
            body,
        })
    }

    fn begin(&self) -> Result<(u64, CancellationToken), CiphertraceError> {
        let mut state = self.lock_state()?;
        if let Some(previous) = state.active.take() {
            previous.token.cancel();
            warn!(tool = %self.tool.kind(), run_id = previous.run_id, "Previous scan superseded");
        }
        state.next_run_id += 1;
        let run_id = state.next_run_id;
        let token = CancellationToken::new();
        state.active = Some(ActiveScan { run_id, token: token.clone() });
        state.status = ScanStatus::Scanning;
        Ok((run_id, token))
    }

    /// Roll back after a cancelled run. Only touches state still owned by `run_id`.
    fn abort(&self, run_id: u64, events: Option<&UnboundedSender<ScanEvent>>) {
        release(&self.state, run_id);
        info!(tool = %self.tool.kind(), run_id, "Scan cancelled");
        emit(events, ScanEvent::ScanCancelled { tool: self.tool.kind() });
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, RunnerState>, CiphertraceError> {
        self.state
            .lock()
            .map_err(|e| CiphertraceError::Internal(format!("runner state lock poisoned: {}", e)))
    }
}

/// Releases a run's claim on the handle when the `run` future is dropped
/// before it reaches a terminal state.
struct RunGuard<'a> {
    state: &'a Mutex<RunnerState>,
    run_id: u64,
    armed: bool,
}

impl RunGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            release(self.state, self.run_id);
        }
    }
}

fn release(state: &Mutex<RunnerState>, run_id: u64) {
    if let Ok(mut state) = state.lock() {
        if is_current(&state, run_id) {
            if let Some(active) = state.active.take() {
                active.token.cancel();
            }
            state.status = ScanStatus::Input;
        }
    }
}

fn is_current(state: &RunnerState, run_id: u64) -> bool {
    state.active.as_ref().is_some_and(|a| a.run_id == run_id)
}

fn emit(events: Option<&UnboundedSender<ScanEvent>>, event: ScanEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}
