use serde::de::DeserializeOwned;
use crate::db::Database;
use crate::errors::CiphertraceError;
use crate::models::{AnalysisRecord, ScanSession, ToolKind};
use super::history::SessionHistory;
use super::schema;
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "ciphertrace";

/// Persists each tool's current session and bounded history.
///
/// Every mutation is written through immediately. Reads are forgiving: a
/// value that cannot be decoded is logged, dropped and treated as absent, so
/// one corrupted key never takes a tool down.
#[derive(Clone)]
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn current_key(kind: ToolKind) -> String {
        format!("{}.{}.current", KEY_PREFIX, kind)
    }

    pub fn history_key(kind: ToolKind) -> String {
        format!("{}.{}.history", KEY_PREFIX, kind)
    }

    pub fn load_current<R: AnalysisRecord>(
        &self,
        kind: ToolKind,
    ) -> Result<Option<ScanSession<R>>, CiphertraceError> {
        self.read(&Self::current_key(kind))
    }

    pub fn load_history<R: AnalysisRecord>(
        &self,
        kind: ToolKind,
        cap: usize,
    ) -> Result<SessionHistory<R>, CiphertraceError> {
        let entries = self.read(&Self::history_key(kind))?.unwrap_or_default();
        Ok(SessionHistory::from_entries(cap, entries))
    }

    /// Make `session` the tool's current session and prepend it to history.
    /// Returns the ids of sessions evicted from history.
    pub fn record<R: AnalysisRecord>(
        &self,
        session: &ScanSession<R>,
        cap: usize,
    ) -> Result<Vec<String>, CiphertraceError> {
        let mut history = self.load_history::<R>(session.tool, cap)?;
        let evicted: Vec<String> = history.push(session.clone()).into_iter().map(|s| s.id).collect();

        // Both keys in one transaction so history and current never disagree.
        let history_key = Self::history_key(session.tool);
        let current_key = Self::current_key(session.tool);
        let history_value = schema::encode(&history.entries())?;
        let current_value = schema::encode(session)?;
        self.db.set_items(&[
            (history_key.as_str(), history_value.as_str()),
            (current_key.as_str(), current_value.as_str()),
        ])?;

        if !evicted.is_empty() {
            debug!(tool = %session.tool, evicted = evicted.len(), "Evicted oldest sessions from history");
        }
        info!(
            tool = %session.tool,
            session_id = %session.id,
            records = session.records.len(),
            history = history.len(),
            "Session stored"
        );
        Ok(evicted)
    }

    /// Drop the current-session reference. History is untouched.
    pub fn clear_current(&self, kind: ToolKind) -> Result<bool, CiphertraceError> {
        let removed = self.db.remove_item(&Self::current_key(kind))?;
        info!(tool = %kind, removed, "Current session cleared");
        Ok(removed)
    }

    /// Look a session up by id in the current slot, then in the newest
    /// `cap` history entries.
    pub fn find<R: AnalysisRecord>(
        &self,
        kind: ToolKind,
        id: &str,
        cap: usize,
    ) -> Result<Option<ScanSession<R>>, CiphertraceError> {
        if let Some(current) = self.load_current::<R>(kind)? {
            if current.id == id {
                return Ok(Some(current));
            }
        }
        Ok(self.load_history::<R>(kind, cap)?.get(id).cloned())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CiphertraceError> {
        let Some(raw) = self.db.get_item(key)? else {
            return Ok(None);
        };
        match schema::decode(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable stored value");
                self.db.remove_item(key)?;
                Ok(None)
            }
        }
    }

}
