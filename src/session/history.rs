use crate::models::{AnalysisRecord, ScanSession, SessionOverview};

/// Newest-first list of past sessions, never longer than its cap.
#[derive(Debug, Clone)]
pub struct SessionHistory<R> {
    cap: usize,
    entries: Vec<ScanSession<R>>,
}

impl<R: AnalysisRecord> SessionHistory<R> {
    pub fn new(cap: usize) -> Self {
        Self { cap: cap.max(1), entries: Vec::new() }
    }

    /// Rebuild from stored entries, truncating if the cap shrank since they
    /// were written.
    pub fn from_entries(cap: usize, mut entries: Vec<ScanSession<R>>) -> Self {
        let cap = cap.max(1);
        entries.truncate(cap);
        Self { cap, entries }
    }

    /// Add a session at the front and return whatever fell off the end.
    pub fn push(&mut self, session: ScanSession<R>) -> Vec<ScanSession<R>> {
        self.entries.insert(0, session);
        if self.entries.len() > self.cap {
            self.entries.split_off(self.cap)
        } else {
            Vec::new()
        }
    }

    pub fn get(&self, id: &str) -> Option<&ScanSession<R>> {
        self.entries.iter().find(|s| s.id == id)
    }

    pub fn entries(&self) -> &[ScanSession<R>] {
        &self.entries
    }

    pub fn overviews(&self) -> Vec<SessionOverview> {
        self.entries.iter().map(ScanSession::overview).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}
