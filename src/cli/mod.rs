pub mod commands;
pub mod export;
pub mod history;
pub mod progress;
pub mod scan;
pub mod serve;
pub mod tools;

pub use commands::{Cli, Commands, LogFormat};

use console::style;
use crate::config::CiphertraceConfig;
use crate::db::Database;
use crate::errors::CiphertraceError;
use crate::session::SessionStore;
use crate::tools::{RecordRow, ScanOutcome, ToolRegistry};
use crate::utils::formatting::{format_duration, share_bar, truncate_chars};
use tracing::debug;

/// Loaded configuration plus the global flags every handler needs.
pub struct CliContext {
    pub config: CiphertraceConfig,
    pub db_path: String,
    pub quiet: bool,
}

impl CliContext {
    pub fn new(config: CiphertraceConfig, db_override: Option<String>, quiet: bool) -> Self {
        let db_path = db_override.unwrap_or_else(|| config.storage.db_path.clone());
        Self { config, db_path, quiet }
    }

    pub fn open_registry(&self) -> Result<ToolRegistry, CiphertraceError> {
        self.registry_with(&self.config)
    }

    /// Registry built from an adjusted copy of the config (e.g. a CLI seed).
    pub fn registry_with(&self, config: &CiphertraceConfig) -> Result<ToolRegistry, CiphertraceError> {
        debug!(db = %self.db_path, "Opening session store");
        let db = Database::new(&self.db_path)?;
        Ok(ToolRegistry::from_config(config, SessionStore::new(db)))
    }
}

/// Human-readable rendering of a session: header, risk summary, records.
pub(crate) fn print_outcome(outcome: &ScanOutcome) {
    let overview = &outcome.overview;
    println!();
    println!(
        "{} {}",
        style(overview.tool.display_name()).bold(),
        style(format!("session {}", overview.id)).dim()
    );
    println!(
        "  {} | {} | {}",
        overview.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        overview.source.describe(),
        format_duration(overview.duration_ms)
    );
    println!();

    let summary = &overview.summary;
    for (label, count) in &summary.distribution {
        println!(
            "  {:<12} {} {:>3}",
            label,
            share_bar(*count, summary.total, 20),
            count
        );
    }
    println!(
        "  {} records, average score {:.1}, max {}",
        summary.total, summary.average_score, summary.max_score
    );
    println!();

    for row in &outcome.rows {
        print_row(row);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Clear,
    Caution,
    Alarm,
}

/// Colour follows the record's label, so rows sharing a label look alike.
/// The upper half of a tool's buckets is alarming, the lowest is clear.
fn tone(row: &RecordRow) -> Tone {
    if row.rank == 0 {
        Tone::Clear
    } else if row.rank * 2 >= row.ranks {
        Tone::Alarm
    } else {
        Tone::Caution
    }
}

fn print_row(row: &RecordRow) {
    let risk = format!("{:<11}", row.risk);
    let risk = match tone(row) {
        Tone::Alarm => style(risk).red(),
        Tone::Caution => style(risk).yellow(),
        Tone::Clear => style(risk).green(),
    };
    println!(
        "  {:<9} {} {:>3}  {}",
        row.id,
        risk,
        row.score,
        truncate_chars(&row.subject, 60)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(risk: &'static str, rank: usize, ranks: usize, score: u8) -> RecordRow {
        RecordRow { id: "R-001".into(), risk, rank, ranks, score, subject: String::new() }
    }

    #[test]
    fn test_tone_follows_label_not_score() {
        // Call tracer: low, medium, high, critical.
        assert_eq!(tone(&row("high", 2, 4, 61)), Tone::Alarm);
        assert_eq!(tone(&row("high", 2, 4, 75)), Tone::Alarm);
        assert_eq!(tone(&row("medium", 1, 4, 45)), Tone::Caution);
        assert_eq!(tone(&row("low", 0, 4, 10)), Tone::Clear);
    }

    #[test]
    fn test_tone_for_three_buckets() {
        // Email checker: safe, suspicious, dangerous.
        assert_eq!(tone(&row("safe", 0, 3, 39)), Tone::Clear);
        assert_eq!(tone(&row("suspicious", 1, 3, 69)), Tone::Caution);
        assert_eq!(tone(&row("dangerous", 2, 3, 70)), Tone::Alarm);
    }
}
