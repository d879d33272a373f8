use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::record::AnalysisRecord;
use super::tool::ToolKind;

/// Where a scan's input came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InputSource {
    /// Pasted text, with its length in characters.
    Text { chars: usize },
    /// Uploaded files, by name.
    Files { names: Vec<String> },
}

impl InputSource {
    pub fn describe(&self) -> String {
        match self {
            Self::Text { chars } => format!("pasted text ({} chars)", chars),
            Self::Files { names } if names.len() == 1 => format!("file {}", names[0]),
            Self::Files { names } => format!("{} files", names.len()),
        }
    }
}

/// Aggregate risk distribution over a set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    /// Bucket label to number of records in that bucket. Every bucket of the
    /// record type is present, including empty ones.
    pub distribution: BTreeMap<String, usize>,
    pub total: usize,
    pub average_score: f64,
    pub max_score: u8,
}

impl RiskSummary {
    pub fn from_records<R: AnalysisRecord>(records: &[R]) -> Self {
        let mut distribution: BTreeMap<String, usize> =
            R::BUCKETS.iter().map(|b| (b.to_string(), 0)).collect();
        for record in records {
            *distribution.entry(record.risk_label().to_string()).or_insert(0) += 1;
        }

        let score_sum: u64 = records.iter().map(|r| r.risk_score() as u64).sum();
        // Two decimals keep the value stable through JSON round trips.
        let average_score = if records.is_empty() {
            0.0
        } else {
            (score_sum as f64 / records.len() as f64 * 100.0).round() / 100.0
        };

        Self {
            distribution,
            total: records.len(),
            average_score,
            max_score: records.iter().map(|r| r.risk_score()).max().unwrap_or(0),
        }
    }

    pub fn count(&self, label: &str) -> usize {
        self.distribution.get(label).copied().unwrap_or(0)
    }

    /// True when the bucket counts add up to the total.
    pub fn reconciles(&self) -> bool {
        self.distribution.values().sum::<usize>() == self.total
    }
}

/// One completed scan: its records plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSession<R> {
    pub id: String,
    pub tool: ToolKind,
    pub created_at: DateTime<Utc>,
    pub source: InputSource,
    pub duration_ms: u64,
    pub records: Vec<R>,
    pub summary: RiskSummary,
}

impl<R: AnalysisRecord> ScanSession<R> {
    pub fn new(tool: ToolKind, source: InputSource, records: Vec<R>, duration_ms: u64) -> Self {
        let summary = RiskSummary::from_records(&records);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tool,
            created_at: Utc::now(),
            source,
            duration_ms,
            records,
            summary,
        }
    }

    /// Copy of this session restricted to `records`, with the summary recomputed.
    pub fn with_records(&self, records: Vec<R>) -> Self {
        Self {
            id: self.id.clone(),
            tool: self.tool,
            created_at: self.created_at,
            source: self.source.clone(),
            duration_ms: self.duration_ms,
            summary: RiskSummary::from_records(&records),
            records,
        }
    }

    pub fn overview(&self) -> SessionOverview {
        SessionOverview {
            id: self.id.clone(),
            tool: self.tool,
            created_at: self.created_at,
            source: self.source.clone(),
            duration_ms: self.duration_ms,
            record_count: self.records.len(),
            summary: self.summary.clone(),
        }
    }
}

/// Record-free view of a session, used for history listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOverview {
    pub id: String,
    pub tool: ToolKind,
    pub created_at: DateTime<Utc>,
    pub source: InputSource,
    pub duration_ms: u64,
    pub record_count: usize,
    pub summary: RiskSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: String,
        score: u8,
    }

    impl AnalysisRecord for Sample {
        const BUCKETS: &'static [&'static str] = &["low", "high"];

        fn id(&self) -> &str {
            &self.id
        }
        fn risk_score(&self) -> u8 {
            self.score
        }
        fn risk_label(&self) -> &'static str {
            if self.score >= 50 { "high" } else { "low" }
        }
        fn search_fields(&self) -> Vec<&str> {
            vec![self.id.as_str()]
        }
        fn csv_header() -> &'static [&'static str] {
            &["id", "score"]
        }
        fn csv_row(&self) -> Vec<String> {
            vec![self.id.clone(), self.score.to_string()]
        }
    }

    fn sample(id: &str, score: u8) -> Sample {
        Sample { id: id.to_string(), score }
    }

    #[test]
    fn test_summary_includes_empty_buckets() {
        let summary = RiskSummary::from_records(&[sample("a", 10), sample("b", 20)]);
        assert_eq!(summary.count("low"), 2);
        assert_eq!(summary.count("high"), 0);
        assert!(summary.distribution.contains_key("high"));
        assert!(summary.reconciles());
    }

    #[test]
    fn test_summary_average_and_max() {
        let summary = RiskSummary::from_records(&[sample("a", 10), sample("b", 90)]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.max_score, 90);
        assert!((summary.average_score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = RiskSummary::from_records::<Sample>(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_score, 0.0);
        assert!(summary.reconciles());
    }

    #[test]
    fn test_with_records_recomputes_summary() {
        let session = ScanSession::new(
            ToolKind::CallTracer,
            InputSource::Text { chars: 12 },
            vec![sample("a", 10), sample("b", 90)],
            5,
        );
        let narrowed = session.with_records(vec![sample("b", 90)]);
        assert_eq!(narrowed.id, session.id);
        assert_eq!(narrowed.summary.total, 1);
        assert_eq!(narrowed.summary.count("high"), 1);
    }

    #[test]
    fn test_input_source_describe() {
        assert_eq!(InputSource::Text { chars: 40 }.describe(), "pasted text (40 chars)");
        let one = InputSource::Files { names: vec!["a.pdf".into()] };
        assert_eq!(one.describe(), "file a.pdf");
        let many = InputSource::Files { names: vec!["a.pdf".into(), "b.pdf".into()] };
        assert_eq!(many.describe(), "2 files");
    }
}
