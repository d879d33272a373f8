use std::fmt::Write;
use crate::models::{AnalysisRecord, ScanSession};
use crate::utils::formatting::format_duration;

const RULE_WIDTH: usize = 60;

/// Plain-text report: a header block, the risk summary table, then one
/// section per record with the lines produced by `details`.
pub fn format_text_report<R, F>(session: &ScanSession<R>, title: &str, details: F) -> String
where
    R: AnalysisRecord,
    F: Fn(&R) -> Vec<String>,
{
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{}", title.to_uppercase());
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Session:   {}", session.id);
    let _ = writeln!(out, "Generated: {}", session.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out, "Input:     {}", session.source.describe());
    let _ = writeln!(out, "Duration:  {}", format_duration(session.duration_ms));
    out.push('\n');

    out.push_str(&format_summary(session));

    for (n, record) in session.records.iter().enumerate() {
        out.push('\n');
        let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH));
        let _ = writeln!(
            out,
            "[{}] {}  risk {} ({}/100)",
            n + 1,
            record.id(),
            record.risk_label().to_uppercase(),
            record.risk_score()
        );
        for line in details(record) {
            let _ = writeln!(out, "    {}", line);
        }
    }

    out.push('\n');
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Generated results are simulated and for demonstration only.");
    out
}

fn format_summary<R: AnalysisRecord>(session: &ScanSession<R>) -> String {
    let summary = &session.summary;
    let mut out = String::from("SUMMARY\n");
    for bucket in R::BUCKETS {
        let _ = writeln!(out, "  {:<14} {:>4}", bucket, summary.count(bucket));
    }
    let _ = writeln!(out, "  {:<14} {:>4}", "total", summary.total);
    let _ = writeln!(out, "  {:<14} {:>7.2}", "average score", summary.average_score);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InputSource, ToolKind};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Story {
        id: String,
        headline: String,
        score: u8,
    }

    impl AnalysisRecord for Story {
        const BUCKETS: &'static [&'static str] = &["credible", "fake"];
        fn id(&self) -> &str {
            &self.id
        }
        fn risk_score(&self) -> u8 {
            self.score
        }
        fn risk_label(&self) -> &'static str {
            if self.score >= 50 { "fake" } else { "credible" }
        }
        fn search_fields(&self) -> Vec<&str> {
            vec![self.headline.as_str()]
        }
        fn csv_header() -> &'static [&'static str] {
            &["id"]
        }
        fn csv_row(&self) -> Vec<String> {
            vec![self.id.clone()]
        }
    }

    #[test]
    fn test_report_contains_summary_and_records() {
        let session = ScanSession::new(
            ToolKind::FakeNewsTracker,
            InputSource::Text { chars: 80 },
            vec![
                Story { id: "NEWS-001".into(), headline: "Moon made of cheese".into(), score: 91 },
                Story { id: "NEWS-002".into(), headline: "Rain expected".into(), score: 5 },
            ],
            1500,
        );
        let report = format_text_report(&session, "Fake News Analysis Report", |s| {
            vec![format!("Headline: {}", s.headline)]
        });

        assert!(report.starts_with(&"=".repeat(60)));
        assert!(report.contains("FAKE NEWS ANALYSIS REPORT"));
        assert!(report.contains(&session.id));
        assert!(report.contains("[1] NEWS-001  risk FAKE (91/100)"));
        assert!(report.contains("    Headline: Rain expected"));
        assert!(report.contains("  credible          1"));
        assert!(report.contains("  total             2"));
    }
}
