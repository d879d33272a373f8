use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::errors::CiphertraceError;
use crate::input::extract::{extract_phone_numbers, format_phone_number};
use crate::input::ScanInput;
use crate::models::{AnalysisRecord, ToolKind};
use crate::pipeline::phase::{PhaseDefinition, CALL_TRACE_PHASES};
use crate::synth::{self, ReasonTable, Thresholds};
use super::Tool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneRisk {
    Low,
    Medium,
    High,
    Critical,
}

impl PhoneRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineType {
    Mobile,
    Landline,
    Voip,
    TollFree,
}

impl LineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Landline => "landline",
            Self::Voip => "voip",
            Self::TollFree => "toll-free",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub region: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsintFindings {
    pub social_profiles: Vec<String>,
    pub data_breaches: u32,
    pub linked_scams: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneAnalysis {
    pub id: String,
    /// Ten digits, no formatting.
    pub number: String,
    pub formatted: String,
    pub risk_score: u8,
    pub risk_level: PhoneRisk,
    pub carrier: String,
    pub line_type: LineType,
    pub location: Location,
    pub spam_reports: u32,
    pub osint: OsintFindings,
    pub reasons: Vec<String>,
}

impl AnalysisRecord for PhoneAnalysis {
    const BUCKETS: &'static [&'static str] = &["low", "medium", "high", "critical"];

    fn id(&self) -> &str {
        &self.id
    }

    fn risk_score(&self) -> u8 {
        self.risk_score
    }

    fn risk_label(&self) -> &'static str {
        self.risk_level.as_str()
    }

    fn category(&self) -> Option<&str> {
        Some(self.line_type.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.number.as_str(),
            self.formatted.as_str(),
            self.carrier.as_str(),
            self.location.city.as_str(),
        ]
    }

    fn csv_header() -> &'static [&'static str] {
        &["id", "number", "risk_level", "risk_score", "carrier", "line_type", "city", "region", "spam_reports", "reasons"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.formatted.clone(),
            self.risk_level.as_str().to_string(),
            self.risk_score.to_string(),
            self.carrier.clone(),
            self.line_type.as_str().to_string(),
            self.location.city.clone(),
            self.location.region.clone(),
            self.spam_reports.to_string(),
            self.reasons.join("; "),
        ]
    }
}

const LEVELS: Thresholds<PhoneRisk> = &[
    (85, PhoneRisk::Critical),
    (60, PhoneRisk::High),
    (30, PhoneRisk::Medium),
];

const REASONS: ReasonTable = &[
    (30, "Number has community spam reports"),
    (60, "Caller ID is frequently spoofed"),
    (85, "Linked to active fraud campaigns"),
];

const TOLL_FREE_PREFIXES: &[&str] = &["800", "833", "844", "855", "866", "877", "888"];

const CARRIERS: &[&str] = &["Verizon", "AT&T", "T-Mobile", "Bandwidth.com", "Twilio", "Lumen"];

const LOCATIONS: &[(&str, &str, &str)] = &[
    ("New York", "NY", "America/New_York"),
    ("Chicago", "IL", "America/Chicago"),
    ("Dallas", "TX", "America/Chicago"),
    ("Denver", "CO", "America/Denver"),
    ("Phoenix", "AZ", "America/Phoenix"),
    ("Seattle", "WA", "America/Los_Angeles"),
    ("Miami", "FL", "America/New_York"),
];

const SOCIAL_SITES: &[&str] = &["LinkedIn", "Facebook", "WhatsApp", "Telegram", "Truecaller"];

const SCAM_TYPES: &[&str] = &["IRS impersonation", "Tech support", "Car warranty", "Bank fraud alert", "Prize notification"];

/// Traces phone numbers found in pasted text.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallTracer;

impl Tool for CallTracer {
    type Item = String;
    type Record = PhoneAnalysis;

    fn kind(&self) -> ToolKind {
        ToolKind::CallTracer
    }

    fn phases(&self) -> &'static [PhaseDefinition] {
        CALL_TRACE_PHASES
    }

    fn collect(&self, input: &ScanInput) -> Result<Vec<String>, CiphertraceError> {
        let numbers = extract_phone_numbers(input.require_text()?);
        if numbers.is_empty() {
            return Err(CiphertraceError::EmptyInput("No phone numbers found in the pasted text".into()));
        }
        Ok(numbers)
    }

    fn synthesize<G: Rng + ?Sized>(&self, index: usize, number: &String, rng: &mut G) -> PhoneAnalysis {
        let line_type = if TOLL_FREE_PREFIXES.iter().any(|p| number.starts_with(p)) {
            LineType::TollFree
        } else {
            synth::pick(rng, &[LineType::Mobile, LineType::Mobile, LineType::Landline, LineType::Voip])
        };

        let score = synth::biased_score(rng, line_type == LineType::Voip);
        let risk_level = synth::bucket(score, LEVELS, PhoneRisk::Low);
        let (city, region, timezone) = synth::pick(rng, LOCATIONS);

        let spam_reports = match risk_level {
            PhoneRisk::Low => rng.gen_range(0..3),
            PhoneRisk::Medium => rng.gen_range(3..40),
            PhoneRisk::High => rng.gen_range(40..300),
            PhoneRisk::Critical => rng.gen_range(300..2500),
        };

        PhoneAnalysis {
            id: synth::record_id("PH", index),
            number: number.clone(),
            formatted: format_phone_number(number),
            risk_score: score,
            risk_level,
            carrier: synth::pick(rng, CARRIERS).to_string(),
            line_type,
            location: Location {
                city: city.to_string(),
                region: region.to_string(),
                timezone: timezone.to_string(),
            },
            spam_reports,
            osint: OsintFindings {
                social_profiles: synth::pick_many(rng, SOCIAL_SITES, 3),
                data_breaches: rng.gen_range(0..6),
                linked_scams: if score >= 60 { synth::pick_many(rng, SCAM_TYPES, 2) } else { Vec::new() },
            },
            reasons: synth::reasons_for(score, REASONS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{assert_well_formed, run_seeded};

    #[test]
    fn test_two_callers_in_sentence() {
        let input = ScanInput::text("555-123-4567 called from 555-987-6543");
        let session = run_seeded(&CallTracer, &input, 9);
        assert_eq!(session.records.len(), 2);
        assert_eq!(session.records[0].number, "5551234567");
        assert_eq!(session.records[0].formatted, "(555) 123-4567");
        assert_eq!(session.records[1].id, "PH-002");
        assert_well_formed(&session);
    }

    #[test]
    fn test_toll_free_detected() {
        let session = run_seeded(&CallTracer, &ScanInput::text("Call 1-800-555-0199 today"), 1);
        assert_eq!(session.records[0].line_type, LineType::TollFree);
        assert_eq!(session.records[0].category(), Some("toll-free"));
    }

    #[test]
    fn test_spam_reports_track_level() {
        for seed in 0..40 {
            let session = run_seeded(&CallTracer, &ScanInput::text("2125550100, 3125550111, 9175550122"), seed);
            for record in &session.records {
                match record.risk_level {
                    PhoneRisk::Low => assert!(record.spam_reports < 3),
                    PhoneRisk::Critical => assert!(record.spam_reports >= 300),
                    _ => {}
                }
                if record.risk_score < 60 {
                    assert!(record.osint.linked_scams.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_no_numbers_rejected() {
        let err = CallTracer.collect(&ScanInput::text("no digits here")).unwrap_err();
        assert!(matches!(err, CiphertraceError::EmptyInput(_)));
    }
}
