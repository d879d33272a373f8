use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::errors::CiphertraceError;
use crate::input::extract::{extract_urls, parse_email, split_blocks, ParsedEmail};
use crate::input::ScanInput;
use crate::models::{AnalysisRecord, ToolKind};
use crate::pipeline::phase::{PhaseDefinition, EMAIL_PHASES};
use crate::synth::{self, ReasonTable, Thresholds};
use super::{contains_any, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailRisk {
    Safe,
    Suspicious,
    Dangerous,
}

impl EmailRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Suspicious => "suspicious",
            Self::Dangerous => "dangerous",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthVerdict {
    Pass,
    SoftFail,
    Fail,
    None,
}

impl AuthVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::SoftFail => "softfail",
            Self::Fail => "fail",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticationResults {
    pub spf: AuthVerdict,
    pub dkim: AuthVerdict,
    pub dmarc: AuthVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentIndicators {
    pub urgency_language: bool,
    pub credential_request: bool,
    pub link_count: usize,
    pub reply_to_mismatch: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAnalysis {
    pub id: String,
    pub sender: String,
    pub subject: String,
    pub risk_score: u8,
    pub risk_level: EmailRisk,
    pub authentication: AuthenticationResults,
    pub indicators: ContentIndicators,
    pub sender_domain_age_days: u32,
    pub reasons: Vec<String>,
}

impl AnalysisRecord for EmailAnalysis {
    const BUCKETS: &'static [&'static str] = &["safe", "suspicious", "dangerous"];

    fn id(&self) -> &str {
        &self.id
    }

    fn risk_score(&self) -> u8 {
        self.risk_score
    }

    fn risk_label(&self) -> &'static str {
        self.risk_level.as_str()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.sender.as_str(), self.subject.as_str()]
    }

    fn csv_header() -> &'static [&'static str] {
        &["id", "sender", "subject", "risk_level", "risk_score", "spf", "dkim", "dmarc", "reasons"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.sender.clone(),
            self.subject.clone(),
            self.risk_level.as_str().to_string(),
            self.risk_score.to_string(),
            self.authentication.spf.as_str().to_string(),
            self.authentication.dkim.as_str().to_string(),
            self.authentication.dmarc.as_str().to_string(),
            self.reasons.join("; "),
        ]
    }
}

const LEVELS: Thresholds<EmailRisk> = &[(70, EmailRisk::Dangerous), (40, EmailRisk::Suspicious)];

const REASONS: ReasonTable = &[
    (40, "Sender domain has a poor reputation"),
    (55, "Message uses urgent or threatening language"),
    (70, "Sender authentication checks failed"),
    (85, "Links resolve to known credential-harvesting pages"),
];

const URGENCY_MARKERS: &[&str] = &[
    "urgent", "immediately", "suspended", "final notice", "act now", "within 24 hours", "locked",
];

const CREDENTIAL_MARKERS: &[&str] = &[
    "password", "verify your account", "login", "confirm your identity", "ssn", "bank details",
];

/// Scores pasted emails for phishing and spoofing signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailChecker;

impl Tool for EmailChecker {
    type Item = ParsedEmail;
    type Record = EmailAnalysis;

    fn kind(&self) -> ToolKind {
        ToolKind::EmailChecker
    }

    fn phases(&self) -> &'static [PhaseDefinition] {
        EMAIL_PHASES
    }

    fn collect(&self, input: &ScanInput) -> Result<Vec<ParsedEmail>, CiphertraceError> {
        let text = input.require_text()?;
        let emails: Vec<ParsedEmail> = split_blocks(text).iter().map(|b| parse_email(b)).collect();
        if emails.is_empty() {
            return Err(CiphertraceError::EmptyInput("No email content found".into()));
        }
        Ok(emails)
    }

    fn synthesize<G: Rng + ?Sized>(&self, index: usize, email: &ParsedEmail, rng: &mut G) -> EmailAnalysis {
        let full_text = format!("{}\n{}", email.subject, email.body);
        let urgency_language = contains_any(&full_text, URGENCY_MARKERS);
        let credential_request = contains_any(&full_text, CREDENTIAL_MARKERS);
        let reply_to_mismatch = email
            .reply_to
            .as_deref()
            .is_some_and(|r| domain_of(r) != domain_of(&email.sender));

        let score = synth::biased_score(rng, urgency_language || credential_request || reply_to_mismatch);
        let risk_level = synth::bucket(score, LEVELS, EmailRisk::Safe);

        let mut reasons = synth::reasons_for(score, REASONS);
        if reply_to_mismatch {
            reasons.push("Reply-To address differs from the sender's domain".to_string());
        }

        let verdicts: &[AuthVerdict] = if score >= 70 {
            &[AuthVerdict::Fail, AuthVerdict::SoftFail, AuthVerdict::None]
        } else {
            &[AuthVerdict::Pass, AuthVerdict::Pass, AuthVerdict::SoftFail]
        };

        EmailAnalysis {
            id: synth::record_id("EM", index),
            sender: email.sender.clone(),
            subject: email.subject.clone(),
            risk_score: score,
            risk_level,
            authentication: AuthenticationResults {
                spf: synth::pick(rng, verdicts),
                dkim: synth::pick(rng, verdicts),
                dmarc: synth::pick(rng, verdicts),
            },
            indicators: ContentIndicators {
                urgency_language,
                credential_request,
                link_count: extract_urls(&email.body).len(),
                reply_to_mismatch,
            },
            sender_domain_age_days: if score >= 70 { rng.gen_range(1..60) } else { rng.gen_range(200..7000) },
            reasons,
        }
    }
}

fn domain_of(address: &str) -> String {
    let address = address.trim().trim_end_matches('>');
    address.rsplit_once('@').map(|(_, d)| d).unwrap_or(address).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{assert_well_formed, run_seeded};

    const SAMPLE: &str = "From: security@paypa1-alerts.com\nSubject: URGENT: account suspended\nReply-To: help@collect.example\n\nVerify your account immediately at https://paypa1-alerts.com/login\n---\nFrom: friend@example.org\nSubject: Lunch\n\nSee you at noon.";

    #[test]
    fn test_one_record_per_block() {
        let session = run_seeded(&EmailChecker, &ScanInput::text(SAMPLE), 1);
        assert_eq!(session.records.len(), 2);
        assert_eq!(session.records[0].id, "EM-001");
        assert_eq!(session.records[1].sender, "friend@example.org");
        assert_well_formed(&session);
    }

    #[test]
    fn test_shady_email_scores_high_with_indicators() {
        for seed in 0..20 {
            let session = run_seeded(&EmailChecker, &ScanInput::text(SAMPLE), seed);
            let shady = &session.records[0];
            assert!(shady.risk_score >= 45);
            assert_ne!(shady.risk_level, EmailRisk::Safe);
            assert!(shady.indicators.urgency_language);
            assert!(shady.indicators.credential_request);
            assert!(shady.indicators.reply_to_mismatch);
            assert_eq!(shady.indicators.link_count, 1);
            assert!(shady.reasons.iter().any(|r| r.contains("Reply-To")));
        }
    }

    #[test]
    fn test_level_matches_thresholds() {
        for seed in 0..30 {
            let session = run_seeded(&EmailChecker, &ScanInput::text(SAMPLE), seed);
            for record in &session.records {
                let expected = match record.risk_score {
                    70.. => EmailRisk::Dangerous,
                    40..=69 => EmailRisk::Suspicious,
                    _ => EmailRisk::Safe,
                };
                assert_eq!(record.risk_level, expected);
            }
        }
    }

    #[test]
    fn test_same_seed_same_output() {
        let a = run_seeded(&EmailChecker, &ScanInput::text(SAMPLE), 42);
        let b = run_seeded(&EmailChecker, &ScanInput::text(SAMPLE), 42);
        assert_eq!(a.records, b.records);
    }

    #[test]
    fn test_separator_only_input_is_empty() {
        let err = EmailChecker.collect(&ScanInput::text("---\n---")).unwrap_err();
        assert!(matches!(err, CiphertraceError::EmptyInput(_)));
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("Alice <alice@Example.COM>"), "example.com");
        assert_eq!(domain_of("no-at-sign"), "no-at-sign");
    }
}
