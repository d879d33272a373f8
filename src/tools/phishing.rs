use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::errors::CiphertraceError;
use crate::input::extract::{extract_urls, url_domain};
use crate::input::ScanInput;
use crate::models::{AnalysisRecord, ToolKind};
use crate::pipeline::phase::{PhaseDefinition, PHISHING_PHASES};
use crate::synth::{self, ReasonTable, Thresholds};
use super::{contains_any, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlRisk {
    Safe,
    Suspicious,
    Malicious,
}

impl UrlRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Suspicious => "suspicious",
            Self::Malicious => "malicious",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatCategory {
    Phishing,
    Malware,
    Scam,
    Legitimate,
}

impl ThreatCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phishing => "phishing",
            Self::Malware => "malware",
            Self::Scam => "scam",
            Self::Legitimate => "legitimate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatIntel {
    pub blacklisted: bool,
    pub blacklist_sources: Vec<String>,
    pub domain_age_days: u32,
    pub ssl_valid: bool,
    pub redirect_count: u8,
    pub hosting_country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlAnalysis {
    pub id: String,
    pub url: String,
    pub domain: String,
    pub risk_score: u8,
    pub risk_level: UrlRisk,
    pub category: ThreatCategory,
    pub threat_intel: ThreatIntel,
    pub reasons: Vec<String>,
}

impl AnalysisRecord for UrlAnalysis {
    const BUCKETS: &'static [&'static str] = &["safe", "suspicious", "malicious"];

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
        Some(self.category.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.url.as_str(), self.domain.as_str()]
    }

    fn csv_header() -> &'static [&'static str] {
        &["id", "url", "domain", "risk_level", "risk_score", "category", "blacklisted", "domain_age_days", "ssl_valid", "reasons"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.url.clone(),
            self.domain.clone(),
            self.risk_level.as_str().to_string(),
            self.risk_score.to_string(),
            self.category.as_str().to_string(),
            self.threat_intel.blacklisted.to_string(),
            self.threat_intel.domain_age_days.to_string(),
            self.threat_intel.ssl_valid.to_string(),
            self.reasons.join("; "),
        ]
    }
}

const LEVELS: Thresholds<UrlRisk> = &[(75, UrlRisk::Malicious), (40, UrlRisk::Suspicious)];

const REASONS: ReasonTable = &[
    (40, "Domain was registered recently"),
    (55, "Page imitates a well-known brand"),
    (75, "Listed on one or more threat feeds"),
    (90, "Hosts a credential-harvesting form"),
];

const RISKY_TLDS: &[&str] = &[".xyz", ".top", ".biz", ".ru", ".tk", ".click", ".zip"];

const LURE_WORDS: &[&str] = &["login", "verify", "secure", "account", "update", "wallet", "prize"];

const FEEDS: &[&str] = &["PhishTank", "OpenPhish", "URLhaus", "Spamhaus DBL", "Google Safe Browsing"];

const COUNTRIES: &[&str] = &["US", "DE", "NL", "RU", "CN", "SG", "BR", "PA"];

/// Checks URLs found in pasted text against simulated threat intelligence.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhishingDetector;

impl Tool for PhishingDetector {
    type Item = String;
    type Record = UrlAnalysis;

    fn kind(&self) -> ToolKind {
        ToolKind::PhishingDetector
    }

    fn phases(&self) -> &'static [PhaseDefinition] {
        PHISHING_PHASES
    }

    fn collect(&self, input: &ScanInput) -> Result<Vec<String>, CiphertraceError> {
        let urls = extract_urls(input.require_text()?);
        if urls.is_empty() {
            return Err(CiphertraceError::EmptyInput("No URLs found in the pasted text".into()));
        }
        Ok(urls)
    }

    fn synthesize<G: Rng + ?Sized>(&self, index: usize, url: &String, rng: &mut G) -> UrlAnalysis {
        let domain = url_domain(url);
        let score = synth::biased_score(rng, looks_suspicious(url, &domain));
        let risk_level = synth::bucket(score, LEVELS, UrlRisk::Safe);
        let category = match risk_level {
            UrlRisk::Safe => ThreatCategory::Legitimate,
            _ => synth::pick(rng, &[ThreatCategory::Phishing, ThreatCategory::Malware, ThreatCategory::Scam]),
        };
        let blacklisted = score >= 75;

        UrlAnalysis {
            id: synth::record_id("URL", index),
            url: url.clone(),
            domain,
            risk_score: score,
            risk_level,
            category,
            threat_intel: ThreatIntel {
                blacklisted,
                blacklist_sources: if blacklisted { synth::pick_many(rng, FEEDS, 3) } else { Vec::new() },
                domain_age_days: if score >= 40 { rng.gen_range(0..90) } else { rng.gen_range(365..9000) },
                ssl_valid: url.to_lowercase().starts_with("https://") && score < 75,
                redirect_count: rng.gen_range(0..if score >= 40 { 6 } else { 2 }),
                hosting_country: synth::pick(rng, COUNTRIES).to_string(),
            },
            reasons: synth::reasons_for(score, REASONS),
        }
    }
}

fn looks_suspicious(url: &str, domain: &str) -> bool {
    let ip_host = !domain.is_empty() && domain.chars().all(|c| c.is_ascii_digit() || c == '.');
    url.to_lowercase().starts_with("http://")
        || url.contains('@')
        || ip_host
        || domain.matches('-').count() >= 2
        || RISKY_TLDS.iter().any(|tld| domain.ends_with(tld))
        || contains_any(url, LURE_WORDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{assert_well_formed, run_seeded};

    const SAMPLE: &str = "Claim here http://free-prize-wallet.xyz/claim now, or read https://www.rust-lang.org/learn.";

    #[test]
    fn test_one_record_per_url() {
        let session = run_seeded(&PhishingDetector, &ScanInput::text(SAMPLE), 5);
        assert_eq!(session.records.len(), 2);
        assert_eq!(session.records[0].domain, "free-prize-wallet.xyz");
        assert_eq!(session.records[1].url, "https://www.rust-lang.org/learn");
        assert_well_formed(&session);
    }

    #[test]
    fn test_category_tracks_level() {
        for seed in 0..40 {
            let session = run_seeded(&PhishingDetector, &ScanInput::text(SAMPLE), seed);
            for record in &session.records {
                let legit = record.category == ThreatCategory::Legitimate;
                assert_eq!(legit, record.risk_level == UrlRisk::Safe);
                assert_eq!(record.threat_intel.blacklisted, record.risk_score >= 75);
                if !record.threat_intel.blacklisted {
                    assert!(record.threat_intel.blacklist_sources.is_empty());
                }
            }
        }
    }

    #[test]
    fn test_suspicious_url_never_safe() {
        for seed in 0..20 {
            let session = run_seeded(&PhishingDetector, &ScanInput::text(SAMPLE), seed);
            assert_ne!(session.records[0].risk_level, UrlRisk::Safe);
        }
    }

    #[test]
    fn test_text_without_urls_rejected() {
        let err = PhishingDetector.collect(&ScanInput::text("nothing to see")).unwrap_err();
        assert!(matches!(err, CiphertraceError::EmptyInput(_)));
    }

    #[test]
    fn test_looks_suspicious() {
        assert!(looks_suspicious("http://10.0.0.1/x", "10.0.0.1"));
        assert!(looks_suspicious("https://my-bank-help-desk.com", "my-bank-help-desk.com"));
        assert!(!looks_suspicious("https://docs.rs/tokio", "docs.rs"));
    }
}
