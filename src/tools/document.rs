use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::errors::CiphertraceError;
use crate::input::{FilePolicy, ScanInput, UploadedFile};
use crate::models::{AnalysisRecord, ToolKind};
use crate::pipeline::phase::{PhaseDefinition, DOCUMENT_PHASES};
use crate::synth::{self, ReasonTable, Thresholds};
use super::{collect_files, Tool};

pub const DOCUMENT_POLICY: FilePolicy = FilePolicy {
    extensions: &["pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "zip"],
    media_prefix: None,
    max_size_bytes: 25 * 1024 * 1024,
};

/// Formats that can carry VBA macros.
const MACRO_CAPABLE: &[&str] = &["doc", "docx", "xls", "xlsx", "ppt", "pptx"];

/// Legacy and archive formats that are over-represented in malware droppers.
const RISKY_FORMATS: &[&str] = &["doc", "xls", "ppt", "rtf", "zip"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentThreat {
    Clean,
    Low,
    Suspicious,
    Infected,
}

impl DocumentThreat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Low => "low",
            Self::Suspicious => "suspicious",
            Self::Infected => "infected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatDetection {
    pub name: String,
    pub kind: String,
    pub engine: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroAnalysis {
    pub present: bool,
    pub auto_exec: bool,
    pub obfuscated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanFile {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    pub size_bytes: u64,
    pub sha256: String,
    pub risk_score: u8,
    pub threat_level: DocumentThreat,
    pub threats: Vec<ThreatDetection>,
    pub macros: MacroAnalysis,
    pub embedded_objects: u32,
    pub reasons: Vec<String>,
}

impl AnalysisRecord for ScanFile {
    const BUCKETS: &'static [&'static str] = &["clean", "low", "suspicious", "infected"];

    fn id(&self) -> &str {
        &self.id
    }

    fn risk_score(&self) -> u8 {
        self.risk_score
    }

    fn risk_label(&self) -> &'static str {
        self.threat_level.as_str()
    }

    fn category(&self) -> Option<&str> {
        Some(&self.file_type)
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.file_name.as_str(), self.sha256.as_str()];
        fields.extend(self.threats.iter().map(|t| t.name.as_str()));
        fields
    }

    fn csv_header() -> &'static [&'static str] {
        &["id", "file_name", "file_type", "size_bytes", "sha256", "threat_level", "risk_score", "threats", "macros", "reasons"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.file_name.clone(),
            self.file_type.clone(),
            self.size_bytes.to_string(),
            self.sha256.clone(),
            self.threat_level.as_str().to_string(),
            self.risk_score.to_string(),
            self.threats.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join("; "),
            self.macros.present.to_string(),
            self.reasons.join("; "),
        ]
    }
}

const LEVELS: Thresholds<DocumentThreat> = &[
    (80, DocumentThreat::Infected),
    (55, DocumentThreat::Suspicious),
    (25, DocumentThreat::Low),
];

const REASONS: ReasonTable = &[
    (25, "Contains active content"),
    (55, "Heuristic engine flagged suspicious structure"),
    (80, "Signature match in one or more AV engines"),
];

const THREAT_NAMES: &[(&str, &str)] = &[
    ("Trojan.Emotet.Downloader", "trojan"),
    ("W97M.Downloader.Agent", "macro"),
    ("PDF.Exploit.CVE-2023-21608", "exploit"),
    ("Ransom.LockBit.Dropper", "ransomware"),
    ("JS.Obfuscated.Loader", "script"),
    ("Backdoor.QakBot", "backdoor"),
];

const ENGINES: &[&str] = &["ClamAV", "YARA", "Defender", "Sophos", "ESET"];

/// Scans uploaded documents for malware indicators.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentScanner;

impl Tool for DocumentScanner {
    type Item = UploadedFile;
    type Record = ScanFile;

    fn kind(&self) -> ToolKind {
        ToolKind::DocumentScanner
    }

    fn phases(&self) -> &'static [PhaseDefinition] {
        DOCUMENT_PHASES
    }

    fn file_policy(&self) -> Option<FilePolicy> {
        Some(DOCUMENT_POLICY)
    }

    fn collect(&self, input: &ScanInput) -> Result<Vec<UploadedFile>, CiphertraceError> {
        collect_files(self, input)
    }

    fn synthesize<G: Rng + ?Sized>(&self, index: usize, file: &UploadedFile, rng: &mut G) -> ScanFile {
        let file_type = file.extension().unwrap_or_default();
        let score = synth::biased_score(rng, RISKY_FORMATS.contains(&file_type.as_str()));
        let threat_level = synth::bucket(score, LEVELS, DocumentThreat::Clean);

        let macro_capable = MACRO_CAPABLE.contains(&file_type.as_str());
        let macros_present = macro_capable && score >= 25 && rng.gen_bool(0.8);

        let threats = if threat_level == DocumentThreat::Infected {
            let count = rng.gen_range(1..=3);
            (0..count)
                .map(|_| {
                    let (name, kind) = synth::pick(rng, THREAT_NAMES);
                    ThreatDetection {
                        name: name.to_string(),
                        kind: kind.to_string(),
                        engine: synth::pick(rng, ENGINES).to_string(),
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        ScanFile {
            id: synth::record_id("DOC", index),
            file_name: file.name.clone(),
            file_type,
            size_bytes: file.size_bytes,
            sha256: (0..32).map(|_| format!("{:02x}", rng.gen::<u8>())).collect(),
            risk_score: score,
            threat_level,
            threats,
            macros: MacroAnalysis {
                present: macros_present,
                auto_exec: macros_present && score >= 55,
                obfuscated: macros_present && score >= 80,
            },
            embedded_objects: rng.gen_range(0..if score >= 55 { 8 } else { 2 }),
            reasons: synth::reasons_for(score, REASONS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{assert_well_formed, run_seeded};

    fn batch() -> ScanInput {
        ScanInput::files(vec![
            UploadedFile::new("invoice.doc", 120_000),
            UploadedFile::new("report.pdf", 2_000_000),
            UploadedFile::new("notes.txt", 800),
        ])
    }

    #[test]
    fn test_record_per_file() {
        let session = run_seeded(&DocumentScanner, &batch(), 2);
        assert_eq!(session.records.len(), 3);
        assert_eq!(session.records[1].file_type, "pdf");
        assert_eq!(session.records[0].sha256.len(), 64);
        assert_well_formed(&session);
    }

    #[test]
    fn test_threats_and_macros_consistent() {
        for seed in 0..40 {
            let session = run_seeded(&DocumentScanner, &batch(), seed);
            for record in &session.records {
                assert_eq!(!record.threats.is_empty(), record.threat_level == DocumentThreat::Infected);
                if record.file_type == "pdf" || record.file_type == "txt" {
                    assert!(!record.macros.present);
                }
                if record.macros.auto_exec {
                    assert!(record.macros.present);
                }
            }
        }
    }

    #[test]
    fn test_category_filter_uses_file_type() {
        let session = run_seeded(&DocumentScanner, &batch(), 2);
        let filter = crate::view::ResultFilter::default().category("PDF");
        let hits = filter.apply(&session.records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].file_name, "report.pdf");
    }

    #[test]
    fn test_executable_rejects_batch() {
        let input = ScanInput::files(vec![
            UploadedFile::new("report.pdf", 100),
            UploadedFile::new("setup.exe", 100),
        ]);
        assert!(matches!(DocumentScanner.collect(&input), Err(CiphertraceError::UnsupportedFile(_))));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let input = ScanInput::files(vec![UploadedFile::new("huge.zip", 26 * 1024 * 1024)]);
        assert!(matches!(DocumentScanner.collect(&input), Err(CiphertraceError::InvalidInput(_))));
    }
}
