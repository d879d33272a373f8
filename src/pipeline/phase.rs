use serde::Serialize;

/// One named step of a simulated scan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PhaseDefinition {
    pub name: &'static str,
    pub description: &'static str,
}

pub static EMAIL_PHASES: &[PhaseDefinition] = &[
    PhaseDefinition {
        name: "Header Validation",
        description: "Parse sender, reply-to and routing headers",
    },
    PhaseDefinition {
        name: "SPF/DKIM/DMARC Check",
        description: "Check sender authentication records",
    },
    PhaseDefinition {
        name: "Content Analysis",
        description: "Look for urgency cues, credential requests and lookalike links",
    },
    PhaseDefinition {
        name: "ML Classification",
        description: "Score the message with the phishing classifier",
    },
    PhaseDefinition {
        name: "Reputation Lookup",
        description: "Query sender domain reputation feeds",
    },
];

pub static PHISHING_PHASES: &[PhaseDefinition] = &[
    PhaseDefinition {
        name: "URL Parsing",
        description: "Normalize URLs and extract domains",
    },
    PhaseDefinition {
        name: "Domain Reputation",
        description: "Check blocklists and domain age",
    },
    PhaseDefinition {
        name: "SSL Certificate Check",
        description: "Inspect certificate issuer and validity",
    },
    PhaseDefinition {
        name: "Content Fingerprinting",
        description: "Compare page structure against known phishing kits",
    },
    PhaseDefinition {
        name: "Threat Intelligence",
        description: "Correlate with threat intelligence feeds",
    },
];

pub static CALL_TRACE_PHASES: &[PhaseDefinition] = &[
    PhaseDefinition {
        name: "Number Normalization",
        description: "Validate and normalize extracted numbers",
    },
    PhaseDefinition {
        name: "Carrier Lookup",
        description: "Resolve carrier and line type",
    },
    PhaseDefinition {
        name: "Geolocation",
        description: "Estimate the registered location",
    },
    PhaseDefinition {
        name: "Spam Database Check",
        description: "Look up community spam reports",
    },
    PhaseDefinition {
        name: "OSINT Correlation",
        description: "Correlate the number with public profiles",
    },
];

pub static VOICE_PHASES: &[PhaseDefinition] = &[
    PhaseDefinition {
        name: "Audio Decoding",
        description: "Decode and resample the recording",
    },
    PhaseDefinition {
        name: "Spectral Analysis",
        description: "Extract spectral and prosodic features",
    },
    PhaseDefinition {
        name: "Deepfake Detection",
        description: "Score the likelihood of synthetic speech",
    },
    PhaseDefinition {
        name: "Speaker Matching",
        description: "Compare the voiceprint against known speakers",
    },
];

pub static DOCUMENT_PHASES: &[PhaseDefinition] = &[
    PhaseDefinition {
        name: "File Type Verification",
        description: "Check magic bytes against the extension",
    },
    PhaseDefinition {
        name: "Signature Scan",
        description: "Match known malware signatures",
    },
    PhaseDefinition {
        name: "Macro Analysis",
        description: "Inspect embedded macros and auto-exec triggers",
    },
    PhaseDefinition {
        name: "Embedded Object Extraction",
        description: "Extract embedded objects and links",
    },
    PhaseDefinition {
        name: "Sandbox Detonation",
        description: "Observe behaviour in an isolated sandbox",
    },
];

pub static FAKE_NEWS_PHASES: &[PhaseDefinition] = &[
    PhaseDefinition {
        name: "Source Verification",
        description: "Check the publisher against credibility lists",
    },
    PhaseDefinition {
        name: "Claim Extraction",
        description: "Pull factual claims out of the article",
    },
    PhaseDefinition {
        name: "Fact Checking",
        description: "Cross-reference claims with fact-check databases",
    },
    PhaseDefinition {
        name: "Sentiment & Bias Analysis",
        description: "Measure sensational language and bias",
    },
    PhaseDefinition {
        name: "Propagation Tracking",
        description: "Estimate how widely the story has spread",
    },
];
