use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::errors::CiphertraceError;
use crate::export::format_text_report;
use crate::input::extract::{parse_article, split_blocks, ParsedArticle};
use crate::input::ScanInput;
use crate::models::{AnalysisRecord, ScanSession, ToolKind};
use crate::pipeline::phase::{PhaseDefinition, FAKE_NEWS_PHASES};
use crate::synth::{self, ReasonTable, Thresholds};
use super::{contains_any, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsVerdict {
    Credible,
    Questionable,
    Misleading,
    Fake,
}

impl NewsVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credible => "credible",
            Self::Questionable => "questionable",
            Self::Misleading => "misleading",
            Self::Fake => "fake",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    Politics,
    Health,
    Science,
    Finance,
    Technology,
    Entertainment,
}

impl NewsCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Politics => "politics",
            Self::Health => "health",
            Self::Science => "science",
            Self::Finance => "finance",
            Self::Technology => "technology",
            Self::Entertainment => "entertainment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheck {
    pub claim: String,
    pub verdict: String,
    pub checker: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReputation {
    pub outlet: String,
    pub known_outlet: bool,
    /// 0-100, higher is more reliable.
    pub reliability: u8,
    pub bias: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsAnalysis {
    pub id: String,
    pub headline: String,
    pub source: SourceReputation,
    /// Misinformation likelihood, 0-100.
    pub risk_score: u8,
    pub credibility_score: u8,
    pub verdict: NewsVerdict,
    pub category: NewsCategory,
    pub sentiment: String,
    pub fact_checks: Vec<FactCheck>,
    pub red_flags: Vec<String>,
}

impl AnalysisRecord for NewsAnalysis {
    const BUCKETS: &'static [&'static str] = &["credible", "questionable", "misleading", "fake"];

    fn id(&self) -> &str {
        &self.id
    }

    fn risk_score(&self) -> u8 {
        self.risk_score
    }

    fn risk_label(&self) -> &'static str {
        self.verdict.as_str()
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.id.as_str(), self.headline.as_str(), self.source.outlet.as_str()]
    }

    fn csv_header() -> &'static [&'static str] {
        &["id", "headline", "source", "verdict", "risk_score", "credibility_score", "category", "sentiment", "red_flags"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.headline.clone(),
            self.source.outlet.clone(),
            self.verdict.as_str().to_string(),
            self.risk_score.to_string(),
            self.credibility_score.to_string(),
            self.category.as_str().to_string(),
            self.sentiment.clone(),
            self.red_flags.join("; "),
        ]
    }
}

const LEVELS: Thresholds<NewsVerdict> = &[
    (80, NewsVerdict::Fake),
    (55, NewsVerdict::Misleading),
    (30, NewsVerdict::Questionable),
];

const RED_FLAGS: ReasonTable = &[
    (30, "Claims are not attributed to named sources"),
    (45, "Headline is emotionally charged"),
    (55, "Key claims contradict published fact checks"),
    (80, "Story originates from a known fabrication network"),
];

const SENSATIONAL_MARKERS: &[&str] = &[
    "shocking", "miracle", "you won't believe", "they don't want you", "exposed", "secret", "!!",
];

const CATEGORY_KEYWORDS: &[(NewsCategory, &[&str])] = &[
    (NewsCategory::Health, &["vaccine", "cure", "doctor", "virus", "diet", "cancer"]),
    (NewsCategory::Politics, &["election", "senator", "president", "vote", "congress", "minister"]),
    (NewsCategory::Finance, &["stock", "market", "bitcoin", "crypto", "bank", "inflation"]),
    (NewsCategory::Technology, &["ai", "smartphone", "hack", "software", "5g"]),
    (NewsCategory::Science, &["nasa", "study", "climate", "scientists", "research"]),
    (NewsCategory::Entertainment, &["celebrity", "movie", "singer", "hollywood", "award"]),
];

const ALL_CATEGORIES: &[NewsCategory] = &[
    NewsCategory::Politics,
    NewsCategory::Health,
    NewsCategory::Science,
    NewsCategory::Finance,
    NewsCategory::Technology,
    NewsCategory::Entertainment,
];

const CHECKERS: &[&str] = &["Snopes", "PolitiFact", "AFP Fact Check", "Reuters Fact Check", "FactCheck.org"];
const BIASES: &[&str] = &["left", "lean left", "center", "lean right", "right"];
const SENTIMENTS: &[&str] = &["neutral", "positive", "negative", "alarmist", "outraged"];

/// Rates pasted news articles for misinformation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeNewsTracker;

impl Tool for FakeNewsTracker {
    type Item = ParsedArticle;
    type Record = NewsAnalysis;

    fn kind(&self) -> ToolKind {
        ToolKind::FakeNewsTracker
    }

    fn phases(&self) -> &'static [PhaseDefinition] {
        FAKE_NEWS_PHASES
    }

    fn collect(&self, input: &ScanInput) -> Result<Vec<ParsedArticle>, CiphertraceError> {
        let text = input.require_text()?;
        let articles: Vec<ParsedArticle> = split_blocks(text)
            .iter()
            .map(|b| parse_article(b))
            .filter(|a| !a.headline.is_empty())
            .collect();
        if articles.is_empty() {
            return Err(CiphertraceError::EmptyInput("No articles found in the pasted text".into()));
        }
        Ok(articles)
    }

    fn synthesize<G: Rng + ?Sized>(&self, index: usize, article: &ParsedArticle, rng: &mut G) -> NewsAnalysis {
        let full_text = format!("{}\n{}", article.headline, article.body);
        let sensational = contains_any(&full_text, SENSATIONAL_MARKERS) || article.source.is_none();

        let score = synth::biased_score(rng, sensational);
        let verdict = synth::bucket(score, LEVELS, NewsVerdict::Credible);
        let category = classify(&full_text).unwrap_or_else(|| synth::pick(rng, ALL_CATEGORIES));

        let fact_checks = if score >= 55 {
            (0..rng.gen_range(1..=2))
                .map(|_| FactCheck {
                    claim: article.headline.clone(),
                    verdict: if score >= 80 { "False".into() } else { "Missing context".into() },
                    checker: synth::pick(rng, CHECKERS).to_string(),
                })
                .collect()
        } else {
            Vec::new()
        };

        NewsAnalysis {
            id: synth::record_id("NEWS", index),
            headline: article.headline.clone(),
            source: SourceReputation {
                outlet: article.source.clone().unwrap_or_else(|| "unattributed".to_string()),
                known_outlet: article.source.is_some() && score < 55,
                reliability: 100 - score.min(100),
                bias: synth::pick(rng, BIASES).to_string(),
            },
            risk_score: score,
            credibility_score: 100 - score,
            verdict,
            category,
            sentiment: synth::pick(rng, SENTIMENTS).to_string(),
            fact_checks,
            red_flags: synth::reasons_for(score, RED_FLAGS),
        }
    }

    fn text_report(&self, session: &ScanSession<NewsAnalysis>) -> Option<String> {
        Some(format_text_report(session, "Fake News Analysis Report", |news| {
            let mut lines = vec![
                format!("Headline:    {}", news.headline),
                format!("Source:      {} (reliability {}/100, bias {})", news.source.outlet, news.source.reliability, news.source.bias),
                format!("Category:    {}", news.category.as_str()),
                format!("Credibility: {}/100", news.credibility_score),
                format!("Sentiment:   {}", news.sentiment),
            ];
            for check in &news.fact_checks {
                lines.push(format!("Fact check:  {} rated \"{}\"", check.checker, check.verdict));
            }
            for flag in &news.red_flags {
                lines.push(format!("Red flag:    {}", flag));
            }
            lines
        }))
    }
}

/// First category with a keyword present as a whole word.
fn classify(text: &str) -> Option<NewsCategory> {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()).collect();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| words.contains(k)))
        .map(|(category, _)| *category)
}
