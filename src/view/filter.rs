use serde::Deserialize;
use crate::models::AnalysisRecord;

/// Conjunctive predicates over a result list. An unset field, an empty
/// string or `"all"` means "don't filter on this".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultFilter {
    pub risk: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "q")]
    pub search: Option<String>,
}

impl ResultFilter {
    pub fn risk(mut self, risk: impl Into<String>) -> Self {
        self.risk = Some(risk.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        active(&self.risk).is_none() && active(&self.category).is_none() && active(&self.search).is_none()
    }

    pub fn matches<R: AnalysisRecord>(&self, record: &R) -> bool {
        if let Some(risk) = active(&self.risk) {
            if !record.risk_label().eq_ignore_ascii_case(risk) {
                return false;
            }
        }
        if let Some(category) = active(&self.category) {
            match record.category() {
                Some(c) if c.eq_ignore_ascii_case(category) => {}
                _ => return false,
            }
        }
        if let Some(search) = active(&self.search) {
            let needle = search.to_lowercase();
            if !record.search_fields().iter().any(|f| f.to_lowercase().contains(&needle)) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a, R: AnalysisRecord>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}
