use std::fmt::Debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// One analysed input item (an email, a URL, a phone number, a file...).
///
/// Records are produced once by a tool's synthesizer and never mutated
/// afterwards. The trait exposes just enough shape for the generic session,
/// filter and export layers to work across tools.
pub trait AnalysisRecord: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Every risk bucket label this record type can carry, lowest risk first.
    const BUCKETS: &'static [&'static str];

    fn id(&self) -> &str;

    /// Numeric risk score, 0-100.
    fn risk_score(&self) -> u8;

    /// Categorical bucket derived from the score. Always one of `BUCKETS`.
    fn risk_label(&self) -> &'static str;

    /// Secondary classification used by the category filter, if the tool has one.
    fn category(&self) -> Option<&str> {
        None
    }

    /// String fields searched by the free-text filter.
    fn search_fields(&self) -> Vec<&str>;

    fn csv_header() -> &'static [&'static str];

    fn csv_row(&self) -> Vec<String>;
}
