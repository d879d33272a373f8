pub mod types;
pub mod classification;

pub use types::CiphertraceError;
pub use classification::{ErrorClassification, Notice, NoticeVariant};
