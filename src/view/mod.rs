pub mod filter;
pub mod selection;

pub use filter::ResultFilter;
pub use selection::Selection;
