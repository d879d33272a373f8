pub mod history;
pub mod schema;
pub mod store;

pub use history::SessionHistory;
pub use store::SessionStore;
