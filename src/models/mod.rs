pub mod record;
pub mod session;
pub mod tool;

pub use record::*;
pub use session::*;
pub use tool::*;
