pub mod issue;
pub mod document;

pub use issue::*;
pub use document::*;
