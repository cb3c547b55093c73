pub mod author;
pub mod book;
pub mod language;
pub mod stats;

pub use author::*;
pub use book::*;
pub use language::Language;
pub use stats::*;
