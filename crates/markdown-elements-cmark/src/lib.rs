pub mod error;
pub mod markdown;
pub mod strip_indent;
pub mod tokenize;

// Re-export key types for easier usage
pub use error::MarkdownError;
pub use markdown::{Extension, Markdown, MarkdownBuilder, Preset};
pub use strip_indent::strip_indent;
pub use tokenize::tokenize;

pub use pulldown_cmark::Options;
