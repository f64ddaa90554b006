//! Region location over OCR recognition trees.

pub mod document;
pub mod locate;
pub mod pattern;

pub use document::{BBox, Block, Children, Document, Level, Line, Node, Paragraph, Symbol, Word};
pub use locate::{locate, Region, RegionSource};
pub use pattern::Pattern;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unsupported pattern flag: {0}")]
    InvalidFlag(char),
}
