//! Error types for the syntax boundary

/// Errors while turning source text into a [`CompilationUnit`](crate::CompilationUnit)
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyntaxError {
    /// Grammar could not be loaded into the parser
    #[error("parser initialization failed: {0}")]
    ParserInit(String),

    /// Parser produced no tree (cancelled or timed out)
    #[error("parse failed")]
    ParseFailed,

    /// Edit offset lies outside the text or not on a char boundary
    #[error("edit offset {offset} is invalid for text of length {len}")]
    InvalidEdit { offset: usize, len: usize },
}
