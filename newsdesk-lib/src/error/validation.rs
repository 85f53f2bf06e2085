//! Query validation error types

/// Reasons a news query is rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The stock name was empty or whitespace.
    #[error("Stock name is required")]
    EmptyStock,

    /// The requested article count is outside the range the API accepts.
    #[error("Number of articles must be between {min} and {max}, got {requested}")]
    ArticleCount { requested: u32, min: u32, max: u32 },
}
