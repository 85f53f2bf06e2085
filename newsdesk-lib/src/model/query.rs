//! News search parameters

use crate::error::QueryError;

/// Smallest article count the API accepts.
pub const MIN_ARTICLES: u32 = 1;

/// Largest article count the API accepts.
pub const MAX_ARTICLES: u32 = 20;

/// Article count used when the caller does not choose one.
pub const DEFAULT_ARTICLES: u32 = 5;

/// Parameters for one news search.
///
/// # Example
///
/// ```
/// use newsdesk_lib::model::NewsQuery;
///
/// let query = NewsQuery::new("AAPL", 10).unwrap();
/// assert_eq!(query.num_articles(), 10);
///
/// assert!(NewsQuery::new("  ", 5).is_err());
/// assert!(NewsQuery::new("AAPL", 21).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    stock: String,
    num_articles: u32,
}

impl NewsQuery {
    /// Creates a validated query.
    pub fn new(stock: impl Into<String>, num_articles: u32) -> Result<Self, QueryError> {
        let stock = stock.into();
        if stock.trim().is_empty() {
            return Err(QueryError::EmptyStock);
        }
        if !(MIN_ARTICLES..=MAX_ARTICLES).contains(&num_articles) {
            return Err(QueryError::ArticleCount {
                requested: num_articles,
                min: MIN_ARTICLES,
                max: MAX_ARTICLES,
            });
        }
        Ok(Self {
            stock,
            num_articles,
        })
    }

    /// Creates a query for the default number of articles.
    pub fn for_stock(stock: impl Into<String>) -> Result<Self, QueryError> {
        Self::new(stock, DEFAULT_ARTICLES)
    }

    /// The stock name or symbol being searched.
    pub fn stock(&self) -> &str {
        &self.stock
    }

    /// How many summarised articles to ask for.
    pub fn num_articles(&self) -> u32 {
        self.num_articles
    }
}
