//! Summarised news article

use serde::Deserialize;
use serde::Serialize;

/// A single summarised article as returned by the news API.
///
/// Field names match the API's JSON body, so the same type is used for the
/// wire format and for cached payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Headline.
    pub title: String,
    /// Machine-generated summary of the article body.
    pub summary: String,
    /// Link to the original article.
    pub url: String,
    /// Lead image, if the upstream feed provided one.
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Article {
    /// Creates an article without an image.
    pub fn new(title: impl Into<String>, summary: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            url: url.into(),
            image_url: None,
        }
    }

    /// Sets the image URL.
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }
}
