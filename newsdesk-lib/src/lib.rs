//! Newsdesk client library
//!
//! A cache-first fetch orchestrator for a stock news API: results are served
//! from a local cache while fresh, fetched at most once per key otherwise,
//! and every outcome is reported to a notification sink.

pub mod auth;
pub mod cache;
pub mod clock;
pub mod error;
pub mod model;
pub mod notify;
pub mod outcome;
pub mod source;

mod http;
mod orchestrator;

pub use http::DEFAULT_BASE_URL;
pub use http::SESSION_COOKIE;
pub use orchestrator::*;
pub use outcome::FetchFailure;
pub use outcome::Outcome;
