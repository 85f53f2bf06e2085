//! News domain models

mod article;
mod query;

pub use article::*;
pub use query::*;
