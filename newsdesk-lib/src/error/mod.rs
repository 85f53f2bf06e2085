//! Error types

mod api;
mod auth;
mod codec;
mod source;
mod validation;

pub use api::*;
pub use auth::*;
pub use codec::*;
pub use source::*;
pub use validation::*;
