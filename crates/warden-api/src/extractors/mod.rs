//! Axum extractors for request handling
//!
//! Custom extractors for the session identity, client metadata, and validation.

mod auth;
mod client;
mod validated;

pub use auth::CurrentUser;
pub use client::ClientMeta;
pub use validated::ValidatedJson;
