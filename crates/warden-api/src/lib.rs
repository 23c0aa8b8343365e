//! # warden-api
//!
//! HTTP surface built with Axum: cookie sessions, the permission gate,
//! provider sign-in and the file upload endpoints.

pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod oauth;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use server::{create_app, create_app_state, create_memory_app_state, run, MemoryStores};
pub use state::AppState;
