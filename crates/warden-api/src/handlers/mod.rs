//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod files;
pub mod health;
pub mod oauth;
