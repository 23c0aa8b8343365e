//! Integration test utilities for the warden server
//!
//! This crate spawns the full HTTP application over in-memory stores and
//! drives it with a real HTTP client.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
