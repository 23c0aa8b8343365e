//! Entity to model mappers
//!
//! Conversions from database rows to domain entities (warden-core).
//! Rows with text-encoded enums use `TryFrom` so a corrupt value surfaces
//! as a database error instead of a panic.

mod file;
mod refresh_token;
mod user;
