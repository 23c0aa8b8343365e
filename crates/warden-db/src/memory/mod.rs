//! In-memory store implementations
//!
//! Behave like the PostgreSQL stores (uniqueness, revocation, soft delete)
//! without a database. Used by tests and by local runs without Postgres.

mod credential;
mod file;
mod token;

pub use credential::MemoryCredentialStore;
pub use file::MemoryFileRepository;
pub use token::MemoryTokenStore;
