//! # warden-db
//!
//! Store implementations for the traits defined in `warden-core`.
//!
//! - PostgreSQL via SQLx: connection pool, embedded migrations, row models,
//!   row to entity mappers, and the `Pg*` stores
//! - In-memory stores under [`memory`] with the same semantics
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_db::{create_pool, run_migrations, DatabaseConfig, PgCredentialStore};
//!
//! let pool = create_pool(&DatabaseConfig::from(&config.database)).await?;
//! run_migrations(&pool).await?;
//! let credentials = PgCredentialStore::new(pool.clone());
//! ```

mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{MemoryCredentialStore, MemoryFileRepository, MemoryTokenStore};
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool, SCHEMA};
pub use repositories::{PgCredentialStore, PgFileRepository, PgTokenStore};
