//! PostgreSQL store implementations

mod credential;
mod error;
mod file;
mod token;

pub use credential::PgCredentialStore;
pub use error::{map_db_error, map_unique_violation};
pub use file::PgFileRepository;
pub use token::PgTokenStore;
