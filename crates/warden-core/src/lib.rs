//! # warden-core
//!
//! Domain layer containing identities, refresh tokens, file records, value objects,
//! and the store traits the service layer consumes.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    FileRecord, Identity, LoginView, NewFileRecord, NewRefreshToken, NewUploadSignature, PresignedUpload,
    Profile, ProviderProfile, RefreshToken, UploadSignature, UserView,
};
pub use error::DomainError;
pub use traits::{CredentialStore, FileRepository, RepoResult, TokenStore, UploadSigner};
pub use value_objects::{permissions, AuthProvider, FileStatus, Role, UserStatus};
