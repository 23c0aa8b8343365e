//! Ports implemented by the infrastructure crates

mod repositories;
mod signer;

pub use repositories::{CredentialStore, FileRepository, RepoResult, TokenStore};
pub use signer::UploadSigner;
