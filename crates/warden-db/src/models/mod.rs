//! Database models - SQLx-compatible structs for PostgreSQL tables

mod file;
mod refresh_token;
mod user;

pub use file::{FileModel, UploadSignatureModel};
pub use refresh_token::RefreshTokenModel;
pub use user::{ProfileModel, UserModel};
