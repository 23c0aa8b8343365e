//! Value objects - enumerations and named capabilities

pub mod permissions;
mod role;
mod status;

pub use role::Role;
pub use status::{AuthProvider, FileStatus, UserStatus};
