//! Business logic services
//!
//! Session resolution, authorization and the auth and file use cases. Each
//! service borrows the shared [`ServiceContext`].

pub mod auth;
pub mod context;
pub mod error;
pub mod files;
pub mod gate;
pub mod identity;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export all services for convenience
pub use auth::{generate_oauth_state, parse_provider, verify_oauth_state, AuthService, ClientInfo};
pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use error::{ServiceError, ServiceResult};
pub use files::{normalize_category, object_key, sanitize_filename, unique_filename, FileService};
pub use gate::{required_permission, route_key, SecurityGate, PERMISSIONS_GROUP, ROUTE_PERMISSIONS};
pub use identity::IdentityAggregator;
pub use session::{AuthIdentity, AuthMode, RejectReason, Resolution, SessionResolver};
