//! # warden-service
//!
//! Application layer: session resolution, the permission gate, login view
//! assembly, and the auth and file use cases.

pub mod dto;
pub mod services;
pub mod signer;

pub use services::{
    AuthIdentity, AuthMode, AuthService, ClientInfo, FileService, IdentityAggregator,
    RejectReason, Resolution, SecurityGate, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, ServiceSettings, SessionResolver,
};
pub use signer::HmacUploadSigner;
