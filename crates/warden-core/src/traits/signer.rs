//! Upload signing port

use chrono::Duration;

use crate::entities::PresignedUpload;
use crate::error::DomainError;

/// Issues time-limited upload URLs for an object store
pub trait UploadSigner: Send + Sync {
    /// Sign a PUT of `content_type` to `object_key`, valid for `expires_in`
    fn sign(
        &self,
        object_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<PresignedUpload, DomainError>;
}
