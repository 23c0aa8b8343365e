//! HMAC upload signer
//!
//! Presigned URLs carry `X-Content-Type`, `X-Expires` and an `X-Signature`
//! query parameter: the hex HMAC-SHA256 of `PUT\n{key}\n{content_type}\n{expires}`.
//! The storage gateway recomputes it with the shared secret.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;
use warden_common::StorageConfig;
use warden_core::entities::PresignedUpload;
use warden_core::traits::UploadSigner;
use warden_core::DomainError;

type HmacSha256 = Hmac<Sha256>;

/// Signs object-store PUTs with a shared secret
pub struct HmacUploadSigner {
    upload_base_url: String,
    public_base_url: String,
    secret: Vec<u8>,
}

impl HmacUploadSigner {
    /// # Errors
    /// `SigningError` when the secret is empty or the upload base is not a URL
    pub fn new(
        upload_base_url: &str,
        public_base_url: &str,
        secret: impl Into<Vec<u8>>,
    ) -> Result<Self, DomainError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(DomainError::SigningError("signing secret is empty".to_string()));
        }
        Url::parse(upload_base_url)
            .map_err(|e| DomainError::SigningError(format!("invalid upload base URL: {e}")))?;

        Ok(Self {
            upload_base_url: upload_base_url.trim_end_matches('/').to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            secret,
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, DomainError> {
        Self::new(
            &config.upload_base_url,
            &config.public_base_url,
            config.signing_secret.as_bytes(),
        )
    }

    fn mac(&self, object_key: &str, content_type: &str, expires: i64) -> Result<HmacSha256, DomainError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| DomainError::SigningError(format!("HMAC initialization failed: {e}")))?;
        mac.update(format!("PUT\n{object_key}\n{content_type}\n{expires}").as_bytes());
        Ok(mac)
    }

    /// Check a signature produced by [`UploadSigner::sign`]. Expired
    /// signatures never verify.
    pub fn verify(&self, object_key: &str, content_type: &str, expires: i64, signature: &str) -> bool {
        if expires <= Utc::now().timestamp() {
            return false;
        }
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        self.mac(object_key, content_type, expires)
            .is_ok_and(|mac| mac.verify_slice(&expected).is_ok())
    }
}

impl UploadSigner for HmacUploadSigner {
    fn sign(
        &self,
        object_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<PresignedUpload, DomainError> {
        let expires_at = Utc::now() + expires_in;
        let expires = expires_at.timestamp();
        let signature = hex::encode(
            self.mac(object_key, content_type, expires)?
                .finalize()
                .into_bytes(),
        );

        let mut presigned = Url::parse(&format!("{}/{object_key}", self.upload_base_url))
            .map_err(|e| DomainError::SigningError(format!("invalid object key: {e}")))?;
        presigned
            .query_pairs_mut()
            .append_pair("X-Content-Type", content_type)
            .append_pair("X-Expires", &expires.to_string())
            .append_pair("X-Signature", &signature);

        Ok(PresignedUpload {
            presigned_url: presigned.into(),
            upload_url: format!("{}/{object_key}", self.public_base_url),
            object_key: object_key.to_string(),
            expires_at,
        })
    }
}
