//! Refresh token entity <-> model mapper

use warden_core::entities::RefreshToken;

use crate::models::RefreshTokenModel;

impl From<RefreshTokenModel> for RefreshToken {
    fn from(model: RefreshTokenModel) -> Self {
        RefreshToken {
            id: model.id,
            user_id: model.user_id,
            user_email: model.user_email,
            token: model.token,
            ip_address: model.ip_address,
            user_agent: model.user_agent,
            created_at: model.created_at,
            last_used_at: model.last_used_at,
            expires_at: model.expires_at,
            is_revoked: model.is_revoked,
            revoked_reason: model.revoked_reason,
        }
    }
}
