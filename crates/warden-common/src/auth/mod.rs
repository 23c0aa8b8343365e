//! Authentication utilities

mod jwt;
mod password;

pub use jwt::{Claims, TokenClaims, TokenCodec, TokenError, TOKEN_ISSUER};
pub use password::{hash_password, verify_password};
