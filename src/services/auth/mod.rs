pub mod errors;
pub mod issuer;
pub mod refresher;
pub mod revocation;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub use errors::AuthError;
pub use issuer::{CredentialIssuer, TokenPair};
pub use refresher::{CredentialRefresher, RenewedAccess};
pub use revocation::SessionRevoker;

/// Lowercase hex SHA-256 of a refresh token, as stored on its session.
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub(crate) fn refresh_token_matches(token: &str, stored_hash: &str) -> bool {
    let presented = hash_refresh_token(token);
    presented.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

pub(crate) fn timestamp_to_utc(secs: i64) -> Result<DateTime<Utc>, AuthError> {
    DateTime::from_timestamp(secs, 0).ok_or(AuthError::Encoding)
}
