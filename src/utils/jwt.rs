use std::{collections::HashSet, env};

use crate::routes::auth::claims::Claims;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use thiserror::Error;

/// Minimum acceptable size for the JWT secret in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected for the JWT secret to avoid trivially guessable values.
const MIN_UNIQUE_JWT_BYTES: usize = 8;

#[derive(Debug, Error)]
pub enum JwtSecretError {
    #[error("JWT_SECRET must be set")]
    Missing,
    #[error("JWT_SECRET must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort { actual: usize, required: usize },
    #[error(
        "JWT_SECRET must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy { actual: usize, required: usize },
}

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token could not be encoded")]
    Encoding,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            // Structure, encoding, algorithm, issuer and audience problems all
            // mean the string is not one of our tokens.
            _ => TokenError::Malformed,
        }
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn from_env() -> Result<Self, JwtSecretError> {
        let value = env::var("JWT_SECRET").map_err(|_| JwtSecretError::Missing)?;
        Self::from_secret(value)
    }

    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, JwtSecretError> {
        let bytes = secret.as_ref();
        validate_secret(bytes)?;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

fn validate_secret(secret: &[u8]) -> Result<(), JwtSecretError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(JwtSecretError::TooShort {
            actual: secret.len(),
            required: MIN_JWT_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_JWT_BYTES {
        return Err(JwtSecretError::LowEntropy {
            actual: unique,
            required: MIN_UNIQUE_JWT_BYTES,
        });
    }

    Ok(())
}

/// Anything that can sign and verify claims. The issuer, refresher and gate
/// only ever see this trait.
pub trait TokenMaker: Send + Sync {
    fn encode(&self, claims: &Claims) -> Result<String, TokenError>;
    fn decode(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 token maker. Holds only read-only key material, so one instance is
/// shared by every request without locking.
#[derive(Debug, Clone)]
pub struct JwtMaker {
    keys: JwtKeys,
    issuer: String,
    audience: String,
}

impl JwtMaker {
    pub fn new(keys: JwtKeys, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.required_spec_claims =
            HashSet::from(["exp".to_string(), "iss".to_string(), "aud".to_string()]);
        validation
    }
}

impl TokenMaker for JwtMaker {
    /// `iss` and `aud` are overwritten with this maker's values.
    fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let mut claims = claims.clone();
        claims.iss = self.issuer.clone();
        claims.aud = self.audience.clone();
        encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding_key())
            .map_err(|_| TokenError::Encoding)
    }

    fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, self.keys.decoding_key(), &self.validation())?;

        // jsonwebtoken only rejects `exp < now`; a token is already dead at `exp`.
        if data.claims.expires_at <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
