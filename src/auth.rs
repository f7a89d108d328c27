use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::ApiError, models::Role};

/// How long an issued token stays valid.
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

/// TokenPayload
///
/// The identity a bearer token asserts. Signed and time-bounded, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

/// Claims
///
/// The JWT body: the payload plus the standard issued-at and expiry timestamps
/// (seconds since the Unix epoch).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub payload: TokenPayload,
    pub iat: i64,
    pub exp: i64,
}

/// TokenCodec
///
/// Signs and verifies HS256 bearer tokens with a single secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    validity: Duration,
}

/// Shared handle to the codec inside the application state.
pub type TokenState = Arc<TokenCodec>;

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // A token is dead the second its window closes.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            validity: Duration::days(TOKEN_VALIDITY_DAYS),
        }
    }

    /// Signs `payload` with a validity window starting now.
    pub fn issue(&self, payload: &TokenPayload) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(payload, Utc::now())
    }

    /// Signs `payload` with a validity window starting at `issued_at`.
    pub fn issue_at(
        &self,
        payload: &TokenPayload,
        issued_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            payload: payload.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.validity).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// verify
    ///
    /// Returns the payload when the signature matches and the token is unexpired.
    /// Malformed, tampered and expired tokens all come back as `None`.
    pub fn verify(&self, token: &str) -> Option<TokenPayload> {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims.payload),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                    kind => tracing::debug!(?kind, "rejected invalid token"),
                }
                None
            }
        }
    }
}

/// AuthUser
///
/// The verified identity behind a request. Handlers take it as an argument and
/// then check the role they need with `require` or `require_any`.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        self.require_any(&[role])
    }

    /// Rejects with 403 unless the caller's role is in `allowed`.
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            tracing::debug!(user_id = self.id, role = %self.role, "role not allowed");
            Err(ApiError::Forbidden)
        }
    }
}

impl From<TokenPayload> for AuthUser {
    fn from(payload: TokenPayload) -> Self {
        Self {
            id: payload.id,
            email: payload.email,
            role: payload.role,
        }
    }
}

/// AuthUser Extractor Implementation
///
/// 1. No `Authorization` header: 401.
/// 2. Header present but not `Bearer <token>`, or the token fails to verify: 403.
/// 3. Otherwise the decoded identity.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let codec = TokenState::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(ApiError::MissingCredentials)?;

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Forbidden)?;

        codec
            .verify(token)
            .map(AuthUser::from)
            .ok_or(ApiError::Forbidden)
    }
}
