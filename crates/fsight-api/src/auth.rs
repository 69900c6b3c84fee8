//! Authenticated user extraction.
//!
//! Session management lives in the hosted platform; its authenticating
//! proxy injects the verified user ID as a request header before traffic
//! reaches this service. The extractor only enforces that the header is
//! present.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// Header carrying the platform-verified user identity.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let uid = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing user identity"))?;

        Ok(AuthUser {
            uid: uid.to_string(),
        })
    }
}
