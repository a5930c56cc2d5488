use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use storage::models::Actor;

use crate::error::WebError;

pub const ACTOR_HEADER: &str = "x-actor";

/// The user recorded as `modified_by`, taken from the `X-Actor` header.
/// Mutating endpoints refuse requests that do not name one.
#[derive(Debug, Clone)]
pub struct ActingUser(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| WebError::BadRequest("X-Actor header is required".to_string()))?;

        Ok(Self(Actor::new(name)))
    }
}
