//! Request extractors for the depot Web API.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// Name of the session header carried on authenticated calls.
pub const SESSION_TOKEN_HEADER: &str = "x-token";

/// Extractor for the opaque session token.
///
/// Never rejects: the token is handed to the service layer as-is, which
/// owns the decision between anonymous access and `Unauthorized`.
#[derive(Debug, Clone)]
pub struct SessionToken(pub Option<String>);

impl SessionToken {
    /// Borrow the token, if one was sent.
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let token = parts
            .headers
            .get(SESSION_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        Box::pin(async move { Ok(SessionToken(token)) })
    }
}
