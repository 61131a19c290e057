//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use condovote_common::AppError;
use condovote_core::{Actor, ClientInfo};
use condovote_db::entities::profile;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub profile::Model);

impl AuthUser {
    /// The actor for service calls. Role and scope come from the stored profile.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::from(&self.0)
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<profile::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Request metadata recorded alongside votes and audit entries.
#[derive(Debug, Clone, Default)]
pub struct Client(pub ClientInfo);

impl<S> FromRequestParts<S> for Client
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_info(&parts.headers)))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Client IP from `X-Forwarded-For` (first hop) or `X-Real-IP`, plus the user agent.
fn client_info(headers: &HeaderMap) -> ClientInfo {
    let forwarded = header_value(headers, "x-forwarded-for").and_then(|v| {
        v.split(',')
            .next()
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
            .map(ToString::to_string)
    });

    ClientInfo {
        ip: forwarded.or_else(|| header_value(headers, "x-real-ip")),
        user_agent: header_value(headers, "user-agent"),
    }
}
