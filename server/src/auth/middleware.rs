use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::auth::jwt;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Where browsers are sent when they have no valid session.
pub const LOGIN_PATH: &str = "/login";

/// Claims signed into the session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// User ID (UUIDv7)
    pub sub: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Verified identity of the acting user, extracted from the `token` cookie.
///
/// A missing, malformed, badly signed, or expired token is a navigation
/// outcome: the request is redirected to the login page.
#[derive(Debug, Clone)]
pub struct Session(pub SessionClaims);

impl Session {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the signing key from request extensions (set by middleware layer)
        let key = parts
            .extensions
            .get::<SessionKey>()
            .ok_or_else(|| StatusCode::INTERNAL_SERVER_ERROR.into_response())?;

        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Redirect::to(LOGIN_PATH).into_response())?;

        match jwt::validate_session_token(&key.0, &token) {
            Ok(claims) => Ok(Session(claims)),
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                Err(Redirect::to(LOGIN_PATH).into_response())
            }
        }
    }
}

/// Session signing key stored in request extensions for the Session extractor
#[derive(Clone)]
pub struct SessionKey(pub Vec<u8>);
