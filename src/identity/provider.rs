//! Sources of the external identity attached to a request.

use std::fmt::Debug;

use axum::http::{HeaderMap, HeaderName, header::COOKIE};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key, SameSite},
};
use sha2::{Digest, Sha512};
use time::{Duration, OffsetDateTime};

use crate::{identity::SessionToken, user::ExternalId};

/// The name of the private cookie holding the [SessionToken].
pub const SESSION_COOKIE: &str = "session";

/// Resolves the external identity of the person making a request.
///
/// Implementations must not have side effects: they only read the request.
pub trait IdentityProvider: Debug + Send + Sync {
    /// The external identity attached to a request with `headers`, or `None`
    /// if there is no valid session.
    fn resolve_current_identity(&self, headers: &HeaderMap) -> Option<ExternalId>;

    /// Header names whose values must not be logged.
    fn secret_headers(&self) -> Vec<HeaderName> {
        Vec::new()
    }
}

/// Reads the identity from a private (encrypted and signed) session cookie.
///
/// The identity provider and this server share the secret the cookie key is
/// derived from.
#[derive(Clone)]
pub struct CookieIdentityProvider {
    key: Key,
}

impl CookieIdentityProvider {
    /// Create a provider with a cookie key derived from `secret`.
    pub fn new(secret: &str) -> Self {
        Self {
            key: create_cookie_key(secret),
        }
    }

    /// The key used to decrypt session cookies.
    pub fn key(&self) -> &Key {
        &self.key
    }
}

impl Debug for CookieIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieIdentityProvider")
            .finish_non_exhaustive()
    }
}

impl IdentityProvider for CookieIdentityProvider {
    fn resolve_current_identity(&self, headers: &HeaderMap) -> Option<ExternalId> {
        let jar = PrivateCookieJar::from_headers(headers, self.key.clone());
        let cookie = jar.get(SESSION_COOKIE)?;

        let token: SessionToken = match serde_json::from_str(cookie.value_trimmed()) {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!("Could not parse session token: {error}");
                return None;
            }
        };

        if token.is_valid_at(OffsetDateTime::now_utc()) {
            Some(token.external_id)
        } else {
            tracing::debug!("Session for {} has expired", token.external_id);
            None
        }
    }

    fn secret_headers(&self) -> Vec<HeaderName> {
        vec![COOKIE]
    }
}

/// Trusts an identity header set by an authenticating reverse proxy.
#[derive(Debug, Clone)]
pub struct HeaderIdentityProvider {
    header: HeaderName,
}

impl HeaderIdentityProvider {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl IdentityProvider for HeaderIdentityProvider {
    fn resolve_current_identity(&self, headers: &HeaderMap) -> Option<ExternalId> {
        let value = headers.get(&self.header)?.to_str().ok()?.trim();

        if value.is_empty() {
            None
        } else {
            Some(ExternalId::new(value))
        }
    }

    fn secret_headers(&self) -> Vec<HeaderName> {
        vec![self.header.clone()]
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

/// Add a session cookie for `external_id` to `jar` that expires after `duration`.
///
/// This is the cookie an identity provider sharing the server secret issues.
///
/// # Errors
///
/// Returns an error if the session token cannot be serialized.
pub fn issue_session_cookie(
    jar: PrivateCookieJar,
    external_id: ExternalId,
    duration: Duration,
) -> Result<PrivateCookieJar, serde_json::Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let token = serde_json::to_string(&SessionToken {
        external_id,
        expires_at,
    })?;

    Ok(jar.add(
        Cookie::build((SESSION_COOKIE, token))
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}
