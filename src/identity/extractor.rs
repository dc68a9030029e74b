//! Request extractors that gate handlers on a resolved identity.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    identity::IdentityProvider,
    user::{ExternalId, User, get_user_by_external_id},
};

/// The state needed to resolve the user behind a request.
#[derive(Debug, Clone)]
pub struct IdentityState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where the external identity comes from.
    pub identity_provider: Arc<dyn IdentityProvider>,
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            identity_provider: state.identity_provider.clone(),
        }
    }
}

/// Map an external identity to the internal user.
///
/// # Errors
/// Returns a:
/// - [Error::Unauthenticated] if `identity` is `None`,
/// - [Error::UserNotProvisioned] if no user has been provisioned for the identity,
/// - or [Error::StorageFailure] if the user could not be read.
pub fn resolve_user(identity: Option<ExternalId>, connection: &Connection) -> Result<User, Error> {
    let external_id = identity.ok_or(Error::Unauthenticated)?;

    get_user_by_external_id(&external_id, connection)
}

/// The external identity of the requester, whether or not a user exists for it.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentIdentity(pub ExternalId);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    IdentityState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = IdentityState::from_ref(state);

        state
            .identity_provider
            .resolve_current_identity(&parts.headers)
            .map(CurrentIdentity)
            .ok_or(Error::Unauthenticated)
    }
}

/// The provisioned user making the request.
///
/// Handlers taking this extractor never run for unauthenticated or
/// unprovisioned requests; the rejection is the structured failure for
/// [Error::Unauthenticated] or [Error::UserNotProvisioned].
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    IdentityState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = IdentityState::from_ref(state);
        let identity = state
            .identity_provider
            .resolve_current_identity(&parts.headers);

        let connection = lock_connection(&state.db_connection)?;

        resolve_user(identity, &connection).map(CurrentUser)
    }
}
