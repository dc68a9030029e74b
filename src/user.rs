//! Code for creating the user table and mapping external identities to users.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error, db::lock_connection, identity::CurrentIdentity, response::success,
};

/// The state needed to provision users.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl rusqlite::ToSql for UserID {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

/// The opaque identifier an external identity provider uses for a person.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct ExternalId(String);

impl ExternalId {
    /// Wrap an identity provider's subject identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ExternalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The identity provider's ID for the user.
    pub external_id: ExternalId,
    /// When the user was provisioned.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                external_id TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    let id = UserID::new(row.get(0)?);
    let external_id = ExternalId::new(row.get::<_, String>(1)?);
    let created_at = row.get(2)?;

    Ok(User {
        id,
        external_id,
        created_at,
    })
}

/// Get the user that `external_id` belongs to.
///
/// # Errors
///
/// This function will return a:
/// - [Error::UserNotProvisioned] if no user has been provisioned for `external_id`,
/// - or [Error::StorageFailure] if there was an error trying to access the store.
pub fn get_user_by_external_id(
    external_id: &ExternalId,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .prepare("SELECT id, external_id, created_at FROM user WHERE external_id = :external_id")?
        .query_row(&[(":external_id", external_id.as_str())], map_row_to_user)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::UserNotProvisioned(external_id.to_string()),
            error => error,
        })
}

/// A route handler that provisions the user for the requester's identity.
///
/// Only the identity has to be valid, the user does not need to exist yet.
pub async fn provision_user_endpoint(
    State(state): State<UserState>,
    CurrentIdentity(external_id): CurrentIdentity,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let user = provision_user(&external_id, &connection)?;

    Ok(success(StatusCode::OK, "user", &user))
}

/// Get or create the user for `external_id`.
///
/// Calling this more than once for the same identity returns the same user.
///
/// # Errors
///
/// Returns a [Error::StorageFailure] if an SQL related error occurred.
pub fn provision_user(external_id: &ExternalId, connection: &Connection) -> Result<User, Error> {
    let inserted = connection.execute(
        "INSERT INTO user (external_id, created_at) VALUES (?1, ?2)
         ON CONFLICT(external_id) DO NOTHING",
        (external_id.as_str(), OffsetDateTime::now_utc()),
    )?;

    if inserted == 1 {
        tracing::info!("Provisioned user for identity {external_id}");
    }

    get_user_by_external_id(external_id, connection)
}
