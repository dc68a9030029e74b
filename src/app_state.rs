//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, events::EventSink, identity::IdentityProvider};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Resolves the external identity attached to each request.
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// Receives events for recurring transactions.
    pub event_sink: Arc<dyn EventSink>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        identity_provider: Arc<dyn IdentityProvider>,
        event_sink: Arc<dyn EventSink>,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            identity_provider,
            event_sink,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
