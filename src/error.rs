//! Defines the app level error type and its conversion into structured JSON failures.
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use time::Date;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a resolvable external identity.
    #[error("no identity could be resolved for the request")]
    Unauthenticated,

    /// The request carried a valid external identity, but no internal user has
    /// been provisioned for it.
    #[error("the identity {0:?} does not belong to a provisioned user")]
    UserNotProvisioned(String),

    /// The account does not exist or belongs to another user.
    #[error("the account could not be found")]
    AccountNotFound,

    /// The transaction does not exist or belongs to another user.
    #[error("the transaction could not be found")]
    TransactionNotFound,

    /// A monetary amount was not a valid decimal, was out of range, had more
    /// than two decimal places, or had the wrong sign for its use.
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    /// A recurring transaction was submitted without a recurring interval.
    #[error("recurring transactions need a daily, weekly, monthly or yearly interval")]
    InvalidInterval,

    /// A recurring transaction is dated so late that its next occurrence
    /// cannot be represented.
    #[error("a recurring transaction on {0} has no next occurrence")]
    NoNextOccurrence(Date),

    /// The category key does not exist in the category table.
    #[error("unknown category {0:?}")]
    InvalidCategory(String),

    /// The request body, path or query string could not be decoded.
    #[error("malformed request: {0}")]
    InvalidRequest(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error occurs when a query returns no rows. Callers
    /// should map it to a more specific error where one exists.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    StorageFailure(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The task dispatcher rejected a published event.
    #[error("could not publish event: {0}")]
    EventPublishError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::StorageFailure(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::UserNotProvisioned(_) => StatusCode::FORBIDDEN,
            Error::AccountNotFound | Error::TransactionNotFound | Error::NotFound => {
                StatusCode::NOT_FOUND
            }
            Error::InvalidAmount(_)
            | Error::InvalidInterval
            | Error::NoNextOccurrence(_)
            | Error::InvalidCategory(_)
            | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::StorageFailure(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_)
            | Error::JSONSerializationError(_)
            | Error::EventPublishError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client.
    ///
    /// Internal failures are reduced to a generic message, the details only go
    /// to the server logs.
    pub fn client_message(&self) -> String {
        match self {
            Error::Unauthenticated => "Unauthorized".to_owned(),
            Error::UserNotProvisioned(_) => "User not found".to_owned(),
            Error::AccountNotFound => "Account not found".to_owned(),
            Error::TransactionNotFound => "Transaction not found".to_owned(),
            Error::NotFound => "Not found".to_owned(),
            Error::InvalidAmount(amount) => format!("Invalid amount: {amount:?}"),
            Error::InvalidInterval => {
                "Recurring transactions need a daily, weekly, monthly or yearly interval"
                    .to_owned()
            }
            Error::NoNextOccurrence(date) => {
                format!("A recurring transaction on {date} has no next occurrence")
            }
            Error::InvalidCategory(category) => format!("Unknown category: {category:?}"),
            Error::InvalidRequest(reason) => reason.clone(),
            _ => "An unexpected error occurred, check the server logs for more details.".to_owned(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (
            status_code,
            Json(json!({
                "success": false,
                "error": self.client_message(),
            })),
        )
            .into_response()
    }
}
