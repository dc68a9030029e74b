//! Defines the endpoint for listing a user's accounts.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    Error,
    account::{AccountState, list_accounts},
    db::lock_connection,
    identity::CurrentUser,
    response::success,
};

/// A route handler that lists the requester's accounts, newest first.
///
/// Unlike the other endpoints, this one never fails with an error status.
/// Any failure, including a missing or unprovisioned identity, is reported as
/// `{"success": false, "accounts": [], "error": ...}` with 200 OK so that
/// callers rendering a list can always fall back to an empty one.
pub async fn list_accounts_endpoint(
    State(state): State<AccountState>,
    user: Result<CurrentUser, Error>,
) -> Response {
    let accounts = user.and_then(|CurrentUser(user)| {
        let connection = lock_connection(&state.db_connection)?;
        list_accounts(user.id, &connection)
    });

    match accounts {
        Ok(accounts) => success(StatusCode::OK, "accounts", &accounts),
        Err(error) => {
            tracing::warn!("Could not list accounts: {error}");

            (
                StatusCode::OK,
                Json(json!({
                    "success": false,
                    "accounts": [],
                    "error": error.client_message(),
                })),
            )
                .into_response()
        }
    }
}
