//! Defines the endpoint for viewing a single transaction.

use axum::{extract::State, http::StatusCode, response::Response};

use crate::{
    Error,
    database_id::TransactionId,
    db::lock_connection,
    identity::CurrentUser,
    response::{PathParam, success},
    transaction::{TransactionState, get_transaction},
};

/// A route handler for getting one of the requester's transactions.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    CurrentUser(user): CurrentUser,
    PathParam(transaction_id): PathParam<TransactionId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = get_transaction(user.id, transaction_id, &connection)?;

    Ok(success(StatusCode::OK, "transaction", &transaction))
}
