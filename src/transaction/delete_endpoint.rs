//! Defines the endpoint for deleting a transaction.

use axum::{extract::State, http::StatusCode, response::Response};
use rusqlite::Connection;

use crate::{
    Error,
    account::adjust_account_balance,
    database_id::TransactionId,
    db::{lock_connection, with_storage_transaction},
    identity::CurrentUser,
    response::{PathParam, success},
    transaction::{Transaction, TransactionState, core::get_transaction},
    user::UserID,
};

/// A route handler for deleting a transaction, responds with the deleted transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    CurrentUser(user): CurrentUser,
    PathParam(transaction_id): PathParam<TransactionId>,
) -> Result<Response, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    let transaction = delete_transaction(user.id, transaction_id, &mut connection)?;

    Ok(success(StatusCode::OK, "transaction", &transaction))
}

/// Delete `owner`'s transaction `transaction_id` and reverse its effect on the account balance.
///
/// # Errors
/// Returns a:
/// - [Error::TransactionNotFound] if `transaction_id` is not one of `owner`'s transactions,
/// - or [Error::StorageFailure] if there is an SQL error.
pub fn delete_transaction(
    owner: UserID,
    transaction_id: TransactionId,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    with_storage_transaction(connection, |sql_transaction| {
        let transaction = get_transaction(owner, transaction_id, sql_transaction)?;

        sql_transaction.execute(
            "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
            (transaction_id, owner),
        )?;
        adjust_account_balance(
            transaction.account_id,
            -transaction.signed_amount(),
            sql_transaction,
        )?;

        tracing::info!("Deleted transaction {transaction_id} of user {owner}");

        Ok(transaction)
    })
}
