//! Defines the endpoint for editing a transaction.

use axum::{extract::State, http::StatusCode, response::Response};
use rusqlite::Connection;

use crate::{
    Error,
    account::{adjust_account_balance, get_account},
    database_id::TransactionId,
    db::{lock_connection, with_storage_transaction},
    identity::CurrentUser,
    response::{JsonBody, PathParam, success},
    transaction::{
        Transaction, TransactionBuilder, TransactionState,
        core::{TRANSACTION_COLUMNS, get_transaction, map_row_to_transaction},
    },
    user::UserID,
};

/// A route handler for replacing the fields of a transaction, responds with the updated transaction.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    CurrentUser(user): CurrentUser,
    PathParam(transaction_id): PathParam<TransactionId>,
    JsonBody(builder): JsonBody<TransactionBuilder>,
) -> Result<Response, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    let transaction = update_transaction(user.id, transaction_id, &builder, &mut connection)
        .inspect_err(|error| {
            tracing::warn!("Could not update transaction {transaction_id}: {error}")
        })?;

    Ok(success(StatusCode::OK, "transaction", &transaction))
}

/// Replace the fields of `owner`'s transaction `transaction_id` with `builder`.
///
/// The old signed amount is reversed on the old account and the new signed
/// amount is applied to the new account, which may be a different account.
/// Everything happens in one storage transaction.
///
/// # Errors
/// Returns a:
/// - [Error::InvalidAmount], [Error::InvalidCategory] or [Error::InvalidInterval] if `builder` is invalid,
/// - [Error::TransactionNotFound] if `transaction_id` is not one of `owner`'s transactions,
/// - [Error::AccountNotFound] if the new account is not one of `owner`'s accounts,
/// - or [Error::StorageFailure] if there is an SQL error.
pub fn update_transaction(
    owner: UserID,
    transaction_id: TransactionId,
    builder: &TransactionBuilder,
    connection: &mut Connection,
) -> Result<Transaction, Error> {
    let valid = builder.validate()?;

    with_storage_transaction(connection, |sql_transaction| {
        let old = get_transaction(owner, transaction_id, sql_transaction)?;
        get_account(owner, valid.account_id, sql_transaction)?;

        adjust_account_balance(old.account_id, -old.signed_amount(), sql_transaction)?;

        let updated = sql_transaction
            .prepare(&format!(
                "UPDATE \"transaction\"
                 SET account_id = ?1, type = ?2, amount = ?3, description = ?4, category = ?5,
                    date = ?6, is_recurring = ?7, recurring_interval = ?8, next_recurring_date = ?9
                 WHERE id = ?10 AND user_id = ?11
                 RETURNING {TRANSACTION_COLUMNS}"
            ))?
            .query_row(
                (
                    valid.account_id,
                    valid.transaction_type,
                    valid.amount,
                    &valid.description,
                    valid.category,
                    valid.date,
                    valid.is_recurring,
                    valid.recurring_interval,
                    valid.next_recurring_date,
                    transaction_id,
                    owner,
                ),
                map_row_to_transaction,
            )?;

        adjust_account_balance(valid.account_id, valid.signed_amount(), sql_transaction)?;

        Ok(updated)
    })
}
