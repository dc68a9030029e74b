//! Defines the endpoint for viewing an account with its transactions.

use axum::{extract::State, http::StatusCode, response::Response};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    Error,
    account::{Account, AccountState, core::get_account},
    database_id::AccountId,
    db::lock_connection,
    identity::CurrentUser,
    response::{PathParam, success},
    transaction::{Transaction, list_account_transactions},
    user::UserID,
};

/// An account with every transaction recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountDetail {
    #[serde(flatten)]
    pub account: Account,
    /// Newest date first.
    pub transactions: Vec<Transaction>,
    pub transaction_count: usize,
}

/// A route handler for getting an account and its transactions.
pub async fn get_account_endpoint(
    State(state): State<AccountState>,
    CurrentUser(user): CurrentUser,
    PathParam(account_id): PathParam<AccountId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let detail = get_account_with_transactions(user.id, account_id, &connection)?;

    Ok(success(StatusCode::OK, "account", &detail))
}

/// Get `owner`'s account `account_id` and its transactions.
///
/// # Errors
/// Returns a:
/// - [Error::AccountNotFound] if `account_id` is not one of `owner`'s accounts,
/// - or [Error::StorageFailure] if there is an SQL error.
pub fn get_account_with_transactions(
    owner: UserID,
    account_id: AccountId,
    connection: &Connection,
) -> Result<AccountDetail, Error> {
    let account = get_account(owner, account_id, connection)?;
    let transactions = list_account_transactions(owner, account_id, connection)?;

    Ok(AccountDetail {
        account,
        transaction_count: transactions.len(),
        transactions,
    })
}
