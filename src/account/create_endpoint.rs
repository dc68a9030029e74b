//! Defines the endpoint for creating a new account.

use axum::{extract::State, http::StatusCode, response::Response};
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error,
    account::{
        Account, AccountState, AccountType,
        core::{ACCOUNT_COLUMNS, clear_default_accounts, count_accounts, map_row_to_account},
    },
    db::{lock_connection, with_storage_transaction},
    identity::CurrentUser,
    money::RawAmount,
    response::{JsonBody, success},
    user::UserID,
};

/// The request body for creating an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    /// The display name of the account.
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// The opening balance, may be negative.
    pub balance: RawAmount,
    /// Whether the account should become the default account.
    ///
    /// A user's first account is always the default.
    #[serde(default)]
    pub is_default: bool,
}

/// A route handler for creating a new account, responds with the created account.
pub async fn create_account_endpoint(
    State(state): State<AccountState>,
    CurrentUser(user): CurrentUser,
    JsonBody(new_account): JsonBody<NewAccount>,
) -> Result<Response, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    let account = create_account(user.id, &new_account, &mut connection)
        .inspect_err(|error| tracing::warn!("Could not create account {new_account:?}: {error}"))?;

    Ok(success(StatusCode::CREATED, "account", &account))
}

/// Create an account for `owner`.
///
/// If `owner` has no accounts, the new account is made the default regardless
/// of `new_account.is_default`. When the new account is the default, the
/// owner's previous default is cleared first. The count, clear and insert
/// happen in one storage transaction.
///
/// # Errors
/// Returns a:
/// - [Error::InvalidAmount] if the balance is not a decimal with at most two decimal places,
/// - or [Error::StorageFailure] if there is an SQL error.
pub fn create_account(
    owner: UserID,
    new_account: &NewAccount,
    connection: &mut Connection,
) -> Result<Account, Error> {
    let balance = new_account.balance.parse()?;

    with_storage_transaction(connection, |transaction| {
        let is_default = new_account.is_default || count_accounts(owner, transaction)? == 0;

        if is_default {
            clear_default_accounts(owner, transaction)?;
        }

        let account = transaction
            .prepare(&format!(
                "INSERT INTO account (user_id, name, type, balance, is_default, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING {ACCOUNT_COLUMNS}"
            ))?
            .query_row(
                (
                    owner,
                    new_account.name.trim(),
                    new_account.account_type,
                    balance,
                    is_default,
                    OffsetDateTime::now_utc(),
                ),
                map_row_to_account,
            )?;

        tracing::info!("Created account {} for user {owner}", account.id);

        Ok(account)
    })
}
