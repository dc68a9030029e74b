//! Read-only queries over a user's transactions.

use rusqlite::Connection;
use time::{Date, Duration};

use crate::{
    Error,
    account::get_account,
    database_id::AccountId,
    money::Money,
    transaction::{
        Transaction, TransactionType,
        core::{TRANSACTION_COLUMNS, map_row_to_transaction},
    },
    user::UserID,
};

/// The number of days the dashboard looks back by default.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;
/// The maximum number of transactions the dashboard shows by default.
pub const DEFAULT_RECENT_LIMIT: u32 = 50;

/// Get `owner`'s transactions dated on or after `today - window_days`.
///
/// Transactions are ordered by date, newest first, with ties broken by the
/// most recently created. At most `limit` transactions are returned.
///
/// # Errors
/// Returns [Error::StorageFailure] if the transactions could not be read.
pub fn list_recent(
    owner: UserID,
    window_days: u32,
    limit: u32,
    today: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let since = today
        .checked_sub(Duration::days(window_days.into()))
        .unwrap_or(Date::MIN);

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
             WHERE user_id = ?1 AND date >= ?2
             ORDER BY date DESC, id DESC
             LIMIT ?3"
        ))?
        .query_map((owner, since, limit), map_row_to_transaction)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// The total amount of `owner`'s transactions on `account_id`, optionally
/// only those of `type_filter`.
///
/// The total is a non-negative magnitude and zero when nothing matches.
///
/// # Errors
/// Returns a:
/// - [Error::AccountNotFound] if `account_id` is not one of `owner`'s accounts,
/// - or [Error::StorageFailure] if there is an SQL error.
pub fn aggregate_expenses(
    owner: UserID,
    account_id: AccountId,
    type_filter: Option<TransactionType>,
    connection: &Connection,
) -> Result<Money, Error> {
    get_account(owner, account_id, connection)?;

    connection
        .query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM \"transaction\"
             WHERE user_id = ?1 AND account_id = ?2 AND (?3 IS NULL OR type = ?3)",
            (owner, account_id, type_filter),
            |row| row.get(0),
        )
        .map_err(Error::from)
}
