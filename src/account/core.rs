use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::extract::FromRef;
use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{AppState, Error, database_id::AccountId, money::Money, user::UserID};

/// The state needed by the account endpoints.
#[derive(Debug, Clone)]
pub struct AccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The kind of money container an account is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Current,
    Savings,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "CURRENT",
            Self::Savings => "SAVINGS",
        }
    }
}

impl Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CURRENT" => Ok(Self::Current),
            "SAVINGS" => Ok(Self::Savings),
            other => Err(format!("unknown account type {other:?}")),
        }
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A named money container owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserID,
    /// The display name of the account.
    pub name: String,
    /// Whether this is a current or savings account.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// The initial balance plus the signed sum of the account's transactions.
    pub balance: Money,
    /// Whether this is the user's default account.
    pub is_default: bool,
    /// When the account was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The columns selected by [map_row_to_account], in order.
pub(crate) const ACCOUNT_COLUMNS: &str =
    "id, user_id, name, type, balance, is_default, created_at";

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('CURRENT', 'SAVINGS')),
            balance INTEGER NOT NULL CHECK (typeof(balance) = 'integer'),
            is_default INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    // The storage layer refuses a second default account for the same user.
    connection.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_account_single_default
         ON account(user_id) WHERE is_default = 1",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let name = row.get(2)?;
    let account_type = row.get(3)?;
    let balance = row.get(4)?;
    let is_default = row.get(5)?;
    let created_at = row.get(6)?;

    Ok(Account {
        id,
        user_id,
        name,
        account_type,
        balance,
        is_default,
        created_at,
    })
}

/// Get the account `id` if it belongs to `owner`.
///
/// # Errors
/// Returns a:
/// - [Error::AccountNotFound] if the account does not exist or belongs to another user,
/// - or [Error::StorageFailure] if there is some other SQL error.
pub fn get_account(owner: UserID, id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, owner), map_row_to_account)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::AccountNotFound,
            error => error,
        })
}

/// Get all of `owner`'s accounts, most recently created first.
///
/// # Errors
/// Returns [Error::StorageFailure] if the accounts could not be read.
pub fn list_accounts(owner: UserID, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC"
        ))?
        .query_map([owner], map_row_to_account)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Count the accounts that `owner` has.
pub fn count_accounts(owner: UserID, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM account WHERE user_id = ?1",
            [owner],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Clear the default flag on every account of `owner` in one update.
pub(crate) fn clear_default_accounts(owner: UserID, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "UPDATE account SET is_default = 0 WHERE user_id = ?1 AND is_default = 1",
        [owner],
    )?;

    Ok(())
}

/// Add `delta` to the balance of `account_id` as a single SQL increment.
///
/// Must run inside a storage transaction: when the new balance is out of
/// range the error is returned after the update and the caller's rollback
/// undoes it.
///
/// # Errors
/// Returns a:
/// - [Error::AccountNotFound] if no row was updated,
/// - [Error::InvalidAmount] if the new balance would exceed [Money::MAX] in magnitude,
/// - or [Error::StorageFailure] if there is some other SQL error.
pub(crate) fn adjust_account_balance(
    account_id: AccountId,
    delta: Money,
    connection: &Connection,
) -> Result<(), Error> {
    let balance: Money = connection
        .query_row(
            "UPDATE account SET balance = balance + ?1 WHERE id = ?2 RETURNING balance",
            (delta, account_id),
            |row| row.get(0),
        )
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::AccountNotFound,
            error => error,
        })?;

    if !balance.is_within_limit() {
        tracing::warn!(
            "Balance of account {account_id} would become {balance}, rejecting change of {delta}"
        );
        return Err(Error::InvalidAmount(delta.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        account::{AccountType, get_account, list_accounts},
        db::get_test_connection,
        test_utils::{must_create_account, must_provision_user},
    };

    #[test]
    fn sql_is_valid() {
        let connection = rusqlite::Connection::open_in_memory().unwrap();
        crate::user::create_user_table(&connection).unwrap();

        assert_eq!(Ok(()), super::create_account_table(&connection));
    }

    #[test]
    fn account_type_round_trips_through_text() {
        assert_eq!("SAVINGS".parse(), Ok(AccountType::Savings));
        assert_eq!(AccountType::Current.to_string(), "CURRENT");
        assert!("CHEQUE".parse::<AccountType>().is_err());
    }

    #[test]
    fn get_account_is_scoped_to_owner() {
        let mut connection = get_test_connection();
        let alice = must_provision_user("alice", &connection);
        let bob = must_provision_user("bob", &connection);
        let account = must_create_account(&alice, "Everyday", "10", false, &mut connection);

        assert_eq!(get_account(alice.id, account.id, &connection), Ok(account.clone()));
        assert_eq!(
            get_account(bob.id, account.id, &connection),
            Err(Error::AccountNotFound)
        );
    }

    #[test]
    fn list_accounts_is_newest_first() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let first = must_create_account(&user, "First", "1", false, &mut connection);
        let second = must_create_account(&user, "Second", "2", false, &mut connection);
        let third = must_create_account(&user, "Third", "3", false, &mut connection);

        let accounts = list_accounts(user.id, &connection).unwrap();

        let ids: Vec<_> = accounts.iter().map(|account| account.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[test]
    fn list_accounts_excludes_other_users() {
        let mut connection = get_test_connection();
        let alice = must_provision_user("alice", &connection);
        let bob = must_provision_user("bob", &connection);
        must_create_account(&alice, "Alice's", "1", false, &mut connection);

        assert_eq!(list_accounts(bob.id, &connection), Ok(vec![]));
    }
}
