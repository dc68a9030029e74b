//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    category::{default_category, find_category},
    database_id::{AccountId, TransactionId},
    money::{Money, RawAmount},
    transaction::RecurringInterval,
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    /// The change to an account balance caused by a transaction of this type
    /// with the magnitude `amount`.
    pub fn signed(self, amount: Money) -> Money {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            other => Err(format!("unknown transaction type {other:?}")),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// An expense or income recorded against one of a user's accounts.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// The account whose balance the transaction affects.
    pub account_id: AccountId,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The magnitude of the transaction, the sign comes from `transaction_type`.
    pub amount: Money,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The key of the transaction's category.
    pub category: String,
    /// When the transaction happened.
    pub date: Date,
    pub is_recurring: bool,
    /// Present if and only if `is_recurring`.
    pub recurring_interval: Option<RecurringInterval>,
    /// When the transaction will next occur. Present if and only if `is_recurring`.
    pub next_recurring_date: Option<Date>,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Start building a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        account_id: AccountId,
        transaction_type: TransactionType,
        amount: impl Into<RawAmount>,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            account_id,
            transaction_type,
            amount: amount.into(),
            description: String::new(),
            category: default_category(transaction_type).to_owned(),
            date,
            is_recurring: false,
            recurring_interval: None,
        }
    }

    /// The change this transaction makes to its account's balance.
    pub fn signed_amount(&self) -> Money {
        self.transaction_type.signed(self.amount)
    }
}

/// The fields a client submits to create or update a transaction.
///
/// Nothing is validated until the builder is handed to
/// [crate::transaction::create_transaction] or
/// [crate::transaction::update_transaction].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionBuilder {
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A positive amount with at most two decimal places.
    pub amount: RawAmount,
    #[serde(default)]
    pub description: String,
    /// A key from the category table.
    pub category: String,
    pub date: Date,
    #[serde(default)]
    pub is_recurring: bool,
    /// Required when `is_recurring` is set, ignored otherwise.
    #[serde(default)]
    pub recurring_interval: Option<RecurringInterval>,
}

impl TransactionBuilder {
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_owned();
        self
    }

    /// Make the transaction repeat every `interval`.
    pub fn recurring(mut self, interval: RecurringInterval) -> Self {
        self.is_recurring = true;
        self.recurring_interval = Some(interval);
        self
    }

    /// Check the submitted fields and convert them into storable values.
    ///
    /// # Errors
    /// Returns a:
    /// - [Error::InvalidAmount] if the amount is not a positive decimal with at most two decimal places,
    /// - [Error::InvalidCategory] if the category is not in the category table,
    /// - [Error::InvalidInterval] if a recurring transaction has no interval,
    /// - or [Error::NoNextOccurrence] if a recurring transaction's next date is out of range.
    pub(crate) fn validate(&self) -> Result<ValidTransaction, Error> {
        let amount = self.amount.parse()?;

        if amount.is_negative() || amount.is_zero() {
            return Err(Error::InvalidAmount(amount.to_string()));
        }

        let category = find_category(&self.category)?;

        let (recurring_interval, next_recurring_date) = if self.is_recurring {
            let interval = self.recurring_interval.ok_or(Error::InvalidInterval)?;
            let next_date = interval
                .next_date(self.date)
                .ok_or(Error::NoNextOccurrence(self.date))?;
            (Some(interval), Some(next_date))
        } else {
            (None, None)
        };

        Ok(ValidTransaction {
            account_id: self.account_id,
            transaction_type: self.transaction_type,
            amount,
            description: self.description.trim().to_owned(),
            category: category.id,
            date: self.date,
            is_recurring: self.is_recurring,
            recurring_interval,
            next_recurring_date,
        })
    }
}

/// Transaction fields that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidTransaction {
    pub account_id: AccountId,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub description: String,
    pub category: &'static str,
    pub date: Date,
    pub is_recurring: bool,
    pub recurring_interval: Option<RecurringInterval>,
    pub next_recurring_date: Option<Date>,
}

impl ValidTransaction {
    pub fn signed_amount(&self) -> Money {
        self.transaction_type.signed(self.amount)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns selected by [map_row_to_transaction], in order.
pub(crate) const TRANSACTION_COLUMNS: &str = "id, user_id, account_id, type, amount, description, \
    category, date, is_recurring, recurring_interval, next_recurring_date, created_at";

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            account_id INTEGER NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
            amount INTEGER NOT NULL CHECK (amount > 0),
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            date TEXT NOT NULL,
            is_recurring INTEGER NOT NULL DEFAULT 0,
            recurring_interval TEXT,
            next_recurring_date TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE,
            CHECK ((is_recurring = 0) = (recurring_interval IS NULL))
        )",
        (),
    )?;

    // Improve performance of the dashboard and per-account queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date
         ON \"transaction\"(user_id, date DESC, id DESC)",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_account
         ON \"transaction\"(account_id, date DESC)",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_transaction(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        account_id: row.get(2)?,
        transaction_type: row.get(3)?,
        amount: row.get(4)?,
        description: row.get(5)?,
        category: row.get(6)?,
        date: row.get(7)?,
        is_recurring: row.get(8)?,
        recurring_interval: row.get(9)?,
        next_recurring_date: row.get(10)?,
        created_at: row.get(11)?,
    })
}

/// Retrieve the transaction `id` if it belongs to `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to one of `owner`'s transactions,
/// - or [Error::StorageFailure] if there is some other SQL error.
pub fn get_transaction(
    owner: UserID,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = ?1 AND user_id = ?2"
        ))?
        .query_row((id, owner), map_row_to_transaction)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::TransactionNotFound,
            error => error,
        })
}

/// Get the transactions of `owner`'s account `account_id`, newest date first.
///
/// # Errors
/// Returns [Error::StorageFailure] if the transactions could not be read.
pub fn list_account_transactions(
    owner: UserID,
    account_id: AccountId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\"
             WHERE user_id = ?1 AND account_id = ?2
             ORDER BY date DESC, id DESC"
        ))?
        .query_map((owner, account_id), map_row_to_transaction)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}
