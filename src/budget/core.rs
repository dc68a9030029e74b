//! The budget model and the upsert that sets it.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    database_id::DatabaseId,
    db::{lock_connection, with_storage_transaction},
    identity::CurrentUser,
    money::{Money, RawAmount},
    response::{JsonBody, success},
    user::UserID,
};

/// The state needed to read or set a budget.
#[derive(Debug, Clone)]
pub struct BudgetState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A user's spending budget. Each user has at most one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub id: DatabaseId,
    pub user_id: UserID,
    /// A non-negative amount.
    pub amount: Money,
}

/// The request body for setting a budget.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetForm {
    pub amount: RawAmount,
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL UNIQUE,
            amount INTEGER NOT NULL CHECK (amount >= 0),
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_budget(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
    })
}

/// Get `owner`'s budget, if they have set one.
///
/// # Errors
/// Returns [Error::StorageFailure] if the budget could not be read.
pub fn get_budget(owner: UserID, connection: &Connection) -> Result<Option<Budget>, Error> {
    connection
        .prepare("SELECT id, user_id, amount FROM budget WHERE user_id = ?1")?
        .query_row([owner], map_row_to_budget)
        .optional()
        .map_err(Error::from)
}

/// A route handler for setting the requester's budget, responds with the budget.
pub async fn set_budget_endpoint(
    State(state): State<BudgetState>,
    CurrentUser(user): CurrentUser,
    JsonBody(form): JsonBody<BudgetForm>,
) -> Result<Response, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    let budget = set_budget(user.id, &form.amount, &mut connection)?;

    Ok(success(StatusCode::OK, "budget", &budget))
}

/// Create or replace `owner`'s budget.
///
/// # Errors
/// Returns a:
/// - [Error::InvalidAmount] if `amount` is not a non-negative decimal with at most two decimal places,
/// - or [Error::StorageFailure] if there is an SQL error.
pub fn set_budget(
    owner: UserID,
    amount: &RawAmount,
    connection: &mut Connection,
) -> Result<Budget, Error> {
    let amount = amount.parse()?;

    if amount.is_negative() {
        return Err(Error::InvalidAmount(amount.to_string()));
    }

    with_storage_transaction(connection, |transaction| {
        transaction
            .prepare(
                "INSERT INTO budget (user_id, amount) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET amount = excluded.amount
                 RETURNING id, user_id, amount",
            )?
            .query_row((owner, amount), map_row_to_budget)
            .map_err(Error::from)
    })
}
