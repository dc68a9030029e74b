//! Budget status: how an account's spending compares to the user's budget.

use axum::{extract::State, http::StatusCode, response::Response};
use rusqlite::Connection;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;

use crate::{
    Error,
    account::get_account,
    budget::{BudgetState, get_budget},
    database_id::AccountId,
    db::lock_connection,
    identity::CurrentUser,
    money::Money,
    response::{PathParam, success},
    transaction::{TransactionType, aggregate_expenses},
    user::UserID,
};

/// The budget figures for one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// `None` if the user has not set a budget.
    pub budget_amount: Option<Money>,
    /// The total of the account's expenses.
    pub current_expenses: Money,
    pub account_balance: Money,
    /// The budget minus the expenses, may be negative.
    pub remaining: Option<Money>,
    /// Expenses as a percentage of the budget, `None` without a positive budget.
    pub percent_used: Option<f64>,
}

/// A route handler for getting the budget status of one of the requester's accounts.
pub async fn get_budget_status_endpoint(
    State(state): State<BudgetState>,
    CurrentUser(user): CurrentUser,
    PathParam(account_id): PathParam<AccountId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let status = get_budget_status(user.id, account_id, &connection)?;

    Ok(success(StatusCode::OK, "budget_status", &status))
}

/// Compare the expenses on `owner`'s account `account_id` to `owner`'s budget.
///
/// # Errors
/// Returns a:
/// - [Error::AccountNotFound] if `account_id` is not one of `owner`'s accounts,
/// - or [Error::StorageFailure] if there is an SQL error.
pub fn get_budget_status(
    owner: UserID,
    account_id: AccountId,
    connection: &Connection,
) -> Result<BudgetStatus, Error> {
    let account = get_account(owner, account_id, connection)?;
    let budget_amount = get_budget(owner, connection)?.map(|budget| budget.amount);
    let current_expenses = aggregate_expenses(
        owner,
        account_id,
        Some(TransactionType::Expense),
        connection,
    )?;

    Ok(BudgetStatus {
        budget_amount,
        current_expenses,
        account_balance: account.balance,
        remaining: budget_amount.map(|budget| budget - current_expenses),
        percent_used: budget_amount.and_then(|budget| percent_used(current_expenses, budget)),
    })
}

fn percent_used(expenses: Money, budget: Money) -> Option<f64> {
    if budget.is_zero() {
        return None;
    }

    (expenses.as_decimal() / budget.as_decimal() * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .to_f64()
}
