//! Transactions: income and expenses recorded against a user's accounts.
//!
//! This module contains:
//! - The `Transaction` model and the `TransactionBuilder` clients submit
//! - Mutations that keep the owning account's balance consistent
//! - Read-only queries for the dashboard and budget
//! - The route handlers for transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod query;
mod recurring;
mod update_endpoint;
mod view_endpoint;

pub use core::{
    Transaction, TransactionBuilder, TransactionType, create_transaction_table, get_transaction,
    list_account_transactions,
};
pub use create_endpoint::{TransactionState, create_transaction, create_transaction_endpoint};
pub use delete_endpoint::{delete_transaction, delete_transaction_endpoint};
pub use query::{DEFAULT_RECENT_LIMIT, DEFAULT_WINDOW_DAYS, aggregate_expenses, list_recent};
pub use recurring::RecurringInterval;
pub use update_endpoint::{update_transaction, update_transaction_endpoint};
pub use view_endpoint::get_transaction_endpoint;
