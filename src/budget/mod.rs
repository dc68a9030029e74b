//! A single spending budget per user and its comparison against account expenses.

mod core;
mod status;

pub use core::{
    Budget, BudgetState, create_budget_table, get_budget, set_budget, set_budget_endpoint,
};
pub use status::{BudgetStatus, get_budget_status, get_budget_status_endpoint};
