//! The fixed table of transaction categories.

use axum::{http::StatusCode, response::Response};
use serde::Serialize;

use crate::{Error, response::success, transaction::TransactionType};

/// A category a transaction can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    /// The key stored on transactions, e.g. `"groceries"`.
    pub id: &'static str,
    /// The display name.
    pub name: &'static str,
    /// Whether this is an income or expense category.
    #[serde(rename = "type")]
    pub category_type: TransactionType,
    /// A hex colour for charts.
    pub color: &'static str,
}

const fn category(
    id: &'static str,
    name: &'static str,
    category_type: TransactionType,
    color: &'static str,
) -> Category {
    Category {
        id,
        name,
        category_type,
        color,
    }
}

/// Every category, income categories first.
pub const CATEGORIES: &[Category] = &[
    category("salary", "Salary", TransactionType::Income, "#22c55e"),
    category("freelance", "Freelance", TransactionType::Income, "#06b6d4"),
    category("investments", "Investments", TransactionType::Income, "#6366f1"),
    category("business", "Business", TransactionType::Income, "#ec4899"),
    category("rental", "Rental", TransactionType::Income, "#f59e0b"),
    category("other-income", "Other Income", TransactionType::Income, "#64748b"),
    category("housing", "Housing", TransactionType::Expense, "#ef4444"),
    category("transportation", "Transportation", TransactionType::Expense, "#f97316"),
    category("groceries", "Groceries", TransactionType::Expense, "#84cc16"),
    category("utilities", "Utilities", TransactionType::Expense, "#06b6d4"),
    category("entertainment", "Entertainment", TransactionType::Expense, "#8b5cf6"),
    category("food", "Food", TransactionType::Expense, "#f43f5e"),
    category("shopping", "Shopping", TransactionType::Expense, "#ec4899"),
    category("healthcare", "Healthcare", TransactionType::Expense, "#14b8a6"),
    category("education", "Education", TransactionType::Expense, "#6366f1"),
    category("personal", "Personal Care", TransactionType::Expense, "#d946ef"),
    category("travel", "Travel", TransactionType::Expense, "#0ea5e9"),
    category("insurance", "Insurance", TransactionType::Expense, "#64748b"),
    category("gifts", "Gifts & Donations", TransactionType::Expense, "#f472b6"),
    category("bills", "Bills & Fees", TransactionType::Expense, "#fb7185"),
    category("other-expense", "Other Expenses", TransactionType::Expense, "#94a3b8"),
];

/// Look up the category with the key `id`.
///
/// # Errors
/// Returns [Error::InvalidCategory] if there is no such category.
pub fn find_category(id: &str) -> Result<&'static Category, Error> {
    CATEGORIES
        .iter()
        .find(|category| category.id == id)
        .ok_or_else(|| Error::InvalidCategory(id.to_owned()))
}

/// The catch-all category for `transaction_type`.
pub fn default_category(transaction_type: TransactionType) -> &'static str {
    match transaction_type {
        TransactionType::Income => "other-income",
        TransactionType::Expense => "other-expense",
    }
}

/// A route handler that lists every category.
pub async fn get_categories_endpoint() -> Response {
    success(StatusCode::OK, "categories", &CATEGORIES)
}
