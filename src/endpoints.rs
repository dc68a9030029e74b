//! The API endpoints URIs.
//!
//! Endpoints that take a parameter, e.g., '/api/accounts/{account_id}', are
//! registered with axum's `{param}` syntax.

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to provision the user for the current identity.
pub const USERS: &str = "/api/users";
/// The route to list and create accounts.
pub const ACCOUNTS: &str = "/api/accounts";
/// The route to get or delete a single account.
pub const ACCOUNT: &str = "/api/accounts/{account_id}";
/// The route to make an account the default account.
pub const ACCOUNT_DEFAULT: &str = "/api/accounts/{account_id}/default";
/// The route to get the chart for an account.
pub const ACCOUNT_CHART: &str = "/api/accounts/{account_id}/chart";
/// The route to get the budget status for an account.
pub const ACCOUNT_BUDGET: &str = "/api/accounts/{account_id}/budget";
/// The route to set the budget.
pub const BUDGET: &str = "/api/budget";
/// The route to create transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the dashboard's recent transactions.
pub const DASHBOARD: &str = "/api/dashboard";
/// The route to list the transaction categories.
pub const CATEGORIES: &str = "/api/categories";

/// Replace the first `{parameter}` in `endpoint_path` with `id`.
///
/// For example, `format_endpoint("/api/accounts/{account_id}", 3)` gives
/// `"/api/accounts/3"`. An unterminated parameter runs to the end of the path.
/// Paths without a parameter are returned unchanged.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| start + offset + 1);

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}
