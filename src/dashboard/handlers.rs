//! Dashboard HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    db::lock_connection,
    identity::CurrentUser,
    response::{QueryParams, success},
    timezone::get_local_today,
    transaction::{DEFAULT_RECENT_LIMIT, DEFAULT_WINDOW_DAYS, list_recent},
};

/// The state needed for the dashboard.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The dashboard query string.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// How many days back to look.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// The most transactions to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_limit() -> u32 {
    DEFAULT_RECENT_LIMIT
}

/// A route handler for the requester's recent transactions across all accounts.
pub async fn get_dashboard_endpoint(
    State(state): State<DashboardState>,
    CurrentUser(user): CurrentUser,
    QueryParams(query): QueryParams<DashboardQuery>,
) -> Result<Response, Error> {
    let today = get_local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    let transactions = list_recent(user.id, query.window_days, query.limit, today, &connection)
        .inspect_err(|error| tracing::error!("could not get recent transactions: {error}"))?;

    Ok(success(StatusCode::OK, "transactions", &transactions))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use time::{Duration, OffsetDateTime};

    use crate::{
        db::get_test_connection,
        identity::CurrentUser,
        response::QueryParams,
        test_utils::{
            json_body, must_create_account, must_create_transaction, must_provision_user,
        },
        transaction::{Transaction, TransactionType},
    };

    use super::{DashboardQuery, DashboardState, get_dashboard_endpoint};

    #[tokio::test]
    async fn lists_transactions_in_window() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account = must_create_account(&user, "Everyday", "0", false, &mut connection);
        let today = OffsetDateTime::now_utc().date();
        let recent = must_create_transaction(
            &user,
            Transaction::build(account.id, TransactionType::Income, "5", today - Duration::days(2)),
            &mut connection,
        );
        must_create_transaction(
            &user,
            Transaction::build(account.id, TransactionType::Income, "5", today - Duration::days(45)),
            &mut connection,
        );
        let state = DashboardState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_dashboard_endpoint(
            State(state),
            CurrentUser(user),
            QueryParams(DashboardQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let transactions = body["transactions"].as_array().unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0]["id"], recent.id);
    }
}
