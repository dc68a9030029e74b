//! The chart endpoint for a single account.

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
    account::get_account,
    chart::{RangeKey, build_chart},
    database_id::AccountId,
    db::lock_connection,
    identity::CurrentUser,
    response::{PathParam, QueryParams, success},
    timezone::get_local_today,
    transaction::list_account_transactions,
};

/// The state needed to chart an account.
#[derive(Debug, Clone)]
pub struct ChartState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ChartState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for the chart endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    #[serde(default)]
    pub range: RangeKey,
}

/// A route handler that buckets an account's transactions for a chart.
pub async fn get_chart_endpoint(
    State(state): State<ChartState>,
    CurrentUser(user): CurrentUser,
    PathParam(account_id): PathParam<AccountId>,
    QueryParams(query): QueryParams<ChartQuery>,
) -> Result<Response, Error> {
    let today = get_local_today(&state.local_timezone)?;
    let connection = lock_connection(&state.db_connection)?;

    get_account(user.id, account_id, &connection)?;
    let transactions = list_account_transactions(user.id, account_id, &connection)?;

    let chart = build_chart(&transactions, query.range, today);

    Ok(success(StatusCode::OK, "chart", &chart))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        chart::RangeKey,
        db::get_test_connection,
        identity::CurrentUser,
        response::{PathParam, QueryParams},
        test_utils::{
            json_body, must_create_account, must_create_transaction, must_provision_user,
        },
        transaction::{Transaction, TransactionType},
    };

    use super::{ChartQuery, ChartState, get_chart_endpoint};

    #[tokio::test]
    async fn charts_recent_transactions() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account = must_create_account(&user, "Everyday", "0", false, &mut connection);
        let today = OffsetDateTime::now_utc().date();
        must_create_transaction(
            &user,
            Transaction::build(account.id, TransactionType::Expense, "10", today),
            &mut connection,
        );
        must_create_transaction(
            &user,
            Transaction::build(
                account.id,
                TransactionType::Expense,
                "20",
                today - Duration::days(40),
            ),
            &mut connection,
        );
        let state = ChartState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_chart_endpoint(
            State(state),
            CurrentUser(user),
            PathParam(account.id),
            QueryParams(ChartQuery::default()),
        )
        .await
        .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["chart"]["range"], "1M");
        assert_eq!(body["chart"]["total_expense"], 10.0);
        assert_eq!(body["chart"]["buckets"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_foreign_account() {
        let mut connection = get_test_connection();
        let alice = must_provision_user("alice", &connection);
        let bob = must_provision_user("bob", &connection);
        let bobs = must_create_account(&bob, "Bob's", "0", false, &mut connection);
        let state = ChartState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let result = get_chart_endpoint(
            State(state),
            CurrentUser(alice),
            PathParam(bobs.id),
            QueryParams(ChartQuery {
                range: RangeKey::All,
            }),
        )
        .await;

        assert_eq!(result.err(), Some(Error::AccountNotFound));
    }
}
