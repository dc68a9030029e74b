//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};

use crate::{
    AppState, Error,
    account::{
        create_account_endpoint, delete_account_endpoint, get_account_endpoint,
        list_accounts_endpoint, set_default_account_endpoint,
    },
    budget::{get_budget_status_endpoint, set_budget_endpoint},
    category::get_categories_endpoint,
    chart::get_chart_endpoint,
    dashboard::get_dashboard_endpoint,
    endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        update_transaction_endpoint,
    },
    user::provision_user_endpoint,
};

/// Return a router with all the app's routes.
///
/// Every route except [endpoints::COFFEE] and [endpoints::CATEGORIES]
/// resolves the requester's identity before doing anything else.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::CATEGORIES, get(get_categories_endpoint))
        .route(endpoints::USERS, post(provision_user_endpoint))
        .route(
            endpoints::ACCOUNTS,
            get(list_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            get(get_account_endpoint).delete(delete_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT_DEFAULT,
            put(set_default_account_endpoint),
        )
        .route(endpoints::ACCOUNT_CHART, get(get_chart_endpoint))
        .route(endpoints::ACCOUNT_BUDGET, get(get_budget_status_endpoint))
        .route(endpoints::BUDGET, put(set_budget_endpoint))
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
