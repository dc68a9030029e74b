//! Ledgerline is a personal finance ledger served as a JSON API.
//!
//! Users hold accounts, record income and expense transactions against them,
//! set a spending budget and view charts of their cash flow. Authentication is
//! delegated to an external identity provider; every operation resolves the
//! identity attached to the request to an internal user before touching data.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod account;
mod app_state;
mod budget;
mod category;
mod chart;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod error;
mod events;
mod identity;
mod logging;
mod money;
mod response;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use account::{
    Account, AccountDetail, AccountType, NewAccount, create_account, delete_account, get_account,
    get_account_with_transactions, list_accounts, set_default_account,
};
pub use app_state::AppState;
pub use budget::{Budget, BudgetStatus, get_budget, get_budget_status, set_budget};
pub use category::{CATEGORIES, Category, find_category};
pub use chart::{ChartBucket, ChartSummary, RangeKey, build_chart};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use events::{EventSink, RecurringTransactionCreated, RetryPolicy, TracingEventSink};
pub use identity::{
    CookieIdentityProvider, HeaderIdentityProvider, IdentityProvider, SESSION_COOKIE,
    issue_session_cookie, resolve_user,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::{Money, RawAmount};
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{
    RecurringInterval, Transaction, TransactionBuilder, TransactionType, aggregate_expenses,
    create_transaction, delete_transaction, get_transaction, list_account_transactions,
    list_recent, update_transaction,
};
pub use user::{ExternalId, User, UserID, provision_user};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
