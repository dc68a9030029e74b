//! Defines the endpoint for recording a new transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{adjust_account_balance, get_account},
    db::{lock_connection, with_storage_transaction},
    events::{EventSink, publish_recurring_transaction},
    identity::CurrentUser,
    response::{JsonBody, success},
    transaction::{
        Transaction, TransactionBuilder,
        core::{TRANSACTION_COLUMNS, ValidTransaction, map_row_to_transaction},
    },
    user::UserID,
};

/// The state needed to create, update or delete a transaction.
#[derive(Debug, Clone)]
pub struct TransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where recurring transaction events are sent.
    pub event_sink: Arc<dyn EventSink>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            event_sink: state.event_sink.clone(),
        }
    }
}

/// A route handler for creating a new transaction, responds with the created transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    CurrentUser(user): CurrentUser,
    JsonBody(builder): JsonBody<TransactionBuilder>,
) -> Result<Response, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(
        user.id,
        &builder,
        &mut connection,
        state.event_sink.as_ref(),
    )
    .inspect_err(|error| tracing::warn!("Could not create transaction {builder:?}: {error}"))?;

    Ok(success(StatusCode::CREATED, "transaction", &transaction))
}

/// Record a transaction for `owner` and apply it to the account balance.
///
/// The insert and the balance update happen in one storage transaction. If
/// the transaction recurs, an event is published to `event_sink` after the
/// commit.
///
/// # Errors
/// Returns a:
/// - [Error::InvalidAmount], [Error::InvalidCategory] or [Error::InvalidInterval] if `builder` is invalid,
/// - [Error::AccountNotFound] if the account is not one of `owner`'s accounts,
/// - or [Error::StorageFailure] if there is an SQL error.
pub fn create_transaction(
    owner: UserID,
    builder: &TransactionBuilder,
    connection: &mut Connection,
    event_sink: &dyn EventSink,
) -> Result<Transaction, Error> {
    let valid = builder.validate()?;

    let transaction = with_storage_transaction(connection, |sql_transaction| {
        get_account(owner, valid.account_id, sql_transaction)?;

        let transaction = insert_transaction(owner, &valid, sql_transaction)?;
        adjust_account_balance(valid.account_id, valid.signed_amount(), sql_transaction)?;

        Ok(transaction)
    })?;

    tracing::info!(
        "Created {} transaction {} on account {}",
        transaction.transaction_type,
        transaction.id,
        transaction.account_id
    );

    publish_recurring_transaction(event_sink, &transaction);

    Ok(transaction)
}

fn insert_transaction(
    owner: UserID,
    valid: &ValidTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, account_id, type, amount, description, category,
                date, is_recurring, recurring_interval, next_recurring_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                owner,
                valid.account_id,
                valid.transaction_type,
                valid.amount,
                &valid.description,
                valid.category,
                valid.date,
                valid.is_recurring,
                valid.recurring_interval,
                valid.next_recurring_date,
                OffsetDateTime::now_utc(),
            ),
            map_row_to_transaction,
        )
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use time::macros::date;

    use crate::{
        Error,
        account::{get_account, list_accounts},
        db::get_test_connection,
        events::{TracingEventSink, test_sinks::RecordingEventSink},
        identity::CurrentUser,
        money::Money,
        response::JsonBody,
        test_utils::{json_body, must_create_account, must_provision_user},
        transaction::{
            RecurringInterval, Transaction, TransactionState, TransactionType, create_transaction,
        },
    };

    use super::create_transaction_endpoint;

    #[test]
    fn expense_decreases_balance() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account = must_create_account(&user, "Everyday", "1000", false, &mut connection);

        let transaction = create_transaction(
            user.id,
            &Transaction::build(account.id, TransactionType::Expense, "150", date!(2025 - 10 - 05))
                .category("groceries")
                .description("Weekly shop"),
            &mut connection,
            &TracingEventSink::default(),
        )
        .unwrap();

        assert_eq!(transaction.amount, Money::from_minor_units(15_000));
        assert_eq!(transaction.category, "groceries");
        assert_eq!(transaction.description, "Weekly shop");
        let account = get_account(user.id, account.id, &connection).unwrap();
        assert_eq!(account.balance, Money::from_minor_units(85_000));
    }

    #[test]
    fn income_increases_balance() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account = must_create_account(&user, "Everyday", "0.10", false, &mut connection);

        create_transaction(
            user.id,
            &Transaction::build(account.id, TransactionType::Income, "0.20", date!(2025 - 10 - 05)),
            &mut connection,
            &TracingEventSink::default(),
        )
        .unwrap();

        let account = get_account(user.id, account.id, &connection).unwrap();
        assert_eq!(account.balance, Money::from_minor_units(30));
    }

    #[test]
    fn foreign_account_is_rejected_without_writes() {
        let mut connection = get_test_connection();
        let alice = must_provision_user("alice", &connection);
        let bob = must_provision_user("bob", &connection);
        let bobs = must_create_account(&bob, "Bob's", "100", false, &mut connection);

        let result = create_transaction(
            alice.id,
            &Transaction::build(bobs.id, TransactionType::Expense, "10", date!(2025 - 10 - 05)),
            &mut connection,
            &TracingEventSink::default(),
        );

        assert_eq!(result, Err(Error::AccountNotFound));
        let bobs = get_account(bob.id, bobs.id, &connection).unwrap();
        assert_eq!(bobs.balance, Money::from_minor_units(10_000));
        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM \"transaction\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn balance_beyond_limit_is_rejected_without_writes() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account =
            must_create_account(&user, "Everyday", "999999999999.99", false, &mut connection);

        let result = create_transaction(
            user.id,
            &Transaction::build(account.id, TransactionType::Income, "0.01", date!(2025 - 10 - 05)),
            &mut connection,
            &TracingEventSink::default(),
        );

        assert_eq!(result, Err(Error::InvalidAmount("0.01".to_owned())));
        let account = get_account(user.id, account.id, &connection).unwrap();
        assert_eq!(account.balance, Money::MAX);
        assert_eq!(list_accounts(user.id, &connection).unwrap().len(), 1);
        let count: i64 = connection
            .query_row("SELECT COUNT(*) FROM \"transaction\"", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn amount_beyond_limit_is_rejected() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account = must_create_account(&user, "Everyday", "0", false, &mut connection);

        let result = create_transaction(
            user.id,
            &Transaction::build(
                account.id,
                TransactionType::Income,
                "90000000000000000",
                date!(2025 - 10 - 05),
            ),
            &mut connection,
            &TracingEventSink::default(),
        );

        assert_eq!(
            result,
            Err(Error::InvalidAmount("90000000000000000".to_owned()))
        );
        let account = get_account(user.id, account.id, &connection).unwrap();
        assert_eq!(account.balance, Money::ZERO);
    }

    #[test]
    fn recurring_transaction_publishes_event() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account = must_create_account(&user, "Everyday", "0", false, &mut connection);
        let sink = RecordingEventSink::default();

        let transaction = create_transaction(
            user.id,
            &Transaction::build(account.id, TransactionType::Expense, "1200", date!(2025 - 10 - 01))
                .category("housing")
                .recurring(RecurringInterval::Monthly),
            &mut connection,
            &sink,
        )
        .unwrap();

        assert_eq!(transaction.next_recurring_date, Some(date!(2025 - 11 - 01)));
        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].transaction_id, transaction.id);
        assert_eq!(events[0].next_date, date!(2025 - 11 - 01));
    }

    #[test]
    fn invalid_transaction_publishes_nothing() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account = must_create_account(&user, "Everyday", "0", false, &mut connection);
        let sink = RecordingEventSink::default();
        let mut builder =
            Transaction::build(account.id, TransactionType::Expense, "10", date!(2025 - 10 - 01));
        builder.is_recurring = true;

        let result = create_transaction(user.id, &builder, &mut connection, &sink);

        assert_eq!(result, Err(Error::InvalidInterval));
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn endpoint_responds_with_created_transaction() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account = must_create_account(&user, "Everyday", "0", false, &mut connection);
        let state = TransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            event_sink: Arc::new(TracingEventSink::default()),
        };

        let response = create_transaction_endpoint(
            State(state),
            CurrentUser(user),
            JsonBody(Transaction::build(
                account.id,
                TransactionType::Income,
                "99.99",
                date!(2025 - 10 - 05),
            )),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["transaction"]["type"], "INCOME");
        assert_eq!(body["transaction"]["amount"], 99.99);
        assert_eq!(body["transaction"]["date"], "2025-10-05");
        assert_eq!(body["transaction"]["recurring_interval"], serde_json::Value::Null);
    }
}
