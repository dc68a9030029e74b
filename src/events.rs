//! Events handed to the external task dispatcher that runs recurring transactions.

use std::{fmt::Debug, time::Duration};

use serde::Serialize;
use time::Date;

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{RecurringInterval, Transaction},
    user::UserID,
};

/// Published after a recurring transaction has been committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringTransactionCreated {
    pub transaction_id: TransactionId,
    pub user_id: UserID,
    pub interval: RecurringInterval,
    /// When the dispatcher should create the next occurrence.
    pub next_date: Date,
}

impl RecurringTransactionCreated {
    /// The event for `transaction`, or `None` if it does not recur.
    pub fn for_transaction(transaction: &Transaction) -> Option<Self> {
        Some(Self {
            transaction_id: transaction.id,
            user_id: transaction.user_id,
            interval: transaction.recurring_interval?,
            next_date: transaction.next_recurring_date?,
        })
    }
}

/// How the dispatcher retries a failed job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    /// The total number of attempts, including the first.
    pub max_attempts: u32,
}

impl RetryPolicy {
    /// The delay before retrying after failed attempt number `attempt`
    /// (starting from 1), or `None` once no attempts remain.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        2u64.checked_pow(attempt).map(Duration::from_secs)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

/// Somewhere to send events for the task dispatcher.
pub trait EventSink: Debug + Send + Sync {
    /// Hand `event` to the dispatcher.
    ///
    /// # Errors
    /// Returns [Error::EventPublishError] if the event was not accepted.
    fn publish(&self, event: &RecurringTransactionCreated) -> Result<(), Error>;
}

/// An event sink that writes events to the log instead of a dispatcher.
#[derive(Debug, Clone, Default)]
pub struct TracingEventSink {
    retry_policy: RetryPolicy,
}

impl TracingEventSink {
    pub fn new(retry_policy: RetryPolicy) -> Self {
        Self { retry_policy }
    }
}

impl EventSink for TracingEventSink {
    fn publish(&self, event: &RecurringTransactionCreated) -> Result<(), Error> {
        let payload = serde_json::to_string(event)
            .map_err(|error| Error::EventPublishError(error.to_string()))?;

        tracing::info!(
            max_attempts = self.retry_policy.max_attempts,
            "Published recurring transaction event: {payload}"
        );

        Ok(())
    }
}

/// Publish the event for `transaction` if it recurs.
///
/// The transaction has already been committed, so failures are logged and
/// otherwise ignored.
pub fn publish_recurring_transaction(event_sink: &dyn EventSink, transaction: &Transaction) {
    let Some(event) = RecurringTransactionCreated::for_transaction(transaction) else {
        return;
    };

    if let Err(error) = event_sink.publish(&event) {
        tracing::error!(
            "Could not publish event for recurring transaction {}: {error}",
            transaction.id
        );
    }
}
