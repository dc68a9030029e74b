//! Database initialisation and the storage transaction helper.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, budget::create_budget_table,
    transaction::create_transaction_table, user::create_user_table,
};

/// Create the application's tables if they do not exist and enable foreign keys.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Must be set outside of a transaction, it is a no-op otherwise.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_account_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Run `unit_of_work` inside a single storage transaction.
///
/// The transaction takes the database write lock up front and is committed
/// only if `unit_of_work` returns `Ok`. Any error rolls back every write made
/// by `unit_of_work`.
///
/// # Errors
/// Returns the error from `unit_of_work`, or an SQL error if the transaction
/// cannot be started or committed.
pub fn with_storage_transaction<T>(
    connection: &mut Connection,
    unit_of_work: impl FnOnce(&SqlTransaction) -> Result<T, Error>,
) -> Result<T, Error> {
    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    // Dropping an uncommitted transaction rolls it back.
    let result = unit_of_work(&transaction)?;

    transaction.commit()?;

    Ok(result)
}

/// Acquire the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub fn lock_connection(
    db_connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}

#[cfg(test)]
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().unwrap();
    initialize(&connection).unwrap();
    connection
}
