//! Defines the endpoint for deleting an account.

use axum::{extract::State, http::StatusCode, response::Response};
use rusqlite::Connection;

use crate::{
    Error,
    account::{Account, AccountState, core::get_account},
    database_id::AccountId,
    db::{lock_connection, with_storage_transaction},
    identity::CurrentUser,
    response::{PathParam, success},
    user::UserID,
};

/// A route handler for deleting an account, responds with the deleted account.
pub async fn delete_account_endpoint(
    State(state): State<AccountState>,
    CurrentUser(user): CurrentUser,
    PathParam(account_id): PathParam<AccountId>,
) -> Result<Response, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    let account = delete_account(user.id, account_id, &mut connection)
        .inspect_err(|error| tracing::warn!("Could not delete account {account_id}: {error}"))?;

    Ok(success(StatusCode::OK, "account", &account))
}

/// Delete `owner`'s account `account_id` along with its transactions.
///
/// If the account was the default, the most recently created remaining
/// account becomes the default.
///
/// # Errors
/// Returns a:
/// - [Error::AccountNotFound] if `account_id` is not one of `owner`'s accounts,
/// - or [Error::StorageFailure] if there is an SQL error.
pub fn delete_account(
    owner: UserID,
    account_id: AccountId,
    connection: &mut Connection,
) -> Result<Account, Error> {
    with_storage_transaction(connection, |transaction| {
        let account = get_account(owner, account_id, transaction)?;

        // Transactions are removed by the foreign key cascade.
        transaction.execute("DELETE FROM account WHERE id = ?1", [account_id])?;

        if account.is_default {
            transaction.execute(
                "UPDATE account SET is_default = 1
                 WHERE id = (
                    SELECT id FROM account WHERE user_id = ?1
                    ORDER BY created_at DESC, id DESC
                    LIMIT 1
                 )",
                [owner],
            )?;
        }

        tracing::info!("Deleted account {account_id} of user {owner}");

        Ok(account)
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use rusqlite::Connection;

    use crate::{
        Error,
        account::{delete_account, list_accounts, set_default_account},
        db::get_test_connection,
        test_utils::{must_create_account, must_create_transaction, must_provision_user},
        transaction::{Transaction, TransactionType, get_transaction},
        user::User,
    };

    /// A user with accounts has exactly one default, a user without has none.
    #[track_caller]
    fn assert_single_default(user: &User, connection: &Connection) -> Option<i64> {
        let accounts = list_accounts(user.id, connection).unwrap();
        let defaults: Vec<_> = accounts.iter().filter(|a| a.is_default).map(|a| a.id).collect();

        if accounts.is_empty() {
            assert!(defaults.is_empty());
            None
        } else {
            assert_eq!(defaults.len(), 1, "want one default, got {defaults:?}");
            Some(defaults[0])
        }
    }

    #[test]
    fn deletes_account_and_its_transactions() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account = must_create_account(&user, "Everyday", "100", false, &mut connection);
        let transaction = must_create_transaction(
            &user,
            Transaction::build(account.id, TransactionType::Expense, "10", date!(2025 - 10 - 01)),
            &mut connection,
        );

        let deleted = delete_account(user.id, account.id, &mut connection).unwrap();

        assert_eq!(deleted.id, account.id);
        assert_eq!(list_accounts(user.id, &connection), Ok(vec![]));
        assert_eq!(
            get_transaction(user.id, transaction.id, &connection),
            Err(Error::TransactionNotFound)
        );
    }

    #[test]
    fn promotes_newest_remaining_account_when_default_is_deleted() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let default = must_create_account(&user, "Default", "0", false, &mut connection);
        must_create_account(&user, "Older", "0", false, &mut connection);
        let newest = must_create_account(&user, "Newest", "0", false, &mut connection);

        delete_account(user.id, default.id, &mut connection).unwrap();

        let accounts = list_accounts(user.id, &connection).unwrap();
        let defaults: Vec<_> = accounts.iter().filter(|a| a.is_default).map(|a| a.id).collect();
        assert_eq!(defaults, vec![newest.id]);
    }

    #[test]
    fn deleting_other_account_keeps_default() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let default = must_create_account(&user, "Default", "0", false, &mut connection);
        let other = must_create_account(&user, "Other", "0", false, &mut connection);

        delete_account(user.id, other.id, &mut connection).unwrap();

        let accounts = list_accounts(user.id, &connection).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].id, default.id);
        assert!(accounts[0].is_default);
    }

    #[test]
    fn single_default_survives_mixed_changes() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);

        let first = must_create_account(&user, "First", "0", false, &mut connection);
        assert_eq!(assert_single_default(&user, &connection), Some(first.id));
        let second = must_create_account(&user, "Second", "0", true, &mut connection);
        assert_eq!(assert_single_default(&user, &connection), Some(second.id));
        let third = must_create_account(&user, "Third", "0", false, &mut connection);
        assert_eq!(assert_single_default(&user, &connection), Some(second.id));

        set_default_account(user.id, first.id, &mut connection).unwrap();
        assert_eq!(assert_single_default(&user, &connection), Some(first.id));

        delete_account(user.id, first.id, &mut connection).unwrap();
        assert_eq!(assert_single_default(&user, &connection), Some(third.id));

        let fourth = must_create_account(&user, "Fourth", "0", false, &mut connection);
        delete_account(user.id, second.id, &mut connection).unwrap();
        assert_eq!(assert_single_default(&user, &connection), Some(third.id));

        delete_account(user.id, third.id, &mut connection).unwrap();
        assert_eq!(assert_single_default(&user, &connection), Some(fourth.id));

        delete_account(user.id, fourth.id, &mut connection).unwrap();
        assert_eq!(assert_single_default(&user, &connection), None);

        let fifth = must_create_account(&user, "Fifth", "0", false, &mut connection);
        assert_eq!(assert_single_default(&user, &connection), Some(fifth.id));
    }

    #[test]
    fn rejects_foreign_account() {
        let mut connection = get_test_connection();
        let alice = must_provision_user("alice", &connection);
        let bob = must_provision_user("bob", &connection);
        let bobs = must_create_account(&bob, "Bob's", "0", false, &mut connection);

        assert_eq!(
            delete_account(alice.id, bobs.id, &mut connection),
            Err(Error::AccountNotFound)
        );
        assert_eq!(list_accounts(bob.id, &connection).unwrap().len(), 1);
    }
}
