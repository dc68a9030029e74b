//! Defines the endpoint for choosing a user's default account.

use axum::{extract::State, http::StatusCode, response::Response};
use rusqlite::Connection;

use crate::{
    Error,
    account::{
        Account, AccountState,
        core::{clear_default_accounts, get_account},
    },
    database_id::AccountId,
    db::{lock_connection, with_storage_transaction},
    identity::CurrentUser,
    response::{PathParam, success},
    user::UserID,
};

/// A route handler that makes an account the requester's default account.
pub async fn set_default_account_endpoint(
    State(state): State<AccountState>,
    CurrentUser(user): CurrentUser,
    PathParam(account_id): PathParam<AccountId>,
) -> Result<Response, Error> {
    let mut connection = lock_connection(&state.db_connection)?;

    let account = set_default_account(user.id, account_id, &mut connection)?;

    Ok(success(StatusCode::OK, "account", &account))
}

/// Make `account_id` the only default account of `owner`.
///
/// Setting the current default again changes nothing.
///
/// # Errors
/// Returns a:
/// - [Error::AccountNotFound] if `account_id` is not one of `owner`'s accounts,
/// - or [Error::StorageFailure] if there is an SQL error.
pub fn set_default_account(
    owner: UserID,
    account_id: AccountId,
    connection: &mut Connection,
) -> Result<Account, Error> {
    with_storage_transaction(connection, |transaction| {
        get_account(owner, account_id, transaction)?;

        clear_default_accounts(owner, transaction)?;
        transaction.execute(
            "UPDATE account SET is_default = 1 WHERE id = ?1 AND user_id = ?2",
            (account_id, owner),
        )?;

        get_account(owner, account_id, transaction)
    })
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        account::{list_accounts, set_default_account},
        db::get_test_connection,
        test_utils::{must_create_account, must_provision_user},
    };

    #[test]
    fn moves_default_to_account() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let first = must_create_account(&user, "First", "0", false, &mut connection);
        let second = must_create_account(&user, "Second", "0", false, &mut connection);

        let got = set_default_account(user.id, second.id, &mut connection).unwrap();

        assert!(got.is_default);
        let accounts = list_accounts(user.id, &connection).unwrap();
        let defaults: Vec<_> = accounts.iter().filter(|a| a.is_default).map(|a| a.id).collect();
        assert_eq!(defaults, vec![second.id]);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn is_idempotent() {
        let mut connection = get_test_connection();
        let user = must_provision_user("alice", &connection);
        let account = must_create_account(&user, "First", "0", false, &mut connection);

        let once = set_default_account(user.id, account.id, &mut connection).unwrap();
        let twice = set_default_account(user.id, account.id, &mut connection).unwrap();

        assert_eq!(once, twice);
        assert!(twice.is_default);
    }

    #[test]
    fn rejects_foreign_account_without_changes() {
        let mut connection = get_test_connection();
        let alice = must_provision_user("alice", &connection);
        let bob = must_provision_user("bob", &connection);
        let alices = must_create_account(&alice, "Alice's", "0", false, &mut connection);
        let bobs = must_create_account(&bob, "Bob's", "0", false, &mut connection);

        let result = set_default_account(alice.id, bobs.id, &mut connection);

        assert_eq!(result, Err(Error::AccountNotFound));
        assert!(list_accounts(alice.id, &connection).unwrap()[0].is_default);
        assert_eq!(list_accounts(alice.id, &connection).unwrap()[0].id, alices.id);
        assert!(list_accounts(bob.id, &connection).unwrap()[0].is_default);
    }
}
