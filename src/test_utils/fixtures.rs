use rusqlite::Connection;

use crate::{
    account::{Account, AccountType, NewAccount, create_account},
    events::TracingEventSink,
    transaction::{Transaction, TransactionBuilder, create_transaction},
    user::{ExternalId, User, provision_user},
};

#[track_caller]
pub(crate) fn must_provision_user(external_id: &str, connection: &Connection) -> User {
    provision_user(&ExternalId::new(external_id), connection)
        .expect("Could not provision test user")
}

#[track_caller]
pub(crate) fn must_create_account(
    user: &User,
    name: &str,
    balance: &str,
    is_default: bool,
    connection: &mut Connection,
) -> Account {
    create_account(
        user.id,
        &NewAccount {
            name: name.to_owned(),
            account_type: AccountType::Current,
            balance: balance.into(),
            is_default,
        },
        connection,
    )
    .expect("Could not create test account")
}

#[track_caller]
pub(crate) fn must_create_transaction(
    user: &User,
    builder: TransactionBuilder,
    connection: &mut Connection,
) -> Transaction {
    create_transaction(user.id, &builder, connection, &TracingEventSink::default())
        .expect("Could not create test transaction")
}
