//! Accounts: named money containers owned by a user, exactly one of which is
//! the user's default whenever the user has any.

mod core;
mod create_endpoint;
mod default_endpoint;
mod delete_endpoint;
mod detail_endpoint;
mod list_endpoint;

pub use core::{
    Account, AccountState, AccountType, create_account_table, get_account, list_accounts,
};
pub(crate) use core::adjust_account_balance;
pub use create_endpoint::{NewAccount, create_account, create_account_endpoint};
pub use default_endpoint::{set_default_account, set_default_account_endpoint};
pub use delete_endpoint::{delete_account, delete_account_endpoint};
pub use detail_endpoint::{AccountDetail, get_account_endpoint, get_account_with_transactions};
pub use list_endpoint::list_accounts_endpoint;
