pub(crate) mod fixtures;
pub(crate) mod http;

pub(crate) use fixtures::{must_create_account, must_create_transaction, must_provision_user};
pub(crate) use http::json_body;
