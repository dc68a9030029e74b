//! The dashboard: a user's recent transactions across all of their accounts.

mod handlers;

pub use handlers::get_dashboard_endpoint;
