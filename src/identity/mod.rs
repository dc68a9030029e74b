//! Resolves the external identity behind a request to an internal user.
//!
//! Authentication itself belongs to an external identity provider. This module
//! only reads the identity it attaches to requests and gates every other
//! operation on it.

mod extractor;
mod provider;
mod token;

pub use extractor::{CurrentIdentity, CurrentUser, resolve_user};
pub use provider::{
    CookieIdentityProvider, HeaderIdentityProvider, IdentityProvider, SESSION_COOKIE,
    issue_session_cookie,
};
pub use token::SessionToken;
