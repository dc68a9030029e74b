//! Defines the session token carried in the identity cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::user::ExternalId;

/// A session issued by the identity provider.
///
/// The expiry is serialized as RFC 3339 so that midnight round-trips with two
/// digit hours.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct SessionToken {
    pub external_id: ExternalId,

    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl SessionToken {
    /// Whether the session is still valid at `now`.
    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at > now
    }
}
