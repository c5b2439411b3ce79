//! Member types.

use chrono::{DateTime, Utc};

use super::MemberId;

/// Member record. Names are unique across the service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
