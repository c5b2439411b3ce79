//! Group types.

use chrono::{DateTime, Utc};

use super::{GroupId, MemberId};

/// Group record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub owner_id: MemberId,
    pub created_at: DateTime<Utc>,
}

/// Group membership record
#[derive(Clone, Debug)]
pub struct GroupMember {
    pub group_id: GroupId,
    pub member_id: MemberId,
    pub joined_at: DateTime<Utc>,
}

/// Parameters for creating a group. The owner becomes the first member.
#[derive(Clone, Debug)]
pub struct CreateGroupParams {
    pub name: String,
    pub owner_id: MemberId,
}
