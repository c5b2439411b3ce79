//! JSON request and response bodies.

use chrono::{DateTime, Utc};
use deeds_engine::{MemberStatus, RoundProgress};
use deeds_storage::{Assignment, AssignmentEvent, DeedTemplate, Group, Member, Round};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ───────────────────────────────────── Requests ───────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenameUserRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoundRequest {
    pub name: String,
}

/// `?user_id=` on endpoints acting for a specific member.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ViewerQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AdvanceQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub giver_id: Uuid,
    pub proof: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub verifier_id: Uuid,
    /// `approve` or `reject`
    pub decision: String,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DescribeRequest {
    pub user_id: Uuid,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetTemplateActiveRequest {
    pub active: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TemplatesQuery {
    /// Include retired templates.
    pub all: Option<bool>,
}

// ───────────────────────────────────── Responses ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberResponse {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(m: Member) -> Self {
        Self {
            id: m.id.0,
            name: m.name,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupResponse {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<Group> for GroupResponse {
    fn from(g: Group) -> Self {
        Self {
            id: g.id.0,
            name: g.name,
            owner_id: g.owner_id.0,
            created_at: g.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundResponse {
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub status: String,
    pub access_code: Option<String>,
    pub successor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<Round> for RoundResponse {
    fn from(r: Round) -> Self {
        Self {
            id: r.id.0,
            group_id: r.group_id.0,
            name: r.name,
            status: r.status.as_str().to_string(),
            access_code: r.access_code,
            successor_id: r.successor_id.map(|id| id.0),
            created_at: r.created_at,
            started_at: r.started_at,
            closed_at: r.closed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentResponse {
    pub id: Uuid,
    pub round_id: Uuid,
    pub giver_id: Uuid,
    pub recipient_id: Uuid,
    pub description: String,
    pub state: String,
    pub proof: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub verified_by: Option<Uuid>,
    pub rejection_count: u32,
    pub created_at: DateTime<Utc>,
}

impl From<Assignment> for AssignmentResponse {
    fn from(a: Assignment) -> Self {
        Self {
            id: a.id.0,
            round_id: a.round_id.0,
            giver_id: a.giver_id.0,
            recipient_id: a.recipient_id.0,
            description: a.description,
            state: a.state.as_str().to_string(),
            proof: a.proof,
            submitted_at: a.submitted_at,
            completed_at: a.completed_at,
            verified_by: a.verified_by.map(|id| id.0),
            rejection_count: a.rejection_count,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentEventResponse {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub kind: String,
    pub actor_id: Uuid,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AssignmentEvent> for AssignmentEventResponse {
    fn from(e: AssignmentEvent) -> Self {
        Self {
            id: e.id.0,
            assignment_id: e.assignment_id.0,
            kind: e.kind.as_str().to_string(),
            actor_id: e.actor_id.0,
            note: e.note,
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateResponse {
    pub id: Uuid,
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<DeedTemplate> for TemplateResponse {
    fn from(t: DeedTemplate) -> Self {
        Self {
            id: t.id.0,
            description: t.description,
            active: t.active,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberStatusResponse {
    pub member_id: Uuid,
    pub name: String,
    pub completed: bool,
    pub state: String,
    pub deed_description: String,
    pub proof: Option<String>,
}

impl From<MemberStatus> for MemberStatusResponse {
    fn from(s: MemberStatus) -> Self {
        Self {
            member_id: s.member_id.0,
            name: s.name,
            completed: s.completed,
            state: s.state.as_str().to_string(),
            deed_description: s.deed_description,
            proof: s.proof,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundProgressResponse {
    pub completed_count: usize,
    pub total_members: usize,
    pub all_complete: bool,
    pub round_completed: bool,
    pub new_round_id: Option<Uuid>,
    pub show_celebration: bool,
}

impl From<RoundProgress> for RoundProgressResponse {
    fn from(p: RoundProgress) -> Self {
        Self {
            completed_count: p.completed_count,
            total_members: p.total_count,
            all_complete: p.all_complete,
            round_completed: p.round_closed,
            new_round_id: p.successor_id.map(|id| id.0),
            show_celebration: p.show_celebration,
        }
    }
}

pub fn list<T, R: From<T>>(items: Vec<T>) -> Vec<R> {
    items.into_iter().map(R::from).collect()
}
