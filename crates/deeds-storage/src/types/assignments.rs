//! Assignment types: a giver's deed for a recipient within one round.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{AssignmentEventId, AssignmentId, MemberId, RoundId};

/// Completion state of an assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignmentState {
    Pending,
    /// Giver claimed completion; awaiting the verifier.
    Submitted,
    Completed,
    /// Verifier rejected the submission; the giver may resubmit.
    Rejected,
}

/// Error type for parsing AssignmentState from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAssignmentStateError(pub String);

impl std::fmt::Display for ParseAssignmentStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid assignment state: {}", self.0)
    }
}

impl std::error::Error for ParseAssignmentStateError {}

impl FromStr for AssignmentState {
    type Err = ParseAssignmentStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AssignmentState::Pending),
            "submitted" => Ok(AssignmentState::Submitted),
            "completed" => Ok(AssignmentState::Completed),
            "rejected" => Ok(AssignmentState::Rejected),
            _ => Err(ParseAssignmentStateError(s.to_string())),
        }
    }
}

impl AssignmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentState::Pending => "pending",
            AssignmentState::Submitted => "submitted",
            AssignmentState::Completed => "completed",
            AssignmentState::Rejected => "rejected",
        }
    }

    /// States from which the giver may claim the deed.
    pub fn is_actionable(&self) -> bool {
        matches!(self, AssignmentState::Pending | AssignmentState::Rejected)
    }
}

/// Assignment record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub id: AssignmentId,
    pub round_id: RoundId,
    pub giver_id: MemberId,
    pub recipient_id: MemberId,
    /// Empty when no template was available at round start.
    pub description: String,
    pub state: AssignmentState,
    pub proof: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub verified_by: Option<MemberId>,
    pub rejection_count: u32,
    pub created_at: DateTime<Utc>,
}

/// Kind of a recorded assignment transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignmentEventKind {
    Submitted,
    Approved,
    Rejected,
    Completed,
    Described,
}

/// Error type for parsing AssignmentEventKind from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAssignmentEventKindError(pub String);

impl std::fmt::Display for ParseAssignmentEventKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid assignment event kind: {}", self.0)
    }
}

impl std::error::Error for ParseAssignmentEventKindError {}

impl FromStr for AssignmentEventKind {
    type Err = ParseAssignmentEventKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(AssignmentEventKind::Submitted),
            "approved" => Ok(AssignmentEventKind::Approved),
            "rejected" => Ok(AssignmentEventKind::Rejected),
            "completed" => Ok(AssignmentEventKind::Completed),
            "described" => Ok(AssignmentEventKind::Described),
            _ => Err(ParseAssignmentEventKindError(s.to_string())),
        }
    }
}

impl AssignmentEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentEventKind::Submitted => "submitted",
            AssignmentEventKind::Approved => "approved",
            AssignmentEventKind::Rejected => "rejected",
            AssignmentEventKind::Completed => "completed",
            AssignmentEventKind::Described => "described",
        }
    }
}

/// History entry appended on every assignment transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentEvent {
    pub id: AssignmentEventId,
    pub assignment_id: AssignmentId,
    pub kind: AssignmentEventKind,
    pub actor_id: MemberId,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Compare-and-swap update of an assignment's completion fields.
///
/// Applied only when the stored state is one of `expected`; otherwise the
/// backend returns [`crate::StoreError::Conflict`]. `proof`, `submitted_at` and
/// `verified_by` are written as given (including `None`). `completed_at` is
/// only set when the row has none yet.
#[derive(Clone, Debug)]
pub struct UpdateAssignmentParams {
    pub id: AssignmentId,
    pub expected: Vec<AssignmentState>,
    pub state: AssignmentState,
    pub proof: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub verified_by: Option<MemberId>,
    pub increment_rejections: bool,
    pub actor_id: MemberId,
    pub event: AssignmentEventKind,
    pub note: Option<String>,
}

/// Replace an assignment's deed description while it is in one of `expected`.
#[derive(Clone, Debug)]
pub struct DescribeAssignmentParams {
    pub id: AssignmentId,
    pub expected: Vec<AssignmentState>,
    pub description: String,
    pub actor_id: MemberId,
}
