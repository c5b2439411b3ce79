//! Round types: one weekly cycle of the deed exchange for a group.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{GroupId, MemberId, RoundId};

/// Lifecycle status of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundStatus {
    /// Created, assignments not generated yet.
    Pending,
    /// Assignments generated; at most one per group.
    Started,
    /// Terminal. Closed rounds are history.
    Closed,
}

/// Error type for parsing RoundStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoundStatusError(pub String);

impl std::fmt::Display for ParseRoundStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid round status: {}", self.0)
    }
}

impl std::error::Error for ParseRoundStatusError {}

impl FromStr for RoundStatus {
    type Err = ParseRoundStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RoundStatus::Pending),
            "started" => Ok(RoundStatus::Started),
            "closed" => Ok(RoundStatus::Closed),
            _ => Err(ParseRoundStatusError(s.to_string())),
        }
    }
}

impl RoundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundStatus::Pending => "pending",
            RoundStatus::Started => "started",
            RoundStatus::Closed => "closed",
        }
    }
}

/// Round record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Round {
    pub id: RoundId,
    pub group_id: GroupId,
    pub name: String,
    pub status: RoundStatus,
    pub access_code: Option<String>,
    /// Forward pointer to the round created when this one was advanced.
    pub successor_id: Option<RoundId>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Parameters for creating a round (always created `pending`).
#[derive(Clone, Debug)]
pub struct CreateRoundParams {
    pub group_id: GroupId,
    pub name: String,
    pub access_code: Option<String>,
}

/// One giver → recipient pairing to persist when a round starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAssignment {
    pub giver_id: MemberId,
    pub recipient_id: MemberId,
    pub description: String,
}

/// Parameters for closing a completed round and starting its successor.
///
/// Backends must apply this atomically: the successor is only created by the
/// caller whose `started` → `closed` compare-and-swap on `round_id` succeeds.
#[derive(Clone, Debug)]
pub struct AdvanceRoundParams {
    pub round_id: RoundId,
    pub next: CreateRoundParams,
    pub assignments: Vec<NewAssignment>,
}

/// Result of [`crate::Store::advance_round`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// This caller closed the round and created the successor.
    Advanced(Round),
    /// Another caller already advanced the round; here is its successor.
    AlreadyAdvanced(RoundId),
}
