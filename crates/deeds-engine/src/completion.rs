//! Completion tracker.
//!
//! ```text
//! pending ──claim──► submitted ──approve──► completed
//!    ▲                   │
//!    │                reject
//!    │                   ▼
//!    └──── (actionable) rejected ──claim──► submitted
//! ```
//!
//! Under [`CompletionPolicy::Direct`] a claim goes straight to `completed`.

use std::str::FromStr;

use chrono::Utc;
use deeds_storage::{
    Assignment, AssignmentEvent, AssignmentEventKind, AssignmentId, AssignmentState, MemberId,
    Round, RoundId, RoundStatus, Store, UpdateAssignmentParams,
};
use metrics::counter;
use tracing::{debug, info};

use crate::error::StoreResultExt;
use crate::{CompletionPolicy, EngineError, RoundEngine};

/// A verifier's verdict on a submitted deed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

/// Error type for parsing Decision from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecisionError(pub String);

impl std::fmt::Display for ParseDecisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid decision: {} (expected 'approve' or 'reject')", self.0)
    }
}

impl std::error::Error for ParseDecisionError {}

impl FromStr for Decision {
    type Err = ParseDecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" | "approved" => Ok(Decision::Approve),
            "reject" | "rejected" => Ok(Decision::Reject),
            _ => Err(ParseDecisionError(s.to_string())),
        }
    }
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }
}

fn clean_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

impl<S: Store> RoundEngine<S> {
    /// Load a round and require it to be `started`.
    pub(crate) async fn require_started_round(&self, round_id: &RoundId) -> Result<Round, EngineError> {
        let round = self.store.get_round(round_id).await.or_not_found("round")?;
        if round.status != RoundStatus::Started {
            return Err(EngineError::InvalidState(format!(
                "round is {}",
                round.status.as_str()
            )));
        }
        Ok(round)
    }

    /// Giver claims the deed is done, optionally with proof.
    pub async fn submit_for_completion(
        &self,
        assignment_id: &AssignmentId,
        giver_id: &MemberId,
        proof: Option<&str>,
    ) -> Result<Assignment, EngineError> {
        self.claim(assignment_id, giver_id, clean_text(proof)).await
    }

    /// Giver marks the deed done without proof.
    pub async fn complete_deed(
        &self,
        assignment_id: &AssignmentId,
        giver_id: &MemberId,
    ) -> Result<Assignment, EngineError> {
        self.claim(assignment_id, giver_id, None).await
    }

    /// The single giver-side transition. Its target depends on the policy.
    async fn claim(
        &self,
        assignment_id: &AssignmentId,
        giver_id: &MemberId,
        proof: Option<String>,
    ) -> Result<Assignment, EngineError> {
        let assignment = self
            .store
            .get_assignment(assignment_id)
            .await
            .or_not_found("deed")?;
        if assignment.giver_id != *giver_id {
            return Err(EngineError::NotAuthorized(
                "only the giver can complete this deed".into(),
            ));
        }
        self.require_started_round(&assignment.round_id).await?;
        if !assignment.state.is_actionable() {
            return Err(EngineError::InvalidState(format!(
                "deed is already {}",
                assignment.state.as_str()
            )));
        }

        let now = Utc::now();
        let (state, event, completed_at) = match self.config.completion_policy {
            CompletionPolicy::Direct => (
                AssignmentState::Completed,
                AssignmentEventKind::Completed,
                Some(now),
            ),
            CompletionPolicy::Verified => (
                AssignmentState::Submitted,
                AssignmentEventKind::Submitted,
                None,
            ),
        };

        let updated = self
            .store
            .update_assignment(&UpdateAssignmentParams {
                id: *assignment_id,
                expected: vec![AssignmentState::Pending, AssignmentState::Rejected],
                state,
                proof,
                submitted_at: Some(now),
                completed_at,
                verified_by: None,
                increment_rejections: false,
                actor_id: *giver_id,
                event,
                note: None,
            })
            .await
            .or_lost_race("deed", "deed was already claimed")?;
        if updated.state == AssignmentState::Completed {
            counter!("deeds_completed_total").increment(1);
        }

        info!(
            assignment_id = %assignment_id.0,
            state = updated.state.as_str(),
            "Deed claimed"
        );
        Ok(updated)
    }

    /// Approve or reject a submitted deed.
    ///
    /// The recipient may verify; so may the group owner when
    /// `owner_can_verify` is set.
    pub async fn verify(
        &self,
        assignment_id: &AssignmentId,
        verifier_id: &MemberId,
        decision: Decision,
        note: Option<&str>,
    ) -> Result<Assignment, EngineError> {
        let assignment = self
            .store
            .get_assignment(assignment_id)
            .await
            .or_not_found("deed")?;
        let round = self.require_started_round(&assignment.round_id).await?;

        let is_recipient = assignment.recipient_id == *verifier_id;
        let is_owner = if self.config.owner_can_verify && !is_recipient {
            let group = self
                .store
                .get_group(&round.group_id)
                .await
                .or_not_found("group")?;
            group.owner_id == *verifier_id
        } else {
            false
        };
        if !is_recipient && !is_owner {
            return Err(EngineError::NotAuthorized(
                "only the recipient can verify this deed".into(),
            ));
        }

        if assignment.state != AssignmentState::Submitted {
            return Err(EngineError::InvalidState(format!(
                "deed is {}, not submitted",
                assignment.state.as_str()
            )));
        }

        let now = Utc::now();
        let params = match decision {
            Decision::Approve => UpdateAssignmentParams {
                id: *assignment_id,
                expected: vec![AssignmentState::Submitted],
                state: AssignmentState::Completed,
                proof: assignment.proof.clone(),
                submitted_at: assignment.submitted_at,
                completed_at: Some(now),
                verified_by: Some(*verifier_id),
                increment_rejections: false,
                actor_id: *verifier_id,
                event: AssignmentEventKind::Approved,
                note: clean_text(note),
            },
            Decision::Reject => UpdateAssignmentParams {
                id: *assignment_id,
                expected: vec![AssignmentState::Submitted],
                state: AssignmentState::Rejected,
                proof: None,
                submitted_at: None,
                completed_at: None,
                verified_by: Some(*verifier_id),
                increment_rejections: true,
                actor_id: *verifier_id,
                event: AssignmentEventKind::Rejected,
                note: clean_text(note),
            },
        };

        let updated = self
            .store
            .update_assignment(&params)
            .await
            .or_lost_race("deed", "deed was already verified")?;
        if updated.state == AssignmentState::Completed {
            counter!("deeds_completed_total").increment(1);
        }

        info!(
            assignment_id = %assignment_id.0,
            decision = decision.as_str(),
            "Deed verified"
        );
        Ok(updated)
    }

    /// The deed a member gives in a round.
    pub async fn get_my_deed(
        &self,
        round_id: &RoundId,
        member_id: &MemberId,
    ) -> Result<Assignment, EngineError> {
        self.store.get_round(round_id).await.or_not_found("round")?;
        self.store
            .get_assignment_for_giver(round_id, member_id)
            .await
            .or_not_found("deed")
    }

    pub async fn get_deed(&self, assignment_id: &AssignmentId) -> Result<Assignment, EngineError> {
        self.store
            .get_assignment(assignment_id)
            .await
            .or_not_found("deed")
    }

    /// Submitted deeds in a round that this member may verify.
    pub async fn pending_verifications(
        &self,
        round_id: &RoundId,
        member_id: &MemberId,
    ) -> Result<Vec<Assignment>, EngineError> {
        let round = self.store.get_round(round_id).await.or_not_found("round")?;
        let is_owner = if self.config.owner_can_verify {
            let group = self
                .store
                .get_group(&round.group_id)
                .await
                .or_not_found("group")?;
            group.owner_id == *member_id
        } else {
            false
        };

        let pending: Vec<_> = self
            .store
            .list_assignments(round_id)
            .await?
            .into_iter()
            .filter(|a| a.state == AssignmentState::Submitted)
            .filter(|a| is_owner || a.recipient_id == *member_id)
            .collect();
        debug!(round_id = %round_id.0, count = pending.len(), "Pending verifications");
        Ok(pending)
    }

    /// Every recorded transition of a deed, oldest first.
    pub async fn assignment_history(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<Vec<AssignmentEvent>, EngineError> {
        self.store
            .get_assignment(assignment_id)
            .await
            .or_not_found("deed")?;
        Ok(self.store.list_assignment_events(assignment_id).await?)
    }
}
