//! Deed allocator: attaches a deed description to every pairing, and the
//! operations that manage the template pool and hand-written descriptions.

use deeds_storage::{
    Assignment, AssignmentId, AssignmentState, DeedTemplate, DescribeAssignmentParams, MemberId,
    NewAssignment, Store, TemplateId,
};
use rand::{seq::IndexedRandom, Rng};
use tracing::{info, warn};

use crate::derangement::{derange, Pairing};
use crate::error::StoreResultExt;
use crate::{EngineError, RoundEngine};

/// Draw a description for each pairing, uniformly and with replacement.
///
/// An empty pool is not an error: every deed gets a blank description that the
/// group owner can fill in later.
pub fn allocate<R: Rng + ?Sized>(
    pairs: &[Pairing],
    templates: &[DeedTemplate],
    rng: &mut R,
) -> Vec<NewAssignment> {
    if templates.is_empty() && !pairs.is_empty() {
        warn!(
            pairings = pairs.len(),
            "No active deed templates; assigning blank deeds"
        );
    }

    pairs
        .iter()
        .map(|p| NewAssignment {
            giver_id: p.giver,
            recipient_id: p.recipient,
            description: templates
                .choose(rng)
                .map(|t| t.description.clone())
                .unwrap_or_default(),
        })
        .collect()
}

/// Derange `members` and allocate deeds with the thread RNG.
///
/// Synchronous so the RNG never lives across an `.await`.
pub(crate) fn plan_assignments(
    members: &[MemberId],
    templates: &[DeedTemplate],
) -> Result<Vec<NewAssignment>, EngineError> {
    let mut rng = rand::rng();
    let pairs = derange(members, &mut rng)?;
    Ok(allocate(&pairs, templates, &mut rng))
}

impl<S: Store> RoundEngine<S> {
    pub async fn create_template(&self, description: &str) -> Result<DeedTemplate, EngineError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(EngineError::InvalidInput(
                "template description must not be empty".into(),
            ));
        }
        let template = self.store.create_template(description).await?;
        info!(template_id = %template.id.0, "Deed template created");
        Ok(template)
    }

    pub async fn list_templates(&self, active_only: bool) -> Result<Vec<DeedTemplate>, EngineError> {
        Ok(self.store.list_templates(active_only).await?)
    }

    pub async fn set_template_active(
        &self,
        template_id: &TemplateId,
        active: bool,
    ) -> Result<DeedTemplate, EngineError> {
        let template = self
            .store
            .set_template_active(template_id, active)
            .await
            .or_not_found("template")?;
        info!(template_id = %template_id.0, active, "Deed template updated");
        Ok(template)
    }

    /// Let the group owner write (or replace) the description of a deed that
    /// has not been claimed yet.
    pub async fn describe_deed(
        &self,
        assignment_id: &AssignmentId,
        caller_id: &MemberId,
        description: &str,
    ) -> Result<Assignment, EngineError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(EngineError::InvalidInput(
                "deed description must not be empty".into(),
            ));
        }

        let assignment = self
            .store
            .get_assignment(assignment_id)
            .await
            .or_not_found("deed")?;
        let round = self.require_started_round(&assignment.round_id).await?;
        let group = self
            .store
            .get_group(&round.group_id)
            .await
            .or_not_found("group")?;
        if group.owner_id != *caller_id {
            return Err(EngineError::NotAuthorized(
                "only the group owner can describe deeds".into(),
            ));
        }
        if !assignment.state.is_actionable() {
            return Err(EngineError::InvalidState(format!(
                "deed is already {}",
                assignment.state.as_str()
            )));
        }

        let updated = self
            .store
            .describe_assignment(&DescribeAssignmentParams {
                id: *assignment_id,
                expected: vec![AssignmentState::Pending, AssignmentState::Rejected],
                description: description.to_string(),
                actor_id: *caller_id,
            })
            .await
            .or_lost_race("deed", "deed was claimed while being described")?;

        info!(assignment_id = %assignment_id.0, "Deed description updated");
        Ok(updated)
    }
}
