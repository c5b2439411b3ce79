//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait the round engine depends on.
///
/// Every state change that can race (round start/close/advance, assignment
/// transitions) is a compare-and-swap: backends apply it only when the stored
/// state matches, and report [`StoreError::Conflict`] otherwise.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Members ────────────────────────────────────────

    /// Look up a member by name, creating it if absent. Never creates duplicates.
    async fn create_member(&self, name: &str) -> Result<Member, StoreError>;

    /// Get member by ID.
    async fn get_member(&self, member_id: &MemberId) -> Result<Member, StoreError>;

    /// Get member by (exact) name.
    async fn get_member_by_name(&self, name: &str) -> Result<Member, StoreError>;

    /// List all members, oldest first.
    async fn list_members(&self) -> Result<Vec<Member>, StoreError>;

    /// Rename a member. Fails with `AlreadyExists` if the name is taken.
    async fn rename_member(&self, member_id: &MemberId, name: &str) -> Result<Member, StoreError>;

    // ───────────────────────────────────── Groups ─────────────────────────────────────────

    /// Create a group and add its owner as the first member.
    async fn create_group(&self, params: &CreateGroupParams) -> Result<Group, StoreError>;

    /// Get group by ID.
    async fn get_group(&self, group_id: &GroupId) -> Result<Group, StoreError>;

    /// Add a member to a group. Joining twice is a no-op.
    /// Fails with `NotFound` if either side does not exist.
    async fn add_group_member(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
    ) -> Result<(), StoreError>;

    /// List the members of a group in join order.
    async fn list_group_members(&self, group_id: &GroupId) -> Result<Vec<Member>, StoreError>;

    /// List all groups a member belongs to.
    async fn list_member_groups(&self, member_id: &MemberId) -> Result<Vec<Group>, StoreError>;

    // ───────────────────────────────────── Rounds ─────────────────────────────────────────

    /// Create a `pending` round.
    async fn create_round(&self, params: &CreateRoundParams) -> Result<Round, StoreError>;

    /// Get round by ID.
    async fn get_round(&self, round_id: &RoundId) -> Result<Round, StoreError>;

    /// List all rounds of a group, newest first.
    async fn list_rounds(&self, group_id: &GroupId) -> Result<Vec<Round>, StoreError>;

    /// Get the `started` round of a group.
    async fn get_active_round(&self, group_id: &GroupId) -> Result<Round, StoreError>;

    /// Move a round `pending` → `started` and persist its assignments atomically.
    ///
    /// `Conflict` if the round is not pending; `AlreadyExists` if its group
    /// already has a started round.
    async fn start_round(
        &self,
        round_id: &RoundId,
        assignments: &[NewAssignment],
    ) -> Result<Round, StoreError>;

    /// Move a round `started` → `closed` without a successor.
    async fn close_round(&self, round_id: &RoundId) -> Result<Round, StoreError>;

    /// Replace the access code of a `pending` round. `Conflict` otherwise.
    async fn set_access_code(&self, round_id: &RoundId, code: &str) -> Result<Round, StoreError>;

    /// Close a started round and create + start its successor in one transaction.
    async fn advance_round(&self, params: &AdvanceRoundParams)
        -> Result<AdvanceOutcome, StoreError>;

    // ───────────────────────────────────── Assignments ────────────────────────────────────

    /// List all assignments of a round, in creation order.
    async fn list_assignments(&self, round_id: &RoundId) -> Result<Vec<Assignment>, StoreError>;

    /// Get assignment by ID.
    async fn get_assignment(&self, assignment_id: &AssignmentId)
        -> Result<Assignment, StoreError>;

    /// Get the assignment a member gives in a round.
    async fn get_assignment_for_giver(
        &self,
        round_id: &RoundId,
        giver_id: &MemberId,
    ) -> Result<Assignment, StoreError>;

    /// Apply a compare-and-swap state change and append its history event.
    async fn update_assignment(
        &self,
        params: &UpdateAssignmentParams,
    ) -> Result<Assignment, StoreError>;

    /// Replace the deed description and append a `described` history event.
    async fn describe_assignment(
        &self,
        params: &DescribeAssignmentParams,
    ) -> Result<Assignment, StoreError>;

    /// List the history of an assignment, oldest first.
    async fn list_assignment_events(
        &self,
        assignment_id: &AssignmentId,
    ) -> Result<Vec<AssignmentEvent>, StoreError>;

    // ───────────────────────────────────── Templates ──────────────────────────────────────

    /// Add a deed template (active).
    async fn create_template(&self, description: &str) -> Result<DeedTemplate, StoreError>;

    /// List templates, oldest first, optionally only active ones.
    async fn list_templates(&self, active_only: bool) -> Result<Vec<DeedTemplate>, StoreError>;

    /// Activate or retire a template.
    async fn set_template_active(
        &self,
        template_id: &TemplateId,
        active: bool,
    ) -> Result<DeedTemplate, StoreError>;

    // ───────────────────────────────────── Celebrations ───────────────────────────────────

    /// Record that a member has seen the completion celebration of a round. Idempotent.
    async fn mark_celebration_seen(
        &self,
        round_id: &RoundId,
        member_id: &MemberId,
    ) -> Result<(), StoreError>;

    /// Whether a member has already seen the completion celebration of a round.
    async fn has_seen_celebration(
        &self,
        round_id: &RoundId,
        member_id: &MemberId,
    ) -> Result<bool, StoreError>;
}
