//! Round lifecycle controller.
//!
//! A round is created `pending`, becomes `started` together with its
//! assignments, and ends `closed`. Advancing closes a fully completed round
//! and starts its successor in one store transaction; concurrent callers all
//! get the same successor back.

use std::collections::HashMap;

use deeds_storage::{
    AdvanceOutcome, AdvanceRoundParams, AssignmentState, CreateRoundParams, GroupId, MemberId,
    Round, RoundId, RoundStatus, Store, StoreError,
};
use metrics::counter;
use rand::Rng;
use tracing::{debug, info};

use crate::allocator::plan_assignments;
use crate::error::StoreResultExt;
use crate::{EngineError, RoundEngine};

/// Unambiguous characters only (no 0/O, 1/I).
pub const ACCESS_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const ACCESS_CODE_LEN: usize = 6;

pub fn access_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ACCESS_CODE_LEN)
        .map(|_| ACCESS_CODE_ALPHABET[rng.random_range(0..ACCESS_CODE_ALPHABET.len())] as char)
        .collect()
}

fn new_access_code() -> String {
    access_code(&mut rand::rng())
}

/// Completion summary of a round, as seen by one viewer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundProgress {
    pub completed_count: usize,
    pub total_count: usize,
    pub all_complete: bool,
    pub round_closed: bool,
    pub successor_id: Option<RoundId>,
    pub show_celebration: bool,
}

/// One member's row in a round status board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberStatus {
    pub member_id: MemberId,
    pub name: String,
    pub completed: bool,
    pub state: AssignmentState,
    pub deed_description: String,
    pub proof: Option<String>,
}

impl<S: Store> RoundEngine<S> {
    /// Create a `pending` round with a fresh access code.
    pub async fn create_round(&self, group_id: &GroupId, name: &str) -> Result<Round, EngineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidInput("round name must not be empty".into()));
        }
        self.store.get_group(group_id).await.or_not_found("group")?;

        let access_code = new_access_code();
        let round = self
            .store
            .create_round(&CreateRoundParams {
                group_id: *group_id,
                name: name.to_string(),
                access_code: Some(access_code),
            })
            .await
            .or_not_found("group")?;
        info!(round_id = %round.id.0, group_id = %group_id.0, "Round created");
        Ok(round)
    }

    /// Assign deeds to the group's current members and start the round.
    pub async fn start_round(&self, round_id: &RoundId) -> Result<Round, EngineError> {
        let round = self.store.get_round(round_id).await.or_not_found("round")?;
        if round.status != RoundStatus::Pending {
            return Err(EngineError::InvalidState(format!(
                "round is already {}",
                round.status.as_str()
            )));
        }

        let members: Vec<MemberId> = self
            .store
            .list_group_members(&round.group_id)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        let templates = self.store.list_templates(true).await?;
        let assignments = plan_assignments(&members, &templates)?;

        let started = match self.store.start_round(round_id, &assignments).await {
            Ok(round) => round,
            Err(StoreError::AlreadyExists) => {
                return Err(EngineError::InvalidState(
                    "group already has a started round".into(),
                ))
            }
            Err(e) => return Err(e).or_lost_race("round", "round is no longer pending"),
        };

        counter!("deeds_rounds_started_total").increment(1);
        info!(
            round_id = %round_id.0,
            group_id = %started.group_id.0,
            members = members.len(),
            "Round started"
        );
        Ok(started)
    }

    /// Create a round and start it straight away.
    ///
    /// Refused while the group has a started round. If starting fails for
    /// lack of members the round is left `pending` so it can be started later,
    /// and the error is returned.
    pub async fn open_round(&self, group_id: &GroupId, name: &str) -> Result<Round, EngineError> {
        match self.store.get_active_round(group_id).await {
            Ok(_) => {
                return Err(EngineError::InvalidState(
                    "group already has a started round".into(),
                ))
            }
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        let round = self.create_round(group_id, name).await?;
        self.start_round(&round.id).await
    }

    /// Owner-only: draw a new access code for a round that has not started.
    pub async fn regenerate_access_code(
        &self,
        round_id: &RoundId,
        caller_id: &MemberId,
    ) -> Result<Round, EngineError> {
        let round = self.store.get_round(round_id).await.or_not_found("round")?;
        self.require_owner(&round, caller_id, "only the group owner can change the access code")
            .await?;
        if round.status != RoundStatus::Pending {
            return Err(EngineError::InvalidState(format!(
                "round is {}",
                round.status.as_str()
            )));
        }

        let updated = self
            .store
            .set_access_code(round_id, &new_access_code())
            .await
            .or_lost_race("round", "round is no longer pending")?;
        info!(round_id = %round_id.0, "Access code regenerated");
        Ok(updated)
    }

    async fn require_owner(
        &self,
        round: &Round,
        caller_id: &MemberId,
        message: &str,
    ) -> Result<(), EngineError> {
        let group = self
            .store
            .get_group(&round.group_id)
            .await
            .or_not_found("group")?;
        if group.owner_id != *caller_id {
            return Err(EngineError::NotAuthorized(message.into()));
        }
        Ok(())
    }

    /// Completion summary. Pure read.
    ///
    /// `show_celebration` is set once every deed is done and `viewer` has not
    /// acknowledged the celebration yet.
    pub async fn check_round_complete(
        &self,
        round_id: &RoundId,
        viewer: Option<&MemberId>,
    ) -> Result<RoundProgress, EngineError> {
        let round = self.store.get_round(round_id).await.or_not_found("round")?;
        let assignments = self.store.list_assignments(round_id).await?;

        let total_count = assignments.len();
        let completed_count = assignments
            .iter()
            .filter(|a| a.state == AssignmentState::Completed)
            .count();
        let all_complete = total_count > 0 && completed_count == total_count;

        let show_celebration = match viewer {
            Some(member_id) if all_complete => {
                !self.store.has_seen_celebration(round_id, member_id).await?
            }
            _ => false,
        };

        Ok(RoundProgress {
            completed_count,
            total_count,
            all_complete,
            round_closed: round.status == RoundStatus::Closed,
            successor_id: round.successor_id,
            show_celebration,
        })
    }

    /// Close a fully completed round and start its successor.
    ///
    /// Safe to call concurrently: exactly one successor is created and every
    /// caller gets it back. Calling it on a round that was already advanced
    /// returns the existing successor.
    pub async fn advance_to_next_round(
        &self,
        round_id: &RoundId,
        next_name: Option<&str>,
    ) -> Result<Round, EngineError> {
        let round = self.store.get_round(round_id).await.or_not_found("round")?;
        match (round.status, round.successor_id) {
            (RoundStatus::Started, _) => {}
            (RoundStatus::Closed, Some(successor)) => {
                debug!(round_id = %round_id.0, "Round already advanced");
                return self.store.get_round(&successor).await.or_not_found("round");
            }
            (RoundStatus::Closed, None) => {
                return Err(EngineError::InvalidState(
                    "round was closed without a successor".into(),
                ))
            }
            (RoundStatus::Pending, _) => {
                return Err(EngineError::InvalidState("round has not started".into()))
            }
        }

        let progress = self.check_round_complete(round_id, None).await?;
        if !progress.all_complete {
            return Err(EngineError::InvalidState(format!(
                "only {} of {} deeds are complete",
                progress.completed_count, progress.total_count
            )));
        }

        let members: Vec<MemberId> = self
            .store
            .list_group_members(&round.group_id)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        let templates = self.store.list_templates(true).await?;
        let assignments = plan_assignments(&members, &templates)?;

        let name = next_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} (next)", round.name));
        let access_code = new_access_code();

        let outcome = self
            .store
            .advance_round(&AdvanceRoundParams {
                round_id: *round_id,
                next: CreateRoundParams {
                    group_id: round.group_id,
                    name,
                    access_code: Some(access_code),
                },
                assignments,
            })
            .await
            .or_lost_race("round", "round is no longer started")?;

        match outcome {
            AdvanceOutcome::Advanced(next) => {
                counter!("deeds_rounds_advanced_total").increment(1);
                info!(
                    round_id = %round_id.0,
                    successor_id = %next.id.0,
                    "Round advanced"
                );
                Ok(next)
            }
            AdvanceOutcome::AlreadyAdvanced(successor) => {
                debug!(round_id = %round_id.0, "Lost advance race, returning successor");
                self.store.get_round(&successor).await.or_not_found("round")
            }
        }
    }

    /// Owner-only: close a started round without starting another.
    pub async fn close_round(&self, round_id: &RoundId, caller_id: &MemberId) -> Result<Round, EngineError> {
        let round = self.store.get_round(round_id).await.or_not_found("round")?;
        self.require_owner(&round, caller_id, "only the group owner can close a round")
            .await?;
        if round.status != RoundStatus::Started {
            return Err(EngineError::InvalidState(format!(
                "round is {}",
                round.status.as_str()
            )));
        }

        let closed = self
            .store
            .close_round(round_id)
            .await
            .or_lost_race("round", "round is no longer started")?;
        info!(round_id = %round_id.0, "Round closed");
        Ok(closed)
    }

    /// Record that a group member has seen the celebration. Idempotent.
    pub async fn mark_celebration_seen(
        &self,
        round_id: &RoundId,
        member_id: &MemberId,
    ) -> Result<(), EngineError> {
        let round = self.store.get_round(round_id).await.or_not_found("round")?;
        self.store.get_member(member_id).await.or_not_found("member")?;
        let in_group = self
            .store
            .list_group_members(&round.group_id)
            .await?
            .iter()
            .any(|m| m.id == *member_id);
        if !in_group {
            return Err(EngineError::NotAuthorized(
                "member is not part of this round's group".into(),
            ));
        }
        self.store
            .mark_celebration_seen(round_id, member_id)
            .await
            .or_not_found("round")
    }

    pub async fn get_round(&self, round_id: &RoundId) -> Result<Round, EngineError> {
        self.store.get_round(round_id).await.or_not_found("round")
    }

    /// Per-member status board, in assignment order.
    pub async fn round_status(&self, round_id: &RoundId) -> Result<Vec<MemberStatus>, EngineError> {
        let round = self.store.get_round(round_id).await.or_not_found("round")?;
        let names: HashMap<MemberId, String> = self
            .store
            .list_group_members(&round.group_id)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();

        let mut board = Vec::new();
        for a in self.store.list_assignments(round_id).await? {
            let name = match names.get(&a.giver_id) {
                Some(name) => name.clone(),
                None => self.store.get_member(&a.giver_id).await?.name,
            };
            board.push(MemberStatus {
                member_id: a.giver_id,
                name,
                completed: a.state == AssignmentState::Completed,
                state: a.state,
                deed_description: a.description,
                proof: a.proof,
            });
        }
        Ok(board)
    }

    /// All rounds of a group, newest first.
    pub async fn list_rounds(&self, group_id: &GroupId) -> Result<Vec<Round>, EngineError> {
        self.store.get_group(group_id).await.or_not_found("group")?;
        Ok(self.store.list_rounds(group_id).await?)
    }

    /// The group's started round.
    pub async fn current_round(&self, group_id: &GroupId) -> Result<Round, EngineError> {
        self.store.get_group(group_id).await.or_not_found("group")?;
        self.store
            .get_active_round(group_id)
            .await
            .or_not_found("active round")
    }
}
