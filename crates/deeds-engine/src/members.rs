//! Membership: members and the groups they form.

use deeds_storage::{CreateGroupParams, Group, GroupId, Member, MemberId, Store, StoreError};
use tracing::{debug, info};

use crate::error::StoreResultExt;
use crate::{EngineError, RoundEngine};

fn clean_name<'a>(name: &'a str, what: &str) -> Result<&'a str, EngineError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(name)
}

impl<S: Store> RoundEngine<S> {
    /// Register a member by name, or return the existing one.
    pub async fn add_member(&self, name: &str) -> Result<Member, EngineError> {
        let name = clean_name(name, "member name")?;
        let member = self.store.create_member(name).await?;
        debug!(member_id = %member.id.0, "Member registered");
        Ok(member)
    }

    /// Look up an existing member by name.
    pub async fn login(&self, name: &str) -> Result<Member, EngineError> {
        let name = clean_name(name, "member name")?;
        self.store.get_member_by_name(name).await.or_not_found("member")
    }

    pub async fn get_member(&self, member_id: &MemberId) -> Result<Member, EngineError> {
        self.store.get_member(member_id).await.or_not_found("member")
    }

    pub async fn list_members(&self) -> Result<Vec<Member>, EngineError> {
        Ok(self.store.list_members().await?)
    }

    pub async fn rename_member(
        &self,
        member_id: &MemberId,
        name: &str,
    ) -> Result<Member, EngineError> {
        let name = clean_name(name, "member name")?;
        match self.store.rename_member(member_id, name).await {
            Ok(member) => Ok(member),
            Err(StoreError::AlreadyExists) => Err(EngineError::Conflict(format!(
                "name '{name}' is already taken"
            ))),
            Err(e) => Err(e).or_not_found("member"),
        }
    }

    /// Create a group; the owner becomes its first member.
    pub async fn create_group(&self, name: &str, owner_id: &MemberId) -> Result<Group, EngineError> {
        let name = clean_name(name, "group name")?;
        self.store.get_member(owner_id).await.or_not_found("member")?;

        let group = self
            .store
            .create_group(&CreateGroupParams {
                name: name.to_string(),
                owner_id: *owner_id,
            })
            .await?;
        info!(group_id = %group.id.0, owner_id = %owner_id.0, "Group created");
        Ok(group)
    }

    pub async fn get_group(&self, group_id: &GroupId) -> Result<Group, EngineError> {
        self.store.get_group(group_id).await.or_not_found("group")
    }

    /// Add a member to a group. Joining twice is a no-op.
    pub async fn join_group(&self, group_id: &GroupId, member_id: &MemberId) -> Result<(), EngineError> {
        self.store.get_group(group_id).await.or_not_found("group")?;
        self.store.get_member(member_id).await.or_not_found("member")?;
        self.store
            .add_group_member(group_id, member_id)
            .await
            .or_not_found("group")?;
        info!(group_id = %group_id.0, member_id = %member_id.0, "Member joined group");
        Ok(())
    }

    /// Members of a group in join order.
    pub async fn list_group_members(&self, group_id: &GroupId) -> Result<Vec<Member>, EngineError> {
        self.store.get_group(group_id).await.or_not_found("group")?;
        Ok(self.store.list_group_members(group_id).await?)
    }

    pub async fn list_groups_for_member(&self, member_id: &MemberId) -> Result<Vec<Group>, EngineError> {
        self.store.get_member(member_id).await.or_not_found("member")?;
        Ok(self.store.list_member_groups(member_id).await?)
    }
}
