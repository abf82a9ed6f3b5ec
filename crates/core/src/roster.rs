//! Membership roster: who belongs to a project, who wants to, and the rules
//! gating both.
//!
//! A [`ProjectRoster`] is a consistent in-memory snapshot of one project's
//! state, position ledger, members (with their position holds), and
//! applicants. All mutation rules of the join workflow live here; callers
//! load the snapshot, mutate it, and persist every touched row atomically.
//!
//! Soft deletion is a plain `deleted` marker on each row; revival flips it
//! back instead of inserting a duplicate, so database uniqueness holds.

use std::collections::HashMap;

use crate::error::CoreError;
use crate::positions::{self, PositionRequest, PositionSlot};
use crate::project::{MemberRole, ProjectState};
use crate::types::DbId;

/// One position a member currently (or previously) holds.
#[derive(Debug, Clone)]
pub struct MemberPositionHold {
    pub position: String,
    pub deleted: bool,
}

/// A project member with role and position holds.
///
/// `id` is `None` for members created in-memory and not yet persisted.
#[derive(Debug, Clone)]
pub struct RosterMember {
    pub id: Option<DbId>,
    pub user_id: DbId,
    pub role: MemberRole,
    pub deleted: bool,
    pub positions: Vec<MemberPositionHold>,
}

impl RosterMember {
    /// Whether this member actively holds `position`.
    pub fn holds_active(&self, position: &str) -> bool {
        !self.deleted
            && self
                .positions
                .iter()
                .any(|p| !p.deleted && p.position == position)
    }

    fn has_active_positions(&self) -> bool {
        self.positions.iter().any(|p| !p.deleted)
    }
}

/// A pending (or withdrawn) join request for one position.
#[derive(Debug, Clone)]
pub struct RosterApplicant {
    pub user_id: DbId,
    pub position: String,
    pub deleted: bool,
}

/// What an approval will do to the member table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalKind {
    /// The target already has a member row (possibly soft-deleted); it will
    /// be revived.
    ReviveExisting,
    /// The target has never been a member; the caller must verify the user
    /// exists and is active before calling [`ProjectRoster::admit`].
    AdmitNew,
}

/// Snapshot of one project's membership state.
#[derive(Debug, Clone)]
pub struct ProjectRoster {
    pub state: ProjectState,
    pub slots: Vec<PositionSlot>,
    pub members: Vec<RosterMember>,
    pub applicants: Vec<RosterApplicant>,
}

impl ProjectRoster {
    pub fn new(
        state: ProjectState,
        slots: Vec<PositionSlot>,
        members: Vec<RosterMember>,
        applicants: Vec<RosterApplicant>,
    ) -> Self {
        Self {
            state,
            slots,
            members,
            applicants,
        }
    }

    /// Build the roster for a brand-new project.
    ///
    /// The creator becomes the sole `Owner`. When `my_position` is given it
    /// must match one of the requested position names (case-insensitive) and
    /// the creator immediately fills that seat.
    pub fn for_new_project(
        creator_id: DbId,
        requested: &[PositionRequest],
        my_position: Option<&str>,
    ) -> Result<Self, CoreError> {
        if let Some(mine) = my_position {
            let mine_lower = mine.to_lowercase();
            if !requested.iter().any(|r| r.name.to_lowercase() == mine_lower) {
                return Err(CoreError::Validation(format!(
                    "my_position '{mine}' is not one of the requested positions"
                )));
            }
        }

        let owner = RosterMember {
            id: None,
            user_id: creator_id,
            role: MemberRole::Owner,
            deleted: false,
            positions: my_position
                .map(|p| {
                    vec![MemberPositionHold {
                        position: p.to_string(),
                        deleted: false,
                    }]
                })
                .unwrap_or_default(),
        };

        Ok(Self {
            state: ProjectState::Open,
            slots: positions::initialize(requested, my_position),
            members: vec![owner],
            applicants: Vec::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Predicates
    // -----------------------------------------------------------------------

    /// Fail with `Forbidden` unless the project is open for mutation.
    pub fn ensure_open(&self) -> Result<(), CoreError> {
        if self.state.can_mutate() {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Project is {} and does not accept changes",
                self.state.name()
            )))
        }
    }

    /// True iff the project is open and `user_id` is an active member whose
    /// role may change metadata.
    pub fn can_change_meta(&self, user_id: DbId) -> bool {
        self.state.can_mutate()
            && self
                .active_member(user_id)
                .is_some_and(|m| m.role.can_change_meta())
    }

    /// Fail with `Forbidden` unless [`can_change_meta`](Self::can_change_meta).
    pub fn ensure_can_change_meta(&self, user_id: DbId) -> Result<(), CoreError> {
        if self.can_change_meta(user_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Requires an OWNER or ADMIN member of an open project".into(),
            ))
        }
    }

    /// Count of actively-held seats per position name.
    pub fn filled_counts(&self) -> HashMap<String, i32> {
        let mut counts = HashMap::new();
        for member in self.members.iter().filter(|m| !m.deleted) {
            for hold in member.positions.iter().filter(|p| !p.deleted) {
                *counts.entry(hold.position.clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    fn active_member(&self, user_id: DbId) -> Option<&RosterMember> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id && !m.deleted)
    }

    /// Member row for `user_id` regardless of deletion, if any.
    pub fn member_row(&self, user_id: DbId) -> Option<&RosterMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    /// Applicant row for `(user_id, position)` regardless of deletion.
    pub fn applicant_row(&self, user_id: DbId, position: &str) -> Option<&RosterApplicant> {
        self.applicants
            .iter()
            .find(|a| a.user_id == user_id && a.position == position)
    }

    // -----------------------------------------------------------------------
    // Ledger delegation
    // -----------------------------------------------------------------------

    /// Re-derive every slot's filled count from the member holds.
    pub fn recompute_filled(&mut self) {
        let filled = self.filled_counts();
        positions::recompute_filled(&mut self.slots, &filled);
    }

    /// Rewrite the position ledger, rejecting changes that would orphan
    /// current occupants.
    pub fn resize_positions(&mut self, requested: &[PositionRequest]) -> Result<(), CoreError> {
        let filled = self.filled_counts();
        positions::resize(&mut self.slots, requested, &filled)
    }

    // -----------------------------------------------------------------------
    // Join workflow
    // -----------------------------------------------------------------------

    /// Record a join request by `user_id` for `position`.
    pub fn apply(&mut self, user_id: DbId, position: &str) -> Result<(), CoreError> {
        self.ensure_open()?;

        if !positions::has_open_slot(&self.slots, position) {
            return Err(CoreError::CapacityConflict(format!(
                "No open slot for position '{position}'"
            )));
        }

        if self
            .member_row(user_id)
            .is_some_and(|m| m.holds_active(position))
        {
            return Err(CoreError::DuplicateRequest(format!(
                "User already holds position '{position}'"
            )));
        }

        match self
            .applicants
            .iter()
            .position(|a| a.user_id == user_id && a.position == position)
        {
            Some(i) if !self.applicants[i].deleted => Err(CoreError::DuplicateRequest(format!(
                "User already applied for position '{position}'"
            ))),
            Some(i) => {
                self.applicants[i].deleted = false;
                Ok(())
            }
            None => {
                self.applicants.push(RosterApplicant {
                    user_id,
                    position: position.to_string(),
                    deleted: false,
                });
                Ok(())
            }
        }
    }

    /// Withdraw a pending join request.
    ///
    /// A second cancel for the same request fails with `NotFound`; the
    /// withdrawn row is never re-marked.
    pub fn cancel_application(&mut self, user_id: DbId, position: &str) -> Result<(), CoreError> {
        self.ensure_open()?;

        let applicant = self
            .applicants
            .iter_mut()
            .find(|a| a.user_id == user_id && a.position == position && !a.deleted)
            .ok_or(CoreError::NotFound {
                entity: "ProjectApplicant",
                id: user_id,
            })?;

        applicant.deleted = true;
        Ok(())
    }

    /// Validate that `target_user_id` can be approved into `position`.
    ///
    /// Returns whether the approval revives an existing member row or needs
    /// a brand-new one; in the latter case the caller must verify the target
    /// account exists and is active before calling [`admit`](Self::admit).
    pub fn check_approval(
        &self,
        target_user_id: DbId,
        position: &str,
    ) -> Result<ApprovalKind, CoreError> {
        if !positions::has_open_slot(&self.slots, position) {
            return Err(CoreError::CapacityConflict(format!(
                "No open slot for position '{position}'"
            )));
        }

        let is_applicant = self
            .applicants
            .iter()
            .any(|a| !a.deleted && a.user_id == target_user_id && a.position == position);
        if !is_applicant {
            return Err(CoreError::Validation(format!(
                "User {target_user_id} has no pending application for position '{position}'"
            )));
        }

        match self.member_row(target_user_id) {
            Some(member) if member.holds_active(position) => {
                Err(CoreError::DuplicateRequest(format!(
                    "User already holds position '{position}'"
                )))
            }
            Some(_) => Ok(ApprovalKind::ReviveExisting),
            None => Ok(ApprovalKind::AdmitNew),
        }
    }

    /// Admit `target_user_id` into `position` and update the ledger.
    ///
    /// Call only after [`check_approval`](Self::check_approval) succeeded.
    pub fn admit(&mut self, target_user_id: DbId, position: &str) {
        let idx = match self.members.iter().position(|m| m.user_id == target_user_id) {
            Some(i) => {
                self.members[i].deleted = false;
                i
            }
            None => {
                self.members.push(RosterMember {
                    id: None,
                    user_id: target_user_id,
                    role: MemberRole::Member,
                    deleted: false,
                    positions: Vec::new(),
                });
                self.members.len() - 1
            }
        };
        let member = &mut self.members[idx];

        match member
            .positions
            .iter_mut()
            .find(|p| p.position == position)
        {
            Some(hold) => hold.deleted = false,
            None => member.positions.push(MemberPositionHold {
                position: position.to_string(),
                deleted: false,
            }),
        }

        self.recompute_filled();
    }

    /// Remove `position` from `target_user_id`'s holdings.
    ///
    /// When the member's last active position is removed the member row is
    /// soft-deleted too. The ledger's filled counts are re-derived.
    pub fn remove_position(
        &mut self,
        target_user_id: DbId,
        position: &str,
    ) -> Result<(), CoreError> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.user_id == target_user_id)
            .ok_or(CoreError::NotFound {
                entity: "ProjectMember",
                id: target_user_id,
            })?;

        let hold = member
            .positions
            .iter_mut()
            .find(|p| p.position == position && !p.deleted)
            .ok_or(CoreError::NotFound {
                entity: "ProjectMemberPosition",
                id: target_user_id,
            })?;

        hold.deleted = true;
        member.deleted = !member.has_active_positions();

        self.recompute_filled();
        Ok(())
    }

    /// Change `target_user_id`'s role.
    ///
    /// Ownership is never transferred here and nobody re-ranks themselves.
    /// The actor must out-rank lateral moves: an actor cannot change the
    /// role of a member holding the same role.
    pub fn grant_role(
        &mut self,
        acting_user_id: DbId,
        target_user_id: DbId,
        new_role: MemberRole,
    ) -> Result<(), CoreError> {
        if new_role == MemberRole::Owner {
            return Err(CoreError::Validation(
                "Ownership cannot be granted through role changes".into(),
            ));
        }
        if target_user_id == acting_user_id {
            return Err(CoreError::Validation("Cannot change your own role".into()));
        }

        let actor_role = self
            .active_member(acting_user_id)
            .map(|m| m.role)
            .ok_or(CoreError::NotFound {
                entity: "ProjectMember",
                id: acting_user_id,
            })?;

        let target = self
            .members
            .iter_mut()
            .find(|m| m.user_id == target_user_id && !m.deleted)
            .ok_or(CoreError::NotFound {
                entity: "ProjectMember",
                id: target_user_id,
            })?;

        if !actor_role.can_change_meta() {
            return Err(CoreError::Forbidden(
                "Only OWNER or ADMIN may change member roles".into(),
            ));
        }
        if actor_role == target.role {
            return Err(CoreError::Forbidden(
                "Members of the same rank cannot re-rank each other".into(),
            ));
        }

        target.role = new_role;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: DbId = 1;
    const ALICE: DbId = 2;
    const BOB: DbId = 3;

    fn req(name: &str, count: i32) -> PositionRequest {
        PositionRequest {
            name: name.to_string(),
            count,
        }
    }

    fn dev_roster() -> ProjectRoster {
        ProjectRoster::for_new_project(OWNER, &[req("DEV", 2)], Some("DEV")).unwrap()
    }

    #[test]
    fn test_new_project_seeds_owner_and_ledger() {
        let roster = dev_roster();
        assert_eq!(roster.slots[0].open_cnt, 2);
        assert_eq!(roster.slots[0].close_cnt, 1);

        let owner = roster.member_row(OWNER).unwrap();
        assert_eq!(owner.role, MemberRole::Owner);
        assert!(owner.holds_active("DEV"));
    }

    #[test]
    fn test_new_project_rejects_unknown_my_position() {
        let err = ProjectRoster::for_new_project(OWNER, &[req("DEV", 2)], Some("DESIGN"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_apply_succeeds_while_capacity_remains() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        assert!(!roster.applicant_row(ALICE, "DEV").unwrap().deleted);
    }

    #[test]
    fn test_apply_after_ledger_full_is_capacity_conflict() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.check_approval(ALICE, "DEV").unwrap();
        roster.admit(ALICE, "DEV");
        assert_eq!(roster.slots[0].close_cnt, 2);

        let err = roster.apply(BOB, "DEV").unwrap_err();
        assert!(matches!(err, CoreError::CapacityConflict(_)));
    }

    #[test]
    fn test_apply_twice_is_duplicate() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        let err = roster.apply(ALICE, "DEV").unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRequest(_)));
    }

    #[test]
    fn test_apply_revives_withdrawn_application() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.cancel_application(ALICE, "DEV").unwrap();
        roster.apply(ALICE, "DEV").unwrap();

        // One row, revived -- not a duplicate.
        assert_eq!(roster.applicants.len(), 1);
        assert!(!roster.applicants[0].deleted);
    }

    #[test]
    fn test_apply_by_current_holder_is_duplicate() {
        let mut roster = dev_roster();
        let err = roster.apply(OWNER, "DEV").unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRequest(_)));
    }

    #[test]
    fn test_apply_rejected_outside_open_state() {
        let mut roster = dev_roster();
        roster.state = ProjectState::Started;
        let err = roster.apply(ALICE, "DEV").unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn test_cancel_twice_is_not_found() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.cancel_application(ALICE, "DEV").unwrap();
        let err = roster.cancel_application(ALICE, "DEV").unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_approval_requires_pending_application() {
        let roster = dev_roster();
        let err = roster.check_approval(ALICE, "DEV").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_approval_requires_open_slot() {
        let mut roster =
            ProjectRoster::for_new_project(OWNER, &[req("DEV", 1)], Some("DEV")).unwrap();
        // Ledger is full (owner holds the only seat); Alice's application
        // must have been accepted earlier for this check to be reachable,
        // so stage the applicant row directly.
        roster.applicants.push(RosterApplicant {
            user_id: ALICE,
            position: "DEV".into(),
            deleted: false,
        });
        let err = roster.check_approval(ALICE, "DEV").unwrap_err();
        assert!(matches!(err, CoreError::CapacityConflict(_)));
    }

    #[test]
    fn test_approve_then_disapprove_round_trip() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();

        assert_eq!(roster.check_approval(ALICE, "DEV").unwrap(), ApprovalKind::AdmitNew);
        roster.admit(ALICE, "DEV");
        assert_eq!(roster.slots[0].close_cnt, 2);

        roster.remove_position(ALICE, "DEV").unwrap();
        assert_eq!(roster.slots[0].close_cnt, 1);

        let alice = roster.member_row(ALICE).unwrap();
        assert!(alice.deleted);
        assert!(!alice.holds_active("DEV"));
    }

    #[test]
    fn test_readmission_revives_member_row() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.admit(ALICE, "DEV");
        roster.remove_position(ALICE, "DEV").unwrap();

        roster.apply(ALICE, "DEV").unwrap();
        assert_eq!(
            roster.check_approval(ALICE, "DEV").unwrap(),
            ApprovalKind::ReviveExisting
        );
        roster.admit(ALICE, "DEV");

        // Still a single member row for Alice.
        assert_eq!(
            roster.members.iter().filter(|m| m.user_id == ALICE).count(),
            1
        );
        assert!(roster.member_row(ALICE).unwrap().holds_active("DEV"));
    }

    #[test]
    fn test_disapprove_unknown_member_is_not_found() {
        let mut roster = dev_roster();
        let err = roster.remove_position(ALICE, "DEV").unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotFound {
                entity: "ProjectMember",
                ..
            }
        ));
    }

    #[test]
    fn test_disapprove_twice_is_not_found() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.admit(ALICE, "DEV");
        roster.remove_position(ALICE, "DEV").unwrap();
        let err = roster.remove_position(ALICE, "DEV").unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotFound {
                entity: "ProjectMemberPosition",
                ..
            }
        ));
    }

    #[test]
    fn test_grant_role_never_grants_ownership() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.admit(ALICE, "DEV");

        let err = roster.grant_role(OWNER, ALICE, MemberRole::Owner).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_grant_role_rejects_self_grant() {
        let mut roster = dev_roster();
        let err = roster.grant_role(OWNER, OWNER, MemberRole::Admin).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_grant_role_requires_privileged_actor() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.admit(ALICE, "DEV");
        // Grow the ledger so Bob fits.
        roster.resize_positions(&[req("DEV", 3)]).unwrap();
        roster.apply(BOB, "DEV").unwrap();
        roster.admit(BOB, "DEV");

        let err = roster.grant_role(ALICE, BOB, MemberRole::Admin).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn test_grant_role_rejects_lateral_change() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.admit(ALICE, "DEV");
        roster.grant_role(OWNER, ALICE, MemberRole::Admin).unwrap();

        roster.resize_positions(&[req("DEV", 3)]).unwrap();
        roster.apply(BOB, "DEV").unwrap();
        roster.admit(BOB, "DEV");
        roster.grant_role(OWNER, BOB, MemberRole::Admin).unwrap();

        // ADMIN vs ADMIN: lateral, rejected.
        let err = roster.grant_role(ALICE, BOB, MemberRole::Member).unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn test_grant_role_success_overwrites_role() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.admit(ALICE, "DEV");

        roster.grant_role(OWNER, ALICE, MemberRole::Admin).unwrap();
        assert_eq!(roster.member_row(ALICE).unwrap().role, MemberRole::Admin);

        // The single-owner invariant is untouched.
        let owners = roster
            .members
            .iter()
            .filter(|m| m.role == MemberRole::Owner)
            .count();
        assert_eq!(owners, 1);
    }

    #[test]
    fn test_resize_cannot_orphan_member() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.admit(ALICE, "DEV");

        let err = roster.resize_positions(&[req("DESIGN", 1)]).unwrap_err();
        assert!(matches!(err, CoreError::CapacityConflict(_)));
        // Ledger untouched.
        assert_eq!(roster.slots[0].open_cnt, 2);
        assert_eq!(roster.slots[0].close_cnt, 2);
    }

    #[test]
    fn test_meta_permission_requires_open_and_rank() {
        let mut roster = dev_roster();
        roster.apply(ALICE, "DEV").unwrap();
        roster.admit(ALICE, "DEV");

        assert!(roster.can_change_meta(OWNER));
        assert!(!roster.can_change_meta(ALICE));
        assert!(!roster.can_change_meta(BOB));

        roster.state = ProjectState::Hold;
        assert!(!roster.can_change_meta(OWNER));
    }
}
