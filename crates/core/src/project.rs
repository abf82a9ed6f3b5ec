//! Project lifecycle states and member roles.
//!
//! Both enums are stored as TEXT in the database; `from_name`/`name` are the
//! canonical conversions and must match the CHECK constraints in the
//! migrations.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Coarse project phase gating which mutations are legal.
///
/// Only `Open` accepts mutation (metadata edits, position resize,
/// apply/cancel/approve/disapprove). State transitions themselves are
/// administrative and have no endpoint here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectState {
    Open,
    Started,
    Hold,
    Closed,
    Dropped,
    Finished,
}

/// States counting toward a user's involved-project quota.
pub const ACTIVE_STATES: &[&str] = &["OPEN", "STARTED", "HOLD"];

impl ProjectState {
    /// Parse from the database `state` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "OPEN" => Ok(Self::Open),
            "STARTED" => Ok(Self::Started),
            "HOLD" => Ok(Self::Hold),
            "CLOSED" => Ok(Self::Closed),
            "DROPPED" => Ok(Self::Dropped),
            "FINISHED" => Ok(Self::Finished),
            other => Err(CoreError::Internal(format!(
                "Unknown project state '{other}'"
            ))),
        }
    }

    /// Database column value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Started => "STARTED",
            Self::Hold => "HOLD",
            Self::Closed => "CLOSED",
            Self::Dropped => "DROPPED",
            Self::Finished => "FINISHED",
        }
    }

    /// Whether the project currently accepts mutation.
    pub fn can_mutate(self) -> bool {
        self == Self::Open
    }
}

/// Per-project membership role.
///
/// Exactly one `Owner` exists per project, assigned at creation and never
/// reassignable through the role-grant operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Owner,
    Admin,
    Member,
    Guest,
}

impl MemberRole {
    /// Parse from the database `role` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            "GUEST" => Ok(Self::Guest),
            other => Err(CoreError::Internal(format!(
                "Unknown member role '{other}'"
            ))),
        }
    }

    /// Database column value.
    pub fn name(self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
            Self::Guest => "GUEST",
        }
    }

    /// Whether this role may change project metadata and decide on
    /// applicants.
    pub fn can_change_meta(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        for state in [
            ProjectState::Open,
            ProjectState::Started,
            ProjectState::Hold,
            ProjectState::Closed,
            ProjectState::Dropped,
            ProjectState::Finished,
        ] {
            assert_eq!(ProjectState::from_name(state.name()).unwrap(), state);
        }
    }

    #[test]
    fn test_unknown_state_rejected() {
        assert!(ProjectState::from_name("PAUSED").is_err());
    }

    #[test]
    fn test_only_open_can_mutate() {
        assert!(ProjectState::Open.can_mutate());
        assert!(!ProjectState::Started.can_mutate());
        assert!(!ProjectState::Hold.can_mutate());
        assert!(!ProjectState::Closed.can_mutate());
        assert!(!ProjectState::Dropped.can_mutate());
        assert!(!ProjectState::Finished.can_mutate());
    }

    #[test]
    fn test_active_states_match_enum_names() {
        assert!(ACTIVE_STATES.contains(&ProjectState::Open.name()));
        assert!(ACTIVE_STATES.contains(&ProjectState::Started.name()));
        assert!(ACTIVE_STATES.contains(&ProjectState::Hold.name()));
        assert!(!ACTIVE_STATES.contains(&ProjectState::Finished.name()));
    }

    #[test]
    fn test_meta_permission_by_role() {
        assert!(MemberRole::Owner.can_change_meta());
        assert!(MemberRole::Admin.can_change_meta());
        assert!(!MemberRole::Member.can_change_meta());
        assert!(!MemberRole::Guest.can_change_meta());
    }
}
