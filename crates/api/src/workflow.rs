//! Project membership workflow orchestration.
//!
//! One function per public operation of the project workflow. Every
//! mutating operation follows the same shape:
//!
//! 1. open a transaction and lock the project row (`SELECT ... FOR UPDATE`)
//!    so concurrent mutations of the same project serialize;
//! 2. load positions, members, and applicants inside the transaction as one
//!    consistent [`ProjectRoster`] snapshot;
//! 3. run the core roster rules;
//! 4. upsert every touched row and commit -- all or nothing;
//! 5. after commit, queue a full project snapshot for the search index
//!    (fire-and-forget; an index failure never unwinds a committed change).

use std::sync::Arc;

use sqlx::{Postgres, Transaction};
use teamup_cloud::FileCategory;
use teamup_core::avatar::{self, AVATAR_CONTENT_TYPE};
use teamup_core::error::CoreError;
use teamup_core::positions::PositionRequest;
use teamup_core::project::ProjectState;
use teamup_core::roster::{ApprovalKind, ProjectRoster};
use teamup_core::types::DbId;
use teamup_db::models::member::{ApplyRequest, ApproveRequest, GrantRoleRequest, MemberDisplay};
use teamup_db::models::project::{
    CreateProject, Project, ProjectPicResponse, ProjectResponse, UpdateProject,
};
use teamup_db::repositories::{ApplicantRepo, MemberRepo, PositionRepo, ProjectRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::query::ProjectLoadParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Snapshot plumbing
// ---------------------------------------------------------------------------

fn project_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

/// Lock the project row for the rest of the transaction.
async fn lock_project(tx: &mut Transaction<'_, Postgres>, id: DbId) -> AppResult<Project> {
    ProjectRepo::find_for_update(tx, id)
        .await?
        .ok_or_else(|| project_not_found(id))
}

/// Load the project's child rows into a core roster snapshot.
async fn load_roster(
    tx: &mut Transaction<'_, Postgres>,
    project: &Project,
) -> AppResult<ProjectRoster> {
    let state = ProjectState::from_name(&project.state)?;

    let slots = PositionRepo::list_for_project(&mut **tx, project.id)
        .await?
        .iter()
        .map(|row| row.to_slot())
        .collect();

    let member_rows = MemberRepo::list_for_project(&mut **tx, project.id).await?;
    let member_ids: Vec<DbId> = member_rows.iter().map(|m| m.id).collect();
    let holds = MemberRepo::list_positions(&mut **tx, &member_ids).await?;
    let members = member_rows
        .iter()
        .map(|m| m.to_roster(&holds))
        .collect::<Result<Vec<_>, _>>()?;

    let applicants = ApplicantRepo::list_for_project(&mut **tx, project.id)
        .await?
        .iter()
        .map(|a| a.to_roster())
        .collect();

    Ok(ProjectRoster::new(state, slots, members, applicants))
}

/// Upsert one member's row and all of its position holds.
async fn save_member_with_holds(
    tx: &mut Transaction<'_, Postgres>,
    project_id: DbId,
    roster: &ProjectRoster,
    user_id: DbId,
) -> AppResult<()> {
    let member = roster.member_row(user_id).ok_or_else(|| {
        AppError::InternalError(format!("member {user_id} missing after roster mutation"))
    })?;

    let member_id = MemberRepo::upsert(tx, project_id, member).await?;
    for hold in &member.positions {
        MemberRepo::upsert_position(tx, member_id, hold).await?;
    }
    Ok(())
}

/// Upsert one applicant's row.
async fn save_applicant(
    tx: &mut Transaction<'_, Postgres>,
    project_id: DbId,
    roster: &ProjectRoster,
    user_id: DbId,
    position: &str,
) -> AppResult<()> {
    let applicant = roster.applicant_row(user_id, position).ok_or_else(|| {
        AppError::InternalError(format!(
            "applicant ({user_id}, {position}) missing after roster mutation"
        ))
    })?;
    ApplicantRepo::upsert(tx, project_id, applicant).await?;
    Ok(())
}

/// Build the full response snapshot from committed data.
async fn snapshot(state: &AppState, project: Project) -> AppResult<ProjectResponse> {
    let position_status = PositionRepo::list_for_project(&state.pool, project.id).await?;
    let members = MemberRepo::list_display(&state.pool, project.id).await?;
    let applicants = ApplicantRepo::list_display(&state.pool, project.id).await?;
    Ok(ProjectResponse {
        project,
        position_status: Some(position_status),
        members: Some(members),
        applicants: Some(applicants),
    })
}

/// Queue the snapshot for the search index.
fn publish(state: &AppState, response: &ProjectResponse) {
    state.search.publish_project(response.project.id, response);
}

/// Re-read, publish, and return the post-commit snapshot for `id`.
async fn publish_snapshot(state: &AppState, id: DbId) -> AppResult<ProjectResponse> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    let response = snapshot(state, project).await?;
    publish(state, &response);
    Ok(response)
}

/// Best-effort deletion of a replaced or removed picture.
///
/// Runs detached from the request; a failure is logged, never surfaced.
fn cleanup_picture(state: &AppState, key: String) {
    let images = Arc::clone(&state.images);
    tokio::spawn(async move {
        if let Err(e) = images.delete(&key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete old picture");
        }
    });
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Create a project with its position ledger and the creator as OWNER.
pub async fn create_project(
    state: &AppState,
    actor_id: DbId,
    input: CreateProject,
) -> AppResult<ProjectResponse> {
    let involved = MemberRepo::count_active_involvements(&state.pool, actor_id).await?;
    if involved >= state.config.max_involved_projects {
        return Err(AppError::Core(CoreError::QuotaExceeded(format!(
            "Already involved in {involved} active project(s), limit is {}",
            state.config.max_involved_projects
        ))));
    }

    let requested: Vec<PositionRequest> = input.positions.iter().map(|p| p.to_request()).collect();
    let roster = ProjectRoster::for_new_project(actor_id, &requested, input.my_position.as_deref())?;

    let mut tx = state.pool.begin().await?;
    let project = ProjectRepo::create(&mut tx, &input).await?;
    PositionRepo::upsert_slots(&mut tx, project.id, &roster.slots).await?;
    save_member_with_holds(&mut tx, project.id, &roster, actor_id).await?;
    tx.commit().await?;

    tracing::info!(project_id = project.id, creator_id = actor_id, "Project created");

    let response = snapshot(state, project).await?;
    publish(state, &response);
    Ok(response)
}

/// Fetch a project with the requested child collections.
pub async fn get_project(
    state: &AppState,
    id: DbId,
    params: &ProjectLoadParams,
) -> AppResult<ProjectResponse> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;

    let position_status = if params.positions {
        Some(PositionRepo::list_for_project(&state.pool, id).await?)
    } else {
        None
    };
    let members = if params.members {
        Some(MemberRepo::list_display(&state.pool, id).await?)
    } else {
        None
    };
    let applicants = if params.applicants {
        Some(ApplicantRepo::list_display(&state.pool, id).await?)
    } else {
        None
    };

    Ok(ProjectResponse {
        project,
        position_status,
        members,
        applicants,
    })
}

/// Patch project metadata and, when `positions` is present, resize the
/// ledger.
pub async fn update_project(
    state: &AppState,
    actor_id: DbId,
    id: DbId,
    input: UpdateProject,
) -> AppResult<ProjectResponse> {
    let mut tx = state.pool.begin().await?;
    let project = lock_project(&mut tx, id).await?;
    let mut roster = load_roster(&mut tx, &project).await?;

    roster.ensure_can_change_meta(actor_id)?;

    if let Some(positions) = &input.positions {
        let requested: Vec<PositionRequest> = positions.iter().map(|p| p.to_request()).collect();
        roster.resize_positions(&requested)?;
        PositionRepo::upsert_slots(&mut tx, id, &roster.slots).await?;
    }

    ProjectRepo::update_fields(&mut tx, id, &input)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    tx.commit().await?;

    publish_snapshot(state, id).await
}

/// Store a new project picture and swap the avatar reference.
///
/// The replaced object is deleted best-effort only after the new reference
/// committed.
pub async fn upload_picture(
    state: &AppState,
    actor_id: DbId,
    id: DbId,
    bytes: Vec<u8>,
    content_type: &str,
) -> AppResult<ProjectPicResponse> {
    avatar::validate_mime(content_type)?;
    let processed = avatar::process_avatar(&bytes)?;

    let mut tx = state.pool.begin().await?;
    let project = lock_project(&mut tx, id).await?;
    let roster = load_roster(&mut tx, &project).await?;
    roster.ensure_can_change_meta(actor_id)?;

    let key = state
        .images
        .store(FileCategory::ProjectPic, processed, AVATAR_CONTENT_TYPE)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store picture: {e}")))?;

    let updated = ProjectRepo::set_avatar(&mut *tx, id, Some(&key))
        .await?
        .ok_or_else(|| project_not_found(id))?;
    tx.commit().await?;

    if let Some(old) = project.avatar {
        cleanup_picture(state, old);
    }

    let response = snapshot(state, updated).await?;
    publish(state, &response);

    Ok(ProjectPicResponse {
        id,
        avatar: response.project.avatar.clone(),
    })
}

/// Clear the project's avatar and delete the stored object best-effort.
pub async fn delete_picture(state: &AppState, actor_id: DbId, id: DbId) -> AppResult<()> {
    let mut tx = state.pool.begin().await?;
    let project = lock_project(&mut tx, id).await?;
    let roster = load_roster(&mut tx, &project).await?;
    roster.ensure_can_change_meta(actor_id)?;

    let key = project.avatar.ok_or(AppError::Core(CoreError::NotFound {
        entity: "ProjectPicture",
        id,
    }))?;

    ProjectRepo::set_avatar(&mut *tx, id, None)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    tx.commit().await?;

    cleanup_picture(state, key);
    publish_snapshot(state, id).await?;
    Ok(())
}

/// Active members of the project with display data.
pub async fn list_members(state: &AppState, id: DbId) -> AppResult<Vec<MemberDisplay>> {
    // Ensure the project resolves before returning an empty list for it.
    ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| project_not_found(id))?;
    Ok(MemberRepo::list_display(&state.pool, id).await?)
}

/// Change a member's role.
pub async fn grant_role(
    state: &AppState,
    actor_id: DbId,
    id: DbId,
    input: &GrantRoleRequest,
) -> AppResult<()> {
    let mut tx = state.pool.begin().await?;
    let project = lock_project(&mut tx, id).await?;
    let mut roster = load_roster(&mut tx, &project).await?;

    roster.grant_role(actor_id, input.user_id, input.role)?;

    let target = roster.member_row(input.user_id).ok_or_else(|| {
        AppError::InternalError(format!("member {} missing after role grant", input.user_id))
    })?;
    MemberRepo::upsert(&mut tx, id, target).await?;
    tx.commit().await?;

    tracing::info!(
        project_id = id,
        actor_id = actor_id,
        target_id = input.user_id,
        role = input.role.name(),
        "Member role changed"
    );

    publish_snapshot(state, id).await?;
    Ok(())
}

/// Record a join request by the acting user.
pub async fn apply(
    state: &AppState,
    actor_id: DbId,
    id: DbId,
    input: &ApplyRequest,
) -> AppResult<()> {
    let mut tx = state.pool.begin().await?;
    let project = lock_project(&mut tx, id).await?;
    let mut roster = load_roster(&mut tx, &project).await?;

    roster.apply(actor_id, &input.position)?;
    save_applicant(&mut tx, id, &roster, actor_id, &input.position).await?;
    tx.commit().await?;

    publish_snapshot(state, id).await?;
    Ok(())
}

/// Withdraw the acting user's pending join request.
pub async fn cancel_apply(
    state: &AppState,
    actor_id: DbId,
    id: DbId,
    input: &ApplyRequest,
) -> AppResult<()> {
    let mut tx = state.pool.begin().await?;
    let project = lock_project(&mut tx, id).await?;
    let mut roster = load_roster(&mut tx, &project).await?;

    roster.cancel_application(actor_id, &input.position)?;
    save_applicant(&mut tx, id, &roster, actor_id, &input.position).await?;
    tx.commit().await?;

    publish_snapshot(state, id).await?;
    Ok(())
}

/// Approve a pending applicant into the requested position.
pub async fn approve(
    state: &AppState,
    actor_id: DbId,
    id: DbId,
    input: &ApproveRequest,
) -> AppResult<()> {
    let mut tx = state.pool.begin().await?;
    let project = lock_project(&mut tx, id).await?;
    let mut roster = load_roster(&mut tx, &project).await?;

    roster.ensure_can_change_meta(actor_id)?;

    if roster.check_approval(input.user_id, &input.position)? == ApprovalKind::AdmitNew {
        // Brand-new member: the target account must exist and be active.
        let target = UserRepo::find_by_id(&mut *tx, input.user_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "User",
                id: input.user_id,
            }))?;
        if !target.is_active {
            return Err(AppError::Core(CoreError::Forbidden(
                "Target account is deactivated".into(),
            )));
        }
    }

    roster.admit(input.user_id, &input.position);

    save_member_with_holds(&mut tx, id, &roster, input.user_id).await?;
    PositionRepo::upsert_slots(&mut tx, id, &roster.slots).await?;
    tx.commit().await?;

    tracing::info!(
        project_id = id,
        actor_id = actor_id,
        target_id = input.user_id,
        position = %input.position,
        "Applicant approved"
    );

    publish_snapshot(state, id).await?;
    Ok(())
}

/// Remove a position from a member, dropping the member entirely when it
/// was their last one.
pub async fn disapprove(
    state: &AppState,
    actor_id: DbId,
    id: DbId,
    input: &ApproveRequest,
) -> AppResult<()> {
    let mut tx = state.pool.begin().await?;
    let project = lock_project(&mut tx, id).await?;
    let mut roster = load_roster(&mut tx, &project).await?;

    roster.ensure_can_change_meta(actor_id)?;
    roster.remove_position(input.user_id, &input.position)?;

    save_member_with_holds(&mut tx, id, &roster, input.user_id).await?;
    PositionRepo::upsert_slots(&mut tx, id, &roster.slots).await?;
    tx.commit().await?;

    tracing::info!(
        project_id = id,
        actor_id = actor_id,
        target_id = input.user_id,
        position = %input.position,
        "Member position removed"
    );

    publish_snapshot(state, id).await?;
    Ok(())
}
