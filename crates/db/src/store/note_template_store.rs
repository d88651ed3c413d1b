//! The note template store.
//!
//! Every mutation runs in one transaction that first takes the advisory lock
//! of each group it touches. A writer that finds the lock taken fails with
//! [`CoreError::Conflict`] instead of waiting, so the caller can retry. The
//! group-position unique constraint is deferred to commit, which lets range
//! shifts pass through duplicate positions mid-transaction.

use std::sync::Arc;

use ntpl_core::access::{PermissionOracle, TrackerRegistry, VisibilityFilter};
use ntpl_core::error::CoreError;
use ntpl_core::note_template::{
    parse_visibility, validate_description, validate_memo, validate_name, validate_required_id,
    validate_role_ids, FieldErrors, Visibility,
};
use ntpl_core::positioning::{next_position, plan_compaction, plan_move};
use ntpl_core::types::{DbId, Position};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::{StoreError, StoreResult};
use crate::access::{PgPermissionOracle, PgTrackerRegistry};
use crate::models::note_template::{CreateNoteTemplate, NoteTemplate, UpdateNoteTemplate};
use crate::repositories::{NoteTemplateRepo, RoleRepo};

/// Name of the deferred `(project_id, tracker_id, position)` constraint.
const GROUP_POSITION_CONSTRAINT: &str = "uq_note_templates_group_position";

const ENTITY: &str = "NoteTemplate";

/// Query and mutation surface over note templates.
///
/// Cheap to clone; the pool and collaborators are shared.
#[derive(Clone)]
pub struct NoteTemplateStore {
    pool: PgPool,
    oracle: Arc<dyn PermissionOracle>,
    registry: Arc<dyn TrackerRegistry>,
}

impl NoteTemplateStore {
    pub fn new(
        pool: PgPool,
        oracle: Arc<dyn PermissionOracle>,
        registry: Arc<dyn TrackerRegistry>,
    ) -> Self {
        Self {
            pool,
            oracle,
            registry,
        }
    }

    /// A store wired to the Postgres oracle and registry on the same pool.
    pub fn postgres(pool: PgPool) -> Self {
        let oracle = Arc::new(PgPermissionOracle::new(pool.clone()));
        let registry = Arc::new(PgTrackerRegistry::new(pool.clone()));
        Self::new(pool, oracle, registry)
    }

    /// The permission oracle this store filters with.
    pub fn oracle(&self) -> &dyn PermissionOracle {
        self.oracle.as_ref()
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Unconditional fetch by ID. No visibility filtering.
    pub async fn get(&self, id: DbId) -> StoreResult<NoteTemplate> {
        NoteTemplateRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Templates of one group visible to `user_id`, ascending by position.
    pub async fn visible_sorted(
        &self,
        user_id: DbId,
        project_id: DbId,
        tracker_id: DbId,
    ) -> StoreResult<Vec<NoteTemplate>> {
        let candidates =
            NoteTemplateRepo::list_enabled_in_group(&self.pool, project_id, tracker_id).await?;
        let filter = VisibilityFilter::new(user_id, project_id, tracker_id);
        let visible = filter.apply(candidates, self.oracle.as_ref()).await?;
        Ok(visible)
    }

    /// Every template of a project, disabled ones included, for management views.
    pub async fn list_for_project(
        &self,
        project_id: DbId,
        tracker_id: Option<DbId>,
    ) -> StoreResult<Vec<NoteTemplate>> {
        Ok(NoteTemplateRepo::list_by_project(&self.pool, project_id, tracker_id).await?)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Validate and insert a template at the end of its group.
    pub async fn create(
        &self,
        author_id: Option<DbId>,
        project_id: DbId,
        input: &CreateNoteTemplate,
    ) -> StoreResult<NoteTemplate> {
        let (tracker_id, visibility) = self.validate_create(project_id, input).await?;

        let mut tx = self.pool.begin().await?;
        let result =
            insert_at_end(&mut tx, author_id, project_id, tracker_id, visibility, input).await;
        let template = finish(tx, result).await?;

        tracing::debug!(
            note_template_id = template.id,
            tracker_id,
            position = template.position,
            "Note template appended to group"
        );
        Ok(template)
    }

    /// Apply field edits, an optional tracker move, and an optional reposition.
    pub async fn update(&self, id: DbId, input: &UpdateNoteTemplate) -> StoreResult<NoteTemplate> {
        let mut tx = self.pool.begin().await?;
        let result = self.update_in(&mut tx, id, input).await;
        let template = finish(tx, result).await?;

        tracing::info!(note_template_id = id, "Note template updated");
        Ok(template)
    }

    /// Move a template to `position` within its group.
    ///
    /// Fails with `InvalidPosition` if `position` is outside `[1, group size]`.
    pub async fn reposition(&self, id: DbId, position: Position) -> StoreResult<NoteTemplate> {
        let mut tx = self.pool.begin().await?;
        let result = reposition_in(&mut tx, id, position).await;
        let (template, from) = finish(tx, result).await?;

        tracing::info!(
            note_template_id = id,
            from,
            to = position,
            "Note template repositioned"
        );
        Ok(template)
    }

    /// Delete a template and close the gap it leaves in its group.
    pub async fn delete(&self, id: DbId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let result = delete_in(&mut tx, id).await;
        let removed = finish(tx, result).await?;

        tracing::info!(
            note_template_id = id,
            project_id = removed.project_id,
            tracker_id = removed.tracker_id,
            "Note template deleted"
        );
        Ok(())
    }

    async fn update_in(
        &self,
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateNoteTemplate,
    ) -> StoreResult<NoteTemplate> {
        let current = lock_template(&mut *conn, id).await?;
        let target_tracker = self.validate_update(&current, input).await?;

        let mut tracker_id = current.tracker_id;
        let mut position = current.position;

        if let Some(new_tracker) = target_tracker {
            lock_group(&mut *conn, current.project_id, new_tracker).await?;
            let old_size =
                NoteTemplateRepo::count_group(&mut *conn, current.project_id, current.tracker_id)
                    .await?;
            let new_size =
                NoteTemplateRepo::count_group(&mut *conn, current.project_id, new_tracker).await?;

            let appended = next_position(new_size);
            NoteTemplateRepo::set_placement(&mut *conn, id, new_tracker, appended).await?;
            if let Some(shift) = plan_compaction(current.position, old_size) {
                NoteTemplateRepo::shift_group(
                    &mut *conn,
                    current.project_id,
                    current.tracker_id,
                    shift,
                )
                .await?;
            }

            tracing::debug!(
                note_template_id = id,
                from_tracker = current.tracker_id,
                to_tracker = new_tracker,
                "Note template moved to another tracker"
            );
            tracker_id = new_tracker;
            position = appended;
        }

        if let Some(target) = input.position {
            move_within_group(&mut *conn, &current, tracker_id, position, target).await?;
        }

        NoteTemplateRepo::update_fields(&mut *conn, id, input).await?;
        if let Some(role_ids) = &input.role_ids {
            NoteTemplateRepo::replace_roles(&mut *conn, id, role_ids).await?;
        }

        NoteTemplateRepo::find_in(conn, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    // ── Validation ───────────────────────────────────────────────────

    async fn validate_create(
        &self,
        project_id: DbId,
        input: &CreateNoteTemplate,
    ) -> StoreResult<(DbId, Visibility)> {
        let mut errors = FieldErrors::new();

        errors.check(
            "project_id",
            validate_required_id(Some(project_id)).map(|_| ()),
        );
        errors.check("name", validate_name(&input.name));
        if let Some(description) = &input.description {
            errors.check("description", validate_description(description));
        }
        errors.check("memo", validate_memo(&input.memo));

        let visibility = match input.visibility.as_deref() {
            Some(v) => errors.capture("visibility", parse_visibility(v)),
            None => Some(Visibility::default()),
        };
        if let Some(v) = visibility {
            if errors
                .capture("role_ids", validate_role_ids(v, &input.role_ids))
                .is_some()
            {
                self.check_roles_exist(&mut errors, &input.role_ids).await?;
            }
        }

        let tracker_id = errors.capture("tracker_id", validate_required_id(input.tracker_id));
        if let Some(tracker_id) = tracker_id {
            if !self.registry.tracker_enabled(project_id, tracker_id).await? {
                errors.push("tracker_id", "is not enabled for this project");
            }
        }

        errors.into_result()?;
        match (tracker_id, visibility) {
            (Some(tracker_id), Some(visibility)) => Ok((tracker_id, visibility)),
            _ => Err(CoreError::invalid_field("tracker_id", "is required").into()),
        }
    }

    /// Returns the new tracker when `input` moves the template to another one.
    async fn validate_update(
        &self,
        current: &NoteTemplate,
        input: &UpdateNoteTemplate,
    ) -> StoreResult<Option<DbId>> {
        let mut errors = FieldErrors::new();

        if let Some(name) = &input.name {
            errors.check("name", validate_name(name));
        }
        if let Some(description) = &input.description {
            errors.check("description", validate_description(description));
        }
        if let Some(memo) = &input.memo {
            errors.check("memo", validate_memo(memo));
        }

        let visibility = match input.visibility.as_deref() {
            Some(v) => errors.capture("visibility", parse_visibility(v)),
            None => Some(current.visibility()),
        };
        if input.visibility.is_some() || input.role_ids.is_some() {
            if let Some(v) = visibility {
                let role_ids = input.role_ids.as_deref().unwrap_or(current.role_ids.as_slice());
                let valid = errors.capture("role_ids", validate_role_ids(v, role_ids));
                if let (Some(()), Some(new_ids)) = (valid, input.role_ids.as_deref()) {
                    self.check_roles_exist(&mut errors, new_ids).await?;
                }
            }
        }

        let mut target_tracker = None;
        if let Some(tracker_id) = input.tracker_id.filter(|&t| t != current.tracker_id) {
            let checked = errors.capture("tracker_id", validate_required_id(Some(tracker_id)));
            if let Some(tracker_id) = checked {
                if self
                    .registry
                    .tracker_enabled(current.project_id, tracker_id)
                    .await?
                {
                    target_tracker = Some(tracker_id);
                } else {
                    errors.push("tracker_id", "is not enabled for this project");
                }
            }
        }

        errors.into_result()?;
        Ok(target_tracker)
    }

    async fn check_roles_exist(
        &self,
        errors: &mut FieldErrors,
        role_ids: &[DbId],
    ) -> StoreResult<()> {
        if role_ids.is_empty() {
            return Ok(());
        }
        let known = RoleRepo::existing_ids(&self.pool, role_ids).await?;
        if role_ids.iter().any(|id| !known.contains(id)) {
            errors.push("role_ids", "contains unknown roles");
        }
        Ok(())
    }
}

// ── Transaction bodies ───────────────────────────────────────────────

async fn insert_at_end(
    conn: &mut PgConnection,
    author_id: Option<DbId>,
    project_id: DbId,
    tracker_id: DbId,
    visibility: Visibility,
    input: &CreateNoteTemplate,
) -> StoreResult<NoteTemplate> {
    lock_group(&mut *conn, project_id, tracker_id).await?;

    let group_size = NoteTemplateRepo::count_group(&mut *conn, project_id, tracker_id).await?;
    let position = next_position(group_size);
    let id = NoteTemplateRepo::insert(
        &mut *conn, project_id, tracker_id, author_id, visibility, position, input,
    )
    .await?;
    if !input.role_ids.is_empty() {
        NoteTemplateRepo::replace_roles(&mut *conn, id, &input.role_ids).await?;
    }
    NoteTemplateRepo::find_in(conn, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Returns the moved template and the position it left.
async fn reposition_in(
    conn: &mut PgConnection,
    id: DbId,
    position: Position,
) -> StoreResult<(NoteTemplate, Position)> {
    let current = lock_template(&mut *conn, id).await?;
    move_within_group(&mut *conn, &current, current.tracker_id, current.position, position)
        .await?;

    let template = NoteTemplateRepo::find_in(conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok((template, current.position))
}

/// Returns the template as it was before removal.
async fn delete_in(conn: &mut PgConnection, id: DbId) -> StoreResult<NoteTemplate> {
    let current = lock_template(&mut *conn, id).await?;

    let group_size =
        NoteTemplateRepo::count_group(&mut *conn, current.project_id, current.tracker_id).await?;
    if !NoteTemplateRepo::delete(&mut *conn, id).await? {
        return Err(not_found(id));
    }
    if let Some(shift) = plan_compaction(current.position, group_size) {
        NoteTemplateRepo::shift_group(conn, current.project_id, current.tracker_id, shift).await?;
    }
    Ok(current)
}

// ── Transaction helpers ──────────────────────────────────────────────

fn not_found(id: DbId) -> StoreError {
    StoreError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// Take the group's advisory lock or fail with a retryable conflict.
async fn lock_group(
    conn: &mut PgConnection,
    project_id: DbId,
    tracker_id: DbId,
) -> StoreResult<()> {
    if NoteTemplateRepo::try_lock_group(conn, project_id, tracker_id).await? {
        return Ok(());
    }
    tracing::warn!(project_id, tracker_id, "Note template group busy");
    Err(CoreError::Conflict(format!(
        "note templates of project {project_id}, tracker {tracker_id} are being modified; retry"
    ))
    .into())
}

/// Lock a template's group, then its row.
///
/// The group is read unlocked first to learn which lock to take. If the
/// template changed group in between, the lock held is the wrong one and the
/// caller gets a conflict.
async fn lock_template(conn: &mut PgConnection, id: DbId) -> StoreResult<NoteTemplate> {
    let seen = NoteTemplateRepo::find_in(conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    lock_group(conn, seen.project_id, seen.tracker_id).await?;

    let current = NoteTemplateRepo::find_for_update(conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if current.tracker_id != seen.tracker_id {
        return Err(CoreError::Conflict(format!(
            "note template {id} moved to another tracker concurrently; retry"
        ))
        .into());
    }
    Ok(current)
}

/// Move `template`, currently at `from` in `tracker_id`, to `target`.
async fn move_within_group(
    conn: &mut PgConnection,
    template: &NoteTemplate,
    tracker_id: DbId,
    from: Position,
    target: Position,
) -> StoreResult<()> {
    let group_size = NoteTemplateRepo::count_group(conn, template.project_id, tracker_id).await?;
    if let Some(shift) = plan_move(from, target, group_size)? {
        NoteTemplateRepo::shift_group(conn, template.project_id, tracker_id, shift).await?;
        NoteTemplateRepo::set_placement(conn, template.id, tracker_id, target).await?;
    }
    Ok(())
}

/// Commit on success, roll back on failure.
///
/// The rollback is awaited so the group's advisory lock is released before
/// the error reaches the caller.
async fn finish<T>(tx: Transaction<'_, Postgres>, result: StoreResult<T>) -> StoreResult<T> {
    match result {
        Ok(value) => {
            commit(tx).await?;
            Ok(value)
        }
        Err(err) => {
            tx.rollback().await?;
            Err(err)
        }
    }
}

/// Commit, reporting a deferred position collision as a conflict.
async fn commit(tx: Transaction<'_, Postgres>) -> StoreResult<()> {
    tx.commit().await.map_err(|err| match &err {
        sqlx::Error::Database(db_err) if db_err.constraint() == Some(GROUP_POSITION_CONSTRAINT) => {
            tracing::warn!(error = %db_err, "Note template positions collided at commit");
            StoreError::Core(CoreError::Conflict(
                "note template positions changed concurrently; retry".to_string(),
            ))
        }
        _ => StoreError::Database(err),
    })
}
