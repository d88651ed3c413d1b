//! Repository for the `note_templates` and `note_template_roles` tables.
//!
//! Mutating functions take a `&mut PgConnection` and expect to run inside a
//! transaction opened by the caller; [`crate::store::NoteTemplateStore`]
//! owns the transaction boundaries and the group lock.

use ntpl_core::note_template::Visibility;
use ntpl_core::positioning::Shift;
use ntpl_core::types::{DbId, Position};
use sqlx::{PgConnection, PgPool};

use crate::models::note_template::{CreateNoteTemplate, NoteTemplate, UpdateNoteTemplate};

/// Column list shared across queries. Expects `note_templates` aliased as `nt`.
const COLUMNS: &str = "nt.id, nt.project_id, nt.tracker_id, nt.author_id, nt.name, \
    nt.description, nt.memo, nt.enabled, nt.visibility, nt.position, \
    ARRAY(SELECT r.role_id FROM note_template_roles r \
          WHERE r.note_template_id = nt.id ORDER BY r.role_id) AS role_ids, \
    nt.created_at, nt.updated_at";

/// Provides queries and transactional primitives for note templates.
pub struct NoteTemplateRepo;

impl NoteTemplateRepo {
    // ── Reads ────────────────────────────────────────────────────────

    /// Find a template by ID, regardless of `enabled` or visibility.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<NoteTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM note_templates nt WHERE nt.id = $1");
        sqlx::query_as::<_, NoteTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Enabled templates of one group, ordered by position.
    pub async fn list_enabled_in_group(
        pool: &PgPool,
        project_id: DbId,
        tracker_id: DbId,
    ) -> Result<Vec<NoteTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM note_templates nt \
             WHERE nt.project_id = $1 AND nt.tracker_id = $2 AND nt.enabled = true \
             ORDER BY nt.position ASC"
        );
        sqlx::query_as::<_, NoteTemplate>(&query)
            .bind(project_id)
            .bind(tracker_id)
            .fetch_all(pool)
            .await
    }

    /// All templates of a project, including disabled ones, optionally
    /// narrowed to one tracker. Ordered by tracker, then position.
    pub async fn list_by_project(
        pool: &PgPool,
        project_id: DbId,
        tracker_id: Option<DbId>,
    ) -> Result<Vec<NoteTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM note_templates nt \
             WHERE nt.project_id = $1 AND ($2::BIGINT IS NULL OR nt.tracker_id = $2) \
             ORDER BY nt.tracker_id ASC, nt.position ASC"
        );
        sqlx::query_as::<_, NoteTemplate>(&query)
            .bind(project_id)
            .bind(tracker_id)
            .fetch_all(pool)
            .await
    }

    /// Positions currently held in a group, ascending.
    pub async fn group_positions(
        pool: &PgPool,
        project_id: DbId,
        tracker_id: DbId,
    ) -> Result<Vec<Position>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT position FROM note_templates \
             WHERE project_id = $1 AND tracker_id = $2 \
             ORDER BY position ASC",
        )
        .bind(project_id)
        .bind(tracker_id)
        .fetch_all(pool)
        .await
    }

    // ── Transactional primitives ─────────────────────────────────────

    /// Find a template by ID and lock its row until the transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<NoteTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM note_templates nt WHERE nt.id = $1 FOR UPDATE OF nt"
        );
        sqlx::query_as::<_, NoteTemplate>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Try to take the transaction-scoped advisory lock for a group.
    ///
    /// Returns `false` immediately if another transaction holds it.
    pub async fn try_lock_group(
        conn: &mut PgConnection,
        project_id: DbId,
        tracker_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT pg_try_advisory_xact_lock(\
                hashtextextended('note_templates:' || $1::TEXT || ':' || $2::TEXT, 0))",
        )
        .bind(project_id)
        .bind(tracker_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// Number of templates in a group.
    pub async fn count_group(
        conn: &mut PgConnection,
        project_id: DbId,
        tracker_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM note_templates WHERE project_id = $1 AND tracker_id = $2",
        )
        .bind(project_id)
        .bind(tracker_id)
        .fetch_one(&mut *conn)
        .await
    }

    /// Insert a template at `position`, returning the new ID.
    ///
    /// `enabled` defaults to `true`.
    pub async fn insert(
        conn: &mut PgConnection,
        project_id: DbId,
        tracker_id: DbId,
        author_id: Option<DbId>,
        visibility: Visibility,
        position: Position,
        input: &CreateNoteTemplate,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO note_templates \
                (project_id, tracker_id, author_id, name, description, memo, \
                 enabled, visibility, position) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, true), $8, $9) \
             RETURNING id",
        )
        .bind(project_id)
        .bind(tracker_id)
        .bind(author_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&input.memo)
        .bind(input.enabled)
        .bind(visibility.as_str())
        .bind(position)
        .fetch_one(&mut *conn)
        .await
    }

    /// Apply the plain field edits of `input`. Only non-`None` fields change;
    /// tracker, position, and roles are handled separately.
    pub async fn update_fields(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateNoteTemplate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE note_templates SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                memo = COALESCE($4, memo), \
                enabled = COALESCE($5, enabled), \
                visibility = COALESCE($6, visibility) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.name.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(&input.memo)
        .bind(input.enabled)
        .bind(&input.visibility)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move every position of a group inside `shift` by `shift.delta`.
    pub async fn shift_group(
        conn: &mut PgConnection,
        project_id: DbId,
        tracker_id: DbId,
        shift: Shift,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE note_templates SET position = position + $5 \
             WHERE project_id = $1 AND tracker_id = $2 AND position BETWEEN $3 AND $4",
        )
        .bind(project_id)
        .bind(tracker_id)
        .bind(shift.from)
        .bind(shift.to)
        .bind(shift.delta)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Place a template at `position` within `tracker_id` of its project.
    pub async fn set_placement(
        conn: &mut PgConnection,
        id: DbId,
        tracker_id: DbId,
        position: Position,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE note_templates SET tracker_id = $2, position = $3 WHERE id = $1")
                .bind(id)
                .bind(tracker_id)
                .bind(position)
                .execute(&mut *conn)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the role list of a template.
    pub async fn replace_roles(
        conn: &mut PgConnection,
        id: DbId,
        role_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM note_template_roles WHERE note_template_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if role_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO note_template_roles (note_template_id, role_id) \
             SELECT $1, UNNEST($2::BIGINT[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(role_ids)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Delete a template by ID. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM note_templates WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Read a template on the transaction's connection, without locking it.
    pub async fn find_in(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<NoteTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM note_templates nt WHERE nt.id = $1");
        sqlx::query_as::<_, NoteTemplate>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}
