//! Repository for the `projects` and `project_trackers` tables.

use ntpl_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project};

const COLUMNS: &str = "id, identifier, name, created_at, updated_at";

/// Provides project lookups and the enabled-tracker registry.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (identifier, name) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.identifier)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Enable a tracker for a project. Idempotent.
    pub async fn enable_tracker(
        pool: &PgPool,
        project_id: DbId,
        tracker_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO project_trackers (project_id, tracker_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(project_id)
        .bind(tracker_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Disable a tracker for a project. Returns `true` if it was enabled.
    pub async fn disable_tracker(
        pool: &PgPool,
        project_id: DbId,
        tracker_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_trackers WHERE project_id = $1 AND tracker_id = $2")
                .bind(project_id)
                .bind(tracker_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether `tracker_id` is among the project's enabled trackers.
    pub async fn tracker_enabled(
        pool: &PgPool,
        project_id: DbId,
        tracker_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (\
                SELECT 1 FROM project_trackers WHERE project_id = $1 AND tracker_id = $2)",
        )
        .bind(project_id)
        .bind(tracker_id)
        .fetch_one(pool)
        .await
    }
}
