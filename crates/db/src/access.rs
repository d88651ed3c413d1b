//! Postgres-backed permission oracle and tracker registry.
//!
//! Administrators pass every check. Everyone else is judged by the roles
//! they hold as a member of the template's project.

use async_trait::async_trait;
use ntpl_core::access::{PermissionOracle, TemplateRef, TrackerRegistry};
use ntpl_core::error::CoreError;
use ntpl_core::note_template::Visibility;
use ntpl_core::permissions::{PERMISSION_EDIT_NOTE_TEMPLATES, PERMISSION_SHOW_NOTE_TEMPLATES};
use ntpl_core::types::DbId;
use sqlx::PgPool;

use crate::repositories::{MemberRepo, ProjectRepo, UserRepo};

fn internal(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Permission lookup failed");
    CoreError::Internal(format!("permission lookup failed: {err}"))
}

/// Resolves permissions from `users`, `members`, `member_roles`, and
/// `role_permissions`.
#[derive(Debug, Clone)]
pub struct PgPermissionOracle {
    pool: PgPool,
}

impl PgPermissionOracle {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn has_permission(
        &self,
        user_id: DbId,
        project_id: DbId,
        permission: &str,
    ) -> Result<bool, CoreError> {
        if UserRepo::is_admin(&self.pool, user_id).await.map_err(internal)? {
            return Ok(true);
        }
        MemberRepo::has_permission(&self.pool, user_id, project_id, permission)
            .await
            .map_err(internal)
    }
}

#[async_trait]
impl PermissionOracle for PgPermissionOracle {
    async fn can_view(&self, user_id: DbId, template: TemplateRef<'_>) -> Result<bool, CoreError> {
        if UserRepo::is_admin(&self.pool, user_id).await.map_err(internal)? {
            return Ok(true);
        }
        match template.visibility {
            Visibility::Open => Ok(true),
            Visibility::Mine => Ok(template.author_id == Some(user_id)),
            Visibility::Roles => MemberRepo::holds_any_role(
                &self.pool,
                user_id,
                template.project_id,
                template.role_ids,
            )
            .await
            .map_err(internal),
        }
    }

    async fn can_manage(&self, user_id: DbId, project_id: DbId) -> Result<bool, CoreError> {
        self.has_permission(user_id, project_id, PERMISSION_EDIT_NOTE_TEMPLATES)
            .await
    }

    async fn can_show(&self, user_id: DbId, project_id: DbId) -> Result<bool, CoreError> {
        self.has_permission(user_id, project_id, PERMISSION_SHOW_NOTE_TEMPLATES)
            .await
    }
}

/// Answers tracker membership from `project_trackers`.
#[derive(Debug, Clone)]
pub struct PgTrackerRegistry {
    pool: PgPool,
}

impl PgTrackerRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackerRegistry for PgTrackerRegistry {
    async fn tracker_enabled(
        &self,
        project_id: DbId,
        tracker_id: DbId,
    ) -> Result<bool, CoreError> {
        ProjectRepo::tracker_enabled(&self.pool, project_id, tracker_id)
            .await
            .map_err(internal)
    }
}
