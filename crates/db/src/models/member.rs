//! Project membership model.

use ntpl_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Member {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for adding a user to a project with a set of roles.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMember {
    pub project_id: DbId,
    pub user_id: DbId,
    pub role_ids: Vec<DbId>,
}
