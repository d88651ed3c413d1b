//! Role model.

use ntpl_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a role together with its granted permissions.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub permissions: Vec<String>,
}
