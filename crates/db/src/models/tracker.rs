//! Tracker model.

use ntpl_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `trackers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tracker {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTracker {
    pub name: String,
}
