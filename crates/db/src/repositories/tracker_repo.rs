//! Repository for the `trackers` table.

use sqlx::PgPool;

use crate::models::tracker::{CreateTracker, Tracker};

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct TrackerRepo;

impl TrackerRepo {
    /// Insert a new tracker, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTracker) -> Result<Tracker, sqlx::Error> {
        let query = format!("INSERT INTO trackers (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Tracker>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }
}
