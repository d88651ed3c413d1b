//! Repository for the `users` table.

use ntpl_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

const COLUMNS: &str = "id, login, is_admin, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row. `is_admin` defaults to `false`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (login, is_admin) VALUES ($1, COALESCE($2, false)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.login)
            .bind(input.is_admin)
            .fetch_one(pool)
            .await
    }

    /// Whether the user exists and is a global administrator.
    pub async fn is_admin(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND is_admin)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
