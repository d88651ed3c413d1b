//! Repository for the `roles` and `role_permissions` tables.

use ntpl_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{CreateRole, Role};

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct RoleRepo;

impl RoleRepo {
    /// Insert a role and grant its permissions in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateRole) -> Result<Role, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("INSERT INTO roles (name) VALUES ($1) RETURNING {COLUMNS}");
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission) \
             SELECT $1, UNNEST($2::TEXT[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(role.id)
        .bind(&input.permissions)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(role)
    }

    /// The subset of `ids` that name existing roles.
    pub async fn existing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT id FROM roles WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
