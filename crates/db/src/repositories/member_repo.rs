//! Repository for the `members` and `member_roles` tables.
//!
//! Backs the Postgres permission oracle: every check resolves through a
//! user's roles in one project.

use ntpl_core::types::DbId;
use sqlx::PgPool;

use crate::models::member::{CreateMember, Member};

const COLUMNS: &str = "id, project_id, user_id, created_at";

pub struct MemberRepo;

impl MemberRepo {
    /// Add a user to a project with the given roles, in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateMember) -> Result<Member, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO members (project_id, user_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        let member = sqlx::query_as::<_, Member>(&query)
            .bind(input.project_id)
            .bind(input.user_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO member_roles (member_id, role_id) \
             SELECT $1, UNNEST($2::BIGINT[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(member.id)
        .bind(&input.role_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(member)
    }

    /// Whether the user holds a role in the project granting `permission`.
    pub async fn has_permission(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
        permission: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (\
                SELECT 1 FROM members m \
                JOIN member_roles mr ON mr.member_id = m.id \
                JOIN role_permissions rp ON rp.role_id = mr.role_id \
                WHERE m.user_id = $1 AND m.project_id = $2 AND rp.permission = $3)",
        )
        .bind(user_id)
        .bind(project_id)
        .bind(permission)
        .fetch_one(pool)
        .await
    }

    /// Whether the user holds any of `role_ids` in the project.
    pub async fn holds_any_role(
        pool: &PgPool,
        user_id: DbId,
        project_id: DbId,
        role_ids: &[DbId],
    ) -> Result<bool, sqlx::Error> {
        if role_ids.is_empty() {
            return Ok(false);
        }
        sqlx::query_scalar(
            "SELECT EXISTS (\
                SELECT 1 FROM members m \
                JOIN member_roles mr ON mr.member_id = m.id \
                WHERE m.user_id = $1 AND m.project_id = $2 AND mr.role_id = ANY($3))",
        )
        .bind(user_id)
        .bind(project_id)
        .bind(role_ids)
        .fetch_one(pool)
        .await
    }
}
