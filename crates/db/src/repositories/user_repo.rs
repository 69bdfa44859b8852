//! Repository for the `users` table.

use sqlx::PgPool;

use opsboard_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, organization_id, first_name, last_name, email, role, is_active, created_at, updated_at";

/// Provides operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (organization_id, first_name, last_name, email, role)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'member'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(input.organization_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The active roster of an organization, in stable id order. This is
    /// the search space for owner-name matching, loaded once per import.
    pub async fn list_active_by_org(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<User>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM users
             WHERE organization_id = $1 AND is_active = TRUE
             ORDER BY id"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }
}
