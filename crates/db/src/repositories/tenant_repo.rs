//! Repositories for organizations and teams.

use sqlx::PgPool;

use opsboard_core::types::DbId;

use crate::models::tenant::{CreateTeam, Organization, Team};

/// Column list for `organizations`.
const ORGANIZATION_COLUMNS: &str = "id, name, created_at, updated_at";

/// Column list for `teams`.
const TEAM_COLUMNS: &str = "id, organization_id, name, created_at, updated_at";

// ── OrganizationRepo ─────────────────────────────────────────────────

pub struct OrganizationRepo;

impl OrganizationRepo {
    pub async fn create(pool: &PgPool, name: &str) -> Result<Organization, sqlx::Error> {
        let sql = format!(
            "INSERT INTO organizations (name) VALUES ($1) RETURNING {ORGANIZATION_COLUMNS}"
        );
        sqlx::query_as::<_, Organization>(&sql)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organization>, sqlx::Error> {
        let sql = format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = $1");
        sqlx::query_as::<_, Organization>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

// ── TeamRepo ─────────────────────────────────────────────────────────

pub struct TeamRepo;

impl TeamRepo {
    pub async fn create(pool: &PgPool, input: &CreateTeam) -> Result<Team, sqlx::Error> {
        let sql = format!(
            "INSERT INTO teams (organization_id, name) VALUES ($1, $2) RETURNING {TEAM_COLUMNS}"
        );
        sqlx::query_as::<_, Team>(&sql)
            .bind(input.organization_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    /// Find a team, scoped to an organization so one tenant can never
    /// address another tenant's team id.
    pub async fn find_in_org(
        pool: &PgPool,
        organization_id: DbId,
        id: DbId,
    ) -> Result<Option<Team>, sqlx::Error> {
        let sql = format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, Team>(&sql)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }
}
