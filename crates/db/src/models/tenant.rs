//! Organization and team entities.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use opsboard_core::types::{DbId, Timestamp};

/// A row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `teams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Team {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a team.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTeam {
    pub organization_id: DbId,
    pub name: String,
}
