//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use opsboard_core::import::identity::UserRef;
use opsboard_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub organization_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Resolved role name (`"admin"`, `"manager"`, `"member"`).
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Roster entry for owner-name matching.
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub organization_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Defaults to `"member"` when absent.
    pub role: Option<String>,
}
