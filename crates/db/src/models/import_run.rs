//! Import run history entities.

use serde::Serialize;
use sqlx::FromRow;

use opsboard_core::import::conflict::ConflictStrategy;
use opsboard_core::types::{DbId, Timestamp};

/// A row from the `import_runs` table: one executed batch.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportRun {
    pub id: DbId,
    pub organization_id: DbId,
    pub team_id: Option<DbId>,
    pub user_id: DbId,
    /// `"scorecard"` or `"issues"`.
    pub kind: String,
    pub file_name: String,
    pub strategy: String,
    pub created_count: i32,
    pub updated_count: i32,
    pub skipped_count: i32,
    pub error_count: i32,
    pub scores_added: i32,
    pub scores_skipped: i32,
    pub groups_created: i32,
    pub errors: serde_json::Value,
    pub unmapped_names: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for recording a finished batch.
#[derive(Debug, Clone)]
pub struct CreateImportRun {
    pub organization_id: DbId,
    pub team_id: Option<DbId>,
    pub user_id: DbId,
    pub kind: &'static str,
    pub file_name: String,
    pub strategy: ConflictStrategy,
    pub created_count: i32,
    pub updated_count: i32,
    pub skipped_count: i32,
    pub error_count: i32,
    pub scores_added: i32,
    pub scores_skipped: i32,
    pub groups_created: i32,
    pub errors: serde_json::Value,
    pub unmapped_names: serde_json::Value,
}
