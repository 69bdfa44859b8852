//! Issue entity model and DTOs.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use opsboard_core::import::candidate::{IssuePriority, IssueStatus, Timeline};
use opsboard_core::types::{DbId, Timestamp};

/// A row from the `issues` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Issue {
    pub id: DbId,
    pub organization_id: DbId,
    pub team_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub timeline: String,
    pub owner_id: DbId,
    pub created_by: Option<DbId>,
    pub completed_on: Option<NaiveDate>,
    pub archived_on: Option<NaiveDate>,
    pub external_link: Option<String>,
    pub created_via: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// DTO for inserting an issue through the importer.
#[derive(Debug, Clone)]
pub struct CreateImportedIssue {
    pub organization_id: DbId,
    pub team_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub timeline: Timeline,
    pub owner_id: DbId,
    pub created_by: Option<DbId>,
    /// Spreadsheet-supplied creation date; row timestamp when absent.
    pub created_date: Option<NaiveDate>,
    pub completed_on: Option<NaiveDate>,
    pub archived_on: Option<NaiveDate>,
    pub external_link: Option<String>,
}

/// Fields an import is allowed to change on an existing issue. Creation
/// metadata is never touched; a missing incoming description keeps the
/// existing one.
#[derive(Debug, Clone)]
pub struct IssueImportPatch {
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub owner_id: DbId,
    pub description: Option<String>,
    pub completed_on: Option<NaiveDate>,
    pub archived_on: Option<NaiveDate>,
    pub external_link: Option<String>,
}
