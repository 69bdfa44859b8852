//! Repository for the `issues` table.
//!
//! Import-facing methods take `&mut PgConnection` so they run on the
//! batch transaction.

use sqlx::PgConnection;

use opsboard_core::import::candidate::normalize_title;
use opsboard_core::types::DbId;

use crate::models::issue::{CreateImportedIssue, Issue, IssueImportPatch};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, organization_id, team_id, title, description, status, priority, timeline, \
     owner_id, created_by, completed_on, archived_on, external_link, created_via, \
     created_at, updated_at, deleted_at";

/// Provides operations for issues.
pub struct IssueRepo;

impl IssueRepo {
    /// Find a live issue by its natural key: org + team + trimmed
    /// lowercase title + timeline.
    pub async fn find_by_identity(
        conn: &mut PgConnection,
        organization_id: DbId,
        team_id: Option<DbId>,
        title: &str,
        timeline: &str,
    ) -> Result<Option<Issue>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM issues
             WHERE organization_id = $1
               AND team_id IS NOT DISTINCT FROM $2
               AND lower(btrim(title)) = $3
               AND timeline = $4
               AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Issue>(&sql)
            .bind(organization_id)
            .bind(team_id)
            .bind(normalize_title(title))
            .bind(timeline)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Insert an imported issue. The spreadsheet's creation date, when
    /// present, becomes the row's `created_at`.
    pub async fn create_imported(
        conn: &mut PgConnection,
        input: &CreateImportedIssue,
    ) -> Result<Issue, sqlx::Error> {
        let sql = format!(
            "INSERT INTO issues
                (organization_id, team_id, title, description, status, priority,
                 timeline, owner_id, created_by, completed_on, archived_on,
                 external_link, created_via, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'import',
                     COALESCE($13::date::timestamptz, now()))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&sql)
            .bind(input.organization_id)
            .bind(input.team_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.status.as_str())
            .bind(input.priority.as_str())
            .bind(input.timeline.as_str())
            .bind(input.owner_id)
            .bind(input.created_by)
            .bind(input.completed_on)
            .bind(input.archived_on)
            .bind(&input.external_link)
            .bind(input.created_date)
            .fetch_one(&mut *conn)
            .await
    }

    /// Apply an import update to an existing issue.
    ///
    /// Lifecycle state, priority, and owner follow the file; a missing
    /// incoming description keeps the stored one. Creation metadata is
    /// never touched.
    pub async fn update_imported(
        conn: &mut PgConnection,
        id: DbId,
        patch: &IssueImportPatch,
    ) -> Result<Issue, sqlx::Error> {
        let sql = format!(
            "UPDATE issues SET
                status = $2,
                priority = $3,
                owner_id = $4,
                description = COALESCE($5, description),
                completed_on = $6,
                archived_on = $7,
                external_link = COALESCE($8, external_link)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Issue>(&sql)
            .bind(id)
            .bind(patch.status.as_str())
            .bind(patch.priority.as_str())
            .bind(patch.owner_id)
            .bind(&patch.description)
            .bind(patch.completed_on)
            .bind(patch.archived_on)
            .bind(&patch.external_link)
            .fetch_one(&mut *conn)
            .await
    }
}
