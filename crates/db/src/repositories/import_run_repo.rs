//! Repository for the `import_runs` history table.

use sqlx::{PgConnection, PgPool};

use opsboard_core::types::DbId;

use crate::models::import_run::{CreateImportRun, ImportRun};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, organization_id, team_id, user_id, kind, file_name, strategy, \
     created_count, updated_count, skipped_count, error_count, \
     scores_added, scores_skipped, groups_created, errors, unmapped_names, created_at";

/// Provides operations for import run history.
pub struct ImportRunRepo;

impl ImportRunRepo {
    /// Record a finished batch. Runs on the batch transaction, so a
    /// rolled-back import records nothing.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateImportRun,
    ) -> Result<ImportRun, sqlx::Error> {
        let sql = format!(
            "INSERT INTO import_runs
                (organization_id, team_id, user_id, kind, file_name, strategy,
                 created_count, updated_count, skipped_count, error_count,
                 scores_added, scores_skipped, groups_created, errors, unmapped_names)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ImportRun>(&sql)
            .bind(input.organization_id)
            .bind(input.team_id)
            .bind(input.user_id)
            .bind(input.kind)
            .bind(&input.file_name)
            .bind(input.strategy.as_str())
            .bind(input.created_count)
            .bind(input.updated_count)
            .bind(input.skipped_count)
            .bind(input.error_count)
            .bind(input.scores_added)
            .bind(input.scores_skipped)
            .bind(input.groups_created)
            .bind(&input.errors)
            .bind(&input.unmapped_names)
            .fetch_one(&mut *conn)
            .await
    }

    /// Most recent runs for an organization, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        organization_id: DbId,
        limit: i64,
    ) -> Result<Vec<ImportRun>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM import_runs
             WHERE organization_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, ImportRun>(&sql)
            .bind(organization_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
