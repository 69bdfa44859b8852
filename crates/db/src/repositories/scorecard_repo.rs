//! Repositories for scorecard groups, metrics, and scores.
//!
//! All methods take `&mut PgConnection` because the importer drives them
//! from inside one batch transaction; a statement issued on the pool
//! would not see the batch's own uncommitted writes.

use chrono::NaiveDate;
use sqlx::PgConnection;

use opsboard_core::import::candidate::normalize_title;
use opsboard_core::types::DbId;

use crate::models::scorecard::{
    CreateMetric, MetricImportPatch, ScorecardGroup, ScorecardMetric, ScorecardScore,
};

/// Column list for `scorecard_groups`.
const GROUP_COLUMNS: &str =
    "id, organization_id, team_id, name, sort_order, created_at, updated_at, deleted_at";

/// Column list for `scorecard_metrics`.
const METRIC_COLUMNS: &str =
    "id, organization_id, team_id, group_id, name, description, owner_id, goal_raw, \
     goal_operator, goal_value, goal_direction, goal_format, cadence, created_by, \
     created_at, updated_at, deleted_at";

/// Column list for `scorecard_scores`.
const SCORE_COLUMNS: &str = "id, metric_id, week_ending, value, created_at, updated_at";

// ── GroupRepo ────────────────────────────────────────────────────────

/// Provides operations for scorecard groups.
pub struct GroupRepo;

impl GroupRepo {
    /// Find a live group by its case-insensitive name within an org/team.
    pub async fn find_active(
        conn: &mut PgConnection,
        organization_id: DbId,
        team_id: Option<DbId>,
        name: &str,
    ) -> Result<Option<ScorecardGroup>, sqlx::Error> {
        let sql = format!(
            "SELECT {GROUP_COLUMNS} FROM scorecard_groups
             WHERE organization_id = $1
               AND team_id IS NOT DISTINCT FROM $2
               AND lower(btrim(name)) = $3
               AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, ScorecardGroup>(&sql)
            .bind(organization_id)
            .bind(team_id)
            .bind(normalize_title(name))
            .fetch_optional(&mut *conn)
            .await
    }

    /// Create a group at the end of the org/team's sort order.
    pub async fn create(
        conn: &mut PgConnection,
        organization_id: DbId,
        team_id: Option<DbId>,
        name: &str,
    ) -> Result<ScorecardGroup, sqlx::Error> {
        let sql = format!(
            "INSERT INTO scorecard_groups (organization_id, team_id, name, sort_order)
             VALUES ($1, $2, $3, (
                 SELECT COALESCE(MAX(sort_order) + 1, 0) FROM scorecard_groups
                 WHERE organization_id = $1
                   AND team_id IS NOT DISTINCT FROM $2
                   AND deleted_at IS NULL
             ))
             RETURNING {GROUP_COLUMNS}"
        );
        sqlx::query_as::<_, ScorecardGroup>(&sql)
            .bind(organization_id)
            .bind(team_id)
            .bind(name)
            .fetch_one(&mut *conn)
            .await
    }
}

// ── MetricRepo ───────────────────────────────────────────────────────

/// Provides operations for scorecard metrics.
pub struct MetricRepo;

impl MetricRepo {
    /// Find a live metric by its natural key: org + team + trimmed
    /// lowercase name + cadence.
    pub async fn find_by_identity(
        conn: &mut PgConnection,
        organization_id: DbId,
        team_id: Option<DbId>,
        name: &str,
        cadence: &str,
    ) -> Result<Option<ScorecardMetric>, sqlx::Error> {
        let sql = format!(
            "SELECT {METRIC_COLUMNS} FROM scorecard_metrics
             WHERE organization_id = $1
               AND team_id IS NOT DISTINCT FROM $2
               AND lower(btrim(name)) = $3
               AND cadence = $4
               AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, ScorecardMetric>(&sql)
            .bind(organization_id)
            .bind(team_id)
            .bind(normalize_title(name))
            .bind(cadence)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Insert a new metric, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateMetric,
    ) -> Result<ScorecardMetric, sqlx::Error> {
        let sql = format!(
            "INSERT INTO scorecard_metrics
                (organization_id, team_id, group_id, name, description, owner_id,
                 goal_raw, goal_operator, goal_value, goal_direction, goal_format,
                 cadence, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {METRIC_COLUMNS}"
        );
        sqlx::query_as::<_, ScorecardMetric>(&sql)
            .bind(input.organization_id)
            .bind(input.team_id)
            .bind(input.group_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.owner_id)
            .bind(&input.goal_raw)
            .bind(input.goal.operator.as_str())
            .bind(input.goal.value)
            .bind(input.goal.direction.as_str())
            .bind(input.goal.format.as_str())
            .bind(input.cadence.as_str())
            .bind(input.created_by)
            .fetch_one(&mut *conn)
            .await
    }

    /// Apply an import update to an existing metric.
    ///
    /// Creation metadata is preserved. A missing incoming description or
    /// goal keeps the stored one; the goal columns change as a unit, only
    /// when the file actually carried a goal expression.
    pub async fn update_imported(
        conn: &mut PgConnection,
        id: DbId,
        patch: &MetricImportPatch,
    ) -> Result<ScorecardMetric, sqlx::Error> {
        let sql = format!(
            "UPDATE scorecard_metrics SET
                group_id = $2,
                description = COALESCE($3, description),
                owner_id = $4,
                goal_raw = COALESCE($5, goal_raw),
                goal_operator = CASE WHEN $5 IS NULL THEN goal_operator ELSE $6 END,
                goal_value = CASE WHEN $5 IS NULL THEN goal_value ELSE $7 END,
                goal_direction = CASE WHEN $5 IS NULL THEN goal_direction ELSE $8 END,
                goal_format = CASE WHEN $5 IS NULL THEN goal_format ELSE $9 END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {METRIC_COLUMNS}"
        );
        sqlx::query_as::<_, ScorecardMetric>(&sql)
            .bind(id)
            .bind(patch.group_id)
            .bind(&patch.description)
            .bind(patch.owner_id)
            .bind(&patch.goal_raw)
            .bind(patch.goal.operator.as_str())
            .bind(patch.goal.value)
            .bind(patch.goal.direction.as_str())
            .bind(patch.goal.format.as_str())
            .fetch_one(&mut *conn)
            .await
    }
}

// ── ScoreRepo ────────────────────────────────────────────────────────

/// Provides operations for scorecard scores.
pub struct ScoreRepo;

impl ScoreRepo {
    /// Whether a score already exists for a metric and period end.
    pub async fn exists(
        conn: &mut PgConnection,
        metric_id: DbId,
        week_ending: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1 FROM scorecard_scores WHERE metric_id = $1 AND week_ending = $2
             )",
        )
        .bind(metric_id)
        .bind(week_ending)
        .fetch_one(&mut *conn)
        .await
    }

    /// Insert one score value.
    pub async fn insert(
        conn: &mut PgConnection,
        metric_id: DbId,
        week_ending: NaiveDate,
        value: f64,
    ) -> Result<ScorecardScore, sqlx::Error> {
        let sql = format!(
            "INSERT INTO scorecard_scores (metric_id, week_ending, value)
             VALUES ($1, $2, $3)
             RETURNING {SCORE_COLUMNS}"
        );
        sqlx::query_as::<_, ScorecardScore>(&sql)
            .bind(metric_id)
            .bind(week_ending)
            .bind(value)
            .fetch_one(&mut *conn)
            .await
    }

    /// Delete every score of a metric; returns the number removed.
    pub async fn delete_for_metric(
        conn: &mut PgConnection,
        metric_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scorecard_scores WHERE metric_id = $1")
            .bind(metric_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// All scores of a metric in period order.
    pub async fn list_for_metric(
        conn: &mut PgConnection,
        metric_id: DbId,
    ) -> Result<Vec<ScorecardScore>, sqlx::Error> {
        let sql = format!(
            "SELECT {SCORE_COLUMNS} FROM scorecard_scores
             WHERE metric_id = $1 ORDER BY week_ending"
        );
        sqlx::query_as::<_, ScorecardScore>(&sql)
            .bind(metric_id)
            .fetch_all(&mut *conn)
            .await
    }
}
