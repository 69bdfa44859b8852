//! Scorecard entities: groups, metrics, and scores.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

use opsboard_core::import::candidate::Cadence;
use opsboard_core::import::parse::Goal;
use opsboard_core::types::{DbId, Timestamp};

/// A row from the `scorecard_groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScorecardGroup {
    pub id: DbId,
    pub organization_id: DbId,
    pub team_id: Option<DbId>,
    pub name: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// A row from the `scorecard_metrics` table.
///
/// Goal columns hold the vocabulary strings the schema CHECKs; the typed
/// enums live in `opsboard-core` and are stringified at the insert site.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScorecardMetric {
    pub id: DbId,
    pub organization_id: DbId,
    pub team_id: Option<DbId>,
    pub group_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: DbId,
    pub goal_raw: Option<String>,
    pub goal_operator: String,
    pub goal_value: f64,
    pub goal_direction: String,
    pub goal_format: String,
    pub cadence: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// A row from the `scorecard_scores` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScorecardScore {
    pub id: DbId,
    pub metric_id: DbId,
    pub week_ending: NaiveDate,
    pub value: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a metric.
#[derive(Debug, Clone)]
pub struct CreateMetric {
    pub organization_id: DbId,
    pub team_id: Option<DbId>,
    pub group_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: DbId,
    pub goal_raw: Option<String>,
    pub goal: Goal,
    pub cadence: Cadence,
    pub created_by: Option<DbId>,
}

/// Fields an import is allowed to change on an existing metric. Creation
/// metadata (`created_by`, `created_at`) is never touched.
#[derive(Debug, Clone)]
pub struct MetricImportPatch {
    pub group_id: Option<DbId>,
    pub description: Option<String>,
    pub owner_id: DbId,
    pub goal_raw: Option<String>,
    pub goal: Goal,
}
