//! Scorecard import: the Postgres store and the preview/execute flows.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use sqlx::PgConnection;

use opsboard_core::import::candidate::{normalize_title, Cadence, MetricCandidate, ScorePoint};
use opsboard_core::import::conflict::ConflictStrategy;
use opsboard_core::import::identity::OwnerResolution;
use opsboard_core::import::outcome::{PreviewReport, RowError};
use opsboard_core::import::scorecard::{transform_scorecard, SCORECARD_SHEET};
use opsboard_core::sheet::Workbook;
use opsboard_core::types::DbId;
use opsboard_db::models::import_run::CreateImportRun;
use opsboard_db::models::scorecard::{CreateMetric, MetricImportPatch};
use opsboard_db::repositories::{GroupRepo, ImportRunRepo, MetricRepo, ScoreRepo};
use opsboard_db::DbPool;

use crate::engine::{self, ImportContext};
use crate::error::ImportError;
use crate::preview::build_preview;
use crate::roster::load_identity_index;
use crate::store::{self, CandidateStore, StoreError};

// ---------------------------------------------------------------------------
// PgScorecardStore
// ---------------------------------------------------------------------------

/// State restored when a row's bracket is aborted. The group cache and
/// the counters must track the database exactly, so anything a failed row
/// changed in them has to be undone with it.
struct RowSnapshot {
    group_ids: HashMap<String, DbId>,
    scores_added: usize,
    scores_skipped: usize,
    groups_created: usize,
}

/// Store for metric candidates, bound to one batch transaction.
///
/// Group names are resolved through a per-batch cache so two rows naming
/// the same new group create it once. Score writes are counted here
/// because they are a scorecard-only concern the generic engine knows
/// nothing about.
pub struct PgScorecardStore<'a> {
    conn: &'a mut PgConnection,
    ctx: ImportContext,
    group_ids: HashMap<String, DbId>,
    snapshot: Option<RowSnapshot>,
    pub scores_added: usize,
    pub scores_skipped: usize,
    pub groups_created: usize,
}

impl<'a> PgScorecardStore<'a> {
    pub fn new(conn: &'a mut PgConnection, ctx: ImportContext) -> PgScorecardStore<'a> {
        PgScorecardStore {
            conn,
            ctx,
            group_ids: HashMap::new(),
            snapshot: None,
            scores_added: 0,
            scores_skipped: 0,
            groups_created: 0,
        }
    }

    /// Resolve a group name to its id, creating the group on first use.
    async fn group_id(&mut self, name: &str) -> Result<DbId, StoreError> {
        let key = normalize_title(name);
        if let Some(&id) = self.group_ids.get(&key) {
            return Ok(id);
        }

        let found =
            GroupRepo::find_active(self.conn, self.ctx.organization_id, self.ctx.team_id, name)
                .await
                .map_err(StoreError::classify)?;
        let group = match found {
            Some(group) => group,
            None => {
                let created =
                    GroupRepo::create(self.conn, self.ctx.organization_id, self.ctx.team_id, name)
                        .await
                        .map_err(StoreError::classify)?;
                self.groups_created += 1;
                created
            }
        };

        self.group_ids.insert(key, group.id);
        Ok(group.id)
    }

    /// Insert the candidate's score points, skipping any period the metric
    /// already has a value for.
    async fn write_scores(
        &mut self,
        metric_id: DbId,
        scores: &[ScorePoint],
    ) -> Result<(), StoreError> {
        for point in scores {
            let present = ScoreRepo::exists(self.conn, metric_id, point.period_end)
                .await
                .map_err(StoreError::classify)?;
            if present {
                self.scores_skipped += 1;
            } else {
                ScoreRepo::insert(self.conn, metric_id, point.period_end, point.value)
                    .await
                    .map_err(StoreError::classify)?;
                self.scores_added += 1;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CandidateStore<MetricCandidate> for PgScorecardStore<'_> {
    async fn find_existing(
        &mut self,
        candidate: &MetricCandidate,
    ) -> Result<Option<DbId>, StoreError> {
        let metric = MetricRepo::find_by_identity(
            self.conn,
            self.ctx.organization_id,
            self.ctx.team_id,
            &candidate.title,
            candidate.cadence.as_str(),
        )
        .await
        .map_err(StoreError::classify)?;
        Ok(metric.map(|m| m.id))
    }

    async fn insert(
        &mut self,
        candidate: &MetricCandidate,
        owner: &OwnerResolution,
    ) -> Result<(), StoreError> {
        let group_id = self.group_id(&candidate.group_name).await?;
        let metric = MetricRepo::create(
            self.conn,
            &CreateMetric {
                organization_id: self.ctx.organization_id,
                team_id: self.ctx.team_id,
                group_id: Some(group_id),
                name: candidate.title.clone(),
                description: candidate.description.clone(),
                owner_id: owner.user_id(),
                goal_raw: candidate.goal_raw.clone(),
                goal: candidate.goal,
                cadence: candidate.cadence,
                created_by: Some(self.ctx.importing_user_id),
            },
        )
        .await
        .map_err(StoreError::classify)?;

        self.write_scores(metric.id, &candidate.scores).await
    }

    async fn update(
        &mut self,
        existing_id: DbId,
        candidate: &MetricCandidate,
        owner: &OwnerResolution,
    ) -> Result<(), StoreError> {
        let group_id = self.group_id(&candidate.group_name).await?;
        MetricRepo::update_imported(
            self.conn,
            existing_id,
            &MetricImportPatch {
                group_id: Some(group_id),
                description: candidate.description.clone(),
                owner_id: owner.user_id(),
                goal_raw: candidate.goal_raw.clone(),
                goal: candidate.goal,
            },
        )
        .await
        .map_err(StoreError::classify)?;

        // Update strategy: the file's scores become the record of truth.
        // Merge keeps stored values and only fills missing periods.
        if self.ctx.strategy == ConflictStrategy::Update {
            ScoreRepo::delete_for_metric(self.conn, existing_id)
                .await
                .map_err(StoreError::classify)?;
        }
        self.write_scores(existing_id, &candidate.scores).await
    }

    async fn begin_row(&mut self) -> Result<(), StoreError> {
        self.snapshot = Some(RowSnapshot {
            group_ids: self.group_ids.clone(),
            scores_added: self.scores_added,
            scores_skipped: self.scores_skipped,
            groups_created: self.groups_created,
        });
        store::row_savepoint(self.conn).await
    }

    async fn commit_row(&mut self) -> Result<(), StoreError> {
        self.snapshot = None;
        store::row_release(self.conn).await
    }

    async fn abort_row(&mut self) -> Result<(), StoreError> {
        if let Some(snapshot) = self.snapshot.take() {
            self.group_ids = snapshot.group_ids;
            self.scores_added = snapshot.scores_added;
            self.scores_skipped = snapshot.scores_skipped;
            self.groups_created = snapshot.groups_created;
        }
        store::row_rollback(self.conn).await
    }
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

/// What an executed scorecard import hands back to the API layer.
#[derive(Debug, Clone, Serialize)]
pub struct ScorecardImportReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    pub scores_added: usize,
    pub scores_skipped: usize,
    pub groups_created: usize,
    pub unmapped_names: Vec<String>,
}

/// Dry-run a scorecard workbook: decode, transform, classify. No writes.
pub async fn preview_scorecard(
    pool: &DbPool,
    ctx: ImportContext,
    file_name: &str,
    bytes: &[u8],
    cadence: Cadence,
    owner_overrides: HashMap<String, DbId>,
) -> Result<PreviewReport<MetricCandidate>, ImportError> {
    let workbook = Workbook::read(file_name, bytes)?;
    let sheets = workbook.resolve(&[SCORECARD_SHEET])?;
    let transformed = transform_scorecard(sheets[0], cadence, Utc::now().date_naive());

    let mut identity = load_identity_index(pool, ctx.organization_id, owner_overrides).await?;

    // Only the existence probe runs against this connection.
    let mut conn = pool.acquire().await?;
    let mut store = PgScorecardStore::new(&mut conn, ctx);
    let report = build_preview(&mut store, &mut identity, &ctx, &transformed).await?;
    Ok(report)
}

/// Decode, transform, and persist a scorecard workbook in one
/// transaction. The history row commits or rolls back with the batch.
pub async fn execute_scorecard(
    pool: &DbPool,
    ctx: ImportContext,
    file_name: &str,
    bytes: &[u8],
    cadence: Cadence,
    owner_overrides: HashMap<String, DbId>,
) -> Result<ScorecardImportReport, ImportError> {
    let workbook = Workbook::read(file_name, bytes)?;
    let sheets = workbook.resolve(&[SCORECARD_SHEET])?;
    let transformed = transform_scorecard(sheets[0], cadence, Utc::now().date_naive());
    tracing::info!(
        file = file_name,
        candidates = transformed.candidates.len(),
        dropped = transformed.dropped.len(),
        cadence = %cadence,
        "scorecard import starting"
    );

    let mut identity = load_identity_index(pool, ctx.organization_id, owner_overrides).await?;

    let mut tx = pool.begin().await?;
    let mut store = PgScorecardStore::new(&mut tx, ctx);
    let outcome =
        engine::run_batch(&mut store, &mut identity, &ctx, &transformed.candidates).await?;
    let scores_added = store.scores_added;
    let scores_skipped = store.scores_skipped;
    let groups_created = store.groups_created;

    let unmapped_names = identity.unmapped_names();
    ImportRunRepo::create(
        &mut tx,
        &CreateImportRun {
            organization_id: ctx.organization_id,
            team_id: ctx.team_id,
            user_id: ctx.importing_user_id,
            kind: "scorecard",
            file_name: file_name.to_string(),
            strategy: ctx.strategy,
            created_count: outcome.created as i32,
            updated_count: outcome.updated as i32,
            skipped_count: outcome.skipped as i32,
            error_count: outcome.errors.len() as i32,
            scores_added: scores_added as i32,
            scores_skipped: scores_skipped as i32,
            groups_created: groups_created as i32,
            errors: serde_json::to_value(&outcome.errors).unwrap_or_default(),
            unmapped_names: serde_json::to_value(&unmapped_names).unwrap_or_default(),
        },
    )
    .await?;
    tx.commit().await?;

    Ok(ScorecardImportReport {
        created: outcome.created,
        updated: outcome.updated,
        skipped: outcome.skipped,
        errors: outcome.errors,
        scores_added,
        scores_skipped,
        groups_created,
        unmapped_names,
    })
}
