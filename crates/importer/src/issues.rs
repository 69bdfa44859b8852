//! Issue import: the Postgres store and the preview/execute flows.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgConnection;

use opsboard_core::import::candidate::IssueCandidate;
use opsboard_core::import::identity::OwnerResolution;
use opsboard_core::import::issues::{transform_issues, LONG_TERM_SHEET, SHORT_TERM_SHEET};
use opsboard_core::import::outcome::{PreviewReport, RowError};
use opsboard_core::sheet::Workbook;
use opsboard_core::types::DbId;
use opsboard_db::models::import_run::CreateImportRun;
use opsboard_db::models::issue::{CreateImportedIssue, IssueImportPatch};
use opsboard_db::repositories::{ImportRunRepo, IssueRepo};
use opsboard_db::DbPool;

use crate::engine::{self, ImportContext};
use crate::error::ImportError;
use crate::preview::build_preview;
use crate::roster::load_identity_index;
use crate::store::{self, CandidateStore, StoreError};

// ---------------------------------------------------------------------------
// PgIssueStore
// ---------------------------------------------------------------------------

/// Store for issue candidates, bound to one batch transaction. Issues
/// carry no side tables, so the row bracket is just the savepoint.
pub struct PgIssueStore<'a> {
    conn: &'a mut PgConnection,
    ctx: ImportContext,
}

impl<'a> PgIssueStore<'a> {
    pub fn new(conn: &'a mut PgConnection, ctx: ImportContext) -> PgIssueStore<'a> {
        PgIssueStore { conn, ctx }
    }
}

#[async_trait]
impl CandidateStore<IssueCandidate> for PgIssueStore<'_> {
    async fn find_existing(
        &mut self,
        candidate: &IssueCandidate,
    ) -> Result<Option<DbId>, StoreError> {
        let issue = IssueRepo::find_by_identity(
            self.conn,
            self.ctx.organization_id,
            self.ctx.team_id,
            &candidate.title,
            candidate.timeline.as_str(),
        )
        .await
        .map_err(StoreError::classify)?;
        Ok(issue.map(|i| i.id))
    }

    async fn insert(
        &mut self,
        candidate: &IssueCandidate,
        owner: &OwnerResolution,
    ) -> Result<(), StoreError> {
        IssueRepo::create_imported(
            self.conn,
            &CreateImportedIssue {
                organization_id: self.ctx.organization_id,
                team_id: self.ctx.team_id,
                title: candidate.title.clone(),
                description: candidate.description.clone(),
                status: candidate.status,
                priority: candidate.priority,
                timeline: candidate.timeline,
                owner_id: owner.user_id(),
                created_by: Some(self.ctx.importing_user_id),
                created_date: candidate.created_date,
                completed_on: candidate.completed_date,
                archived_on: candidate.archived_date,
                external_link: candidate.link.clone(),
            },
        )
        .await
        .map_err(StoreError::classify)?;
        Ok(())
    }

    async fn update(
        &mut self,
        existing_id: DbId,
        candidate: &IssueCandidate,
        owner: &OwnerResolution,
    ) -> Result<(), StoreError> {
        IssueRepo::update_imported(
            self.conn,
            existing_id,
            &IssueImportPatch {
                status: candidate.status,
                priority: candidate.priority,
                owner_id: owner.user_id(),
                description: candidate.description.clone(),
                completed_on: candidate.completed_date,
                archived_on: candidate.archived_date,
                external_link: candidate.link.clone(),
            },
        )
        .await
        .map_err(StoreError::classify)?;
        Ok(())
    }

    async fn begin_row(&mut self) -> Result<(), StoreError> {
        store::row_savepoint(self.conn).await
    }

    async fn commit_row(&mut self) -> Result<(), StoreError> {
        store::row_release(self.conn).await
    }

    async fn abort_row(&mut self) -> Result<(), StoreError> {
        store::row_rollback(self.conn).await
    }
}

// ---------------------------------------------------------------------------
// Flows
// ---------------------------------------------------------------------------

/// What an executed issue import hands back to the API layer.
#[derive(Debug, Clone, Serialize)]
pub struct IssueImportReport {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    pub unmapped_names: Vec<String>,
}

/// Dry-run an issues workbook: decode both sheets, transform, classify.
/// No writes.
pub async fn preview_issues(
    pool: &DbPool,
    ctx: ImportContext,
    file_name: &str,
    bytes: &[u8],
    owner_overrides: HashMap<String, DbId>,
) -> Result<PreviewReport<IssueCandidate>, ImportError> {
    let workbook = Workbook::read(file_name, bytes)?;
    let sheets = workbook.resolve(&[SHORT_TERM_SHEET, LONG_TERM_SHEET])?;
    let transformed = transform_issues(sheets[0], sheets[1]);

    let mut identity = load_identity_index(pool, ctx.organization_id, owner_overrides).await?;

    // Only the existence probe runs against this connection.
    let mut conn = pool.acquire().await?;
    let mut store = PgIssueStore::new(&mut conn, ctx);
    let report = build_preview(&mut store, &mut identity, &ctx, &transformed).await?;
    Ok(report)
}

/// Decode, transform, and persist an issues workbook in one transaction.
/// The history row commits or rolls back with the batch.
pub async fn execute_issues(
    pool: &DbPool,
    ctx: ImportContext,
    file_name: &str,
    bytes: &[u8],
    owner_overrides: HashMap<String, DbId>,
) -> Result<IssueImportReport, ImportError> {
    let workbook = Workbook::read(file_name, bytes)?;
    let sheets = workbook.resolve(&[SHORT_TERM_SHEET, LONG_TERM_SHEET])?;
    let transformed = transform_issues(sheets[0], sheets[1]);
    tracing::info!(
        file = file_name,
        candidates = transformed.candidates.len(),
        dropped = transformed.dropped.len(),
        "issue import starting"
    );

    let mut identity = load_identity_index(pool, ctx.organization_id, owner_overrides).await?;

    let mut tx = pool.begin().await?;
    let mut store = PgIssueStore::new(&mut tx, ctx);
    let outcome =
        engine::run_batch(&mut store, &mut identity, &ctx, &transformed.candidates).await?;

    let unmapped_names = identity.unmapped_names();
    ImportRunRepo::create(
        &mut tx,
        &CreateImportRun {
            organization_id: ctx.organization_id,
            team_id: ctx.team_id,
            user_id: ctx.importing_user_id,
            kind: "issues",
            file_name: file_name.to_string(),
            strategy: ctx.strategy,
            created_count: outcome.created as i32,
            updated_count: outcome.updated as i32,
            skipped_count: outcome.skipped as i32,
            error_count: outcome.errors.len() as i32,
            scores_added: 0,
            scores_skipped: 0,
            groups_created: 0,
            errors: serde_json::to_value(&outcome.errors).unwrap_or_default(),
            unmapped_names: serde_json::to_value(&unmapped_names).unwrap_or_default(),
        },
    )
    .await?;
    tx.commit().await?;

    Ok(IssueImportReport {
        created: outcome.created,
        updated: outcome.updated,
        skipped: outcome.skipped,
        errors: outcome.errors,
        unmapped_names,
    })
}
