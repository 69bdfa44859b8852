//! Handlers for spreadsheet imports (scorecard metrics and issue lists).
//!
//! Uploads arrive as multipart forms. Preview endpoints classify a file
//! without writing anything; execute endpoints run the batch inside one
//! transaction and record a history row. The organization always comes
//! from the caller's token.

use std::collections::HashMap;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use opsboard_core::import::candidate::{Cadence, IssueCandidate, MetricCandidate};
use opsboard_core::import::conflict::ConflictStrategy;
use opsboard_core::import::issues::{
    ARCHIVED_COLUMNS, ASSIGNEE_COLUMNS, COMPLETED_COLUMNS, CREATED_COLUMNS, DESCRIPTION_COLUMNS,
    LINK_COLUMNS, LONG_TERM_SHEET, OWNER_COLUMNS, PRIORITY_COLUMNS, SHORT_TERM_SHEET,
    TITLE_COLUMNS,
};
use opsboard_core::import::outcome::PreviewReport;
use opsboard_core::types::DbId;
use opsboard_db::models::import_run::ImportRun;
use opsboard_db::repositories::ImportRunRepo;
use opsboard_importer::{
    execute_issues, execute_scorecard, preview_issues, preview_scorecard, ImportContext,
    IssueImportReport, ScorecardImportReport,
};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Multipart form
// ---------------------------------------------------------------------------

/// Decoded upload form, shared by all four import endpoints.
///
/// | Field               | Required | Meaning                                |
/// |---------------------|----------|----------------------------------------|
/// | `file`              | yes      | the spreadsheet (`.csv` or `.xlsx`)    |
/// | `team_id`           | no       | team the imported records belong to    |
/// | `cadence`           | no       | `weekly` (default) or `monthly`        |
/// | `mappings`          | no       | JSON object: owner name -> user id     |
/// | `conflict_strategy` | no       | `skip`, `merge` (default), or `update` |
#[derive(Debug)]
struct ImportForm {
    file_name: String,
    bytes: Vec<u8>,
    team_id: Option<DbId>,
    cadence: Cadence,
    mappings: HashMap<String, DbId>,
    strategy: ConflictStrategy,
}

impl ImportForm {
    /// Batch context for this upload, scoped by the caller's token.
    fn context(&self, auth: &AuthUser) -> ImportContext {
        ImportContext {
            organization_id: auth.organization_id,
            team_id: self.team_id,
            importing_user_id: auth.user_id,
            strategy: self.strategy,
        }
    }
}

/// Read the multipart stream into an [`ImportForm`]. Unknown fields are
/// ignored; a missing `file` field is a 400.
async fn read_import_form(mut multipart: Multipart) -> AppResult<ImportForm> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut team_id = None;
    let mut cadence = Cadence::default();
    let mut mappings = HashMap::new();
    let mut strategy = ConflictStrategy::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some((file_name, bytes.to_vec()));
            }
            "team_id" => {
                let text = field_text(field).await?;
                let id = text.trim().parse::<DbId>().map_err(|_| {
                    AppError::BadRequest(format!("team_id must be an integer, got '{text}'"))
                })?;
                team_id = Some(id);
            }
            "cadence" => {
                let text = field_text(field).await?;
                cadence = Cadence::from_str(text.trim().to_lowercase().as_str())
                    .ok_or_else(|| AppError::BadRequest(format!("unknown cadence '{text}'")))?;
            }
            "mappings" => {
                let text = field_text(field).await?;
                mappings = serde_json::from_str(&text).map_err(|e| {
                    AppError::BadRequest(format!(
                        "mappings must be a JSON object of owner name to user id: {e}"
                    ))
                })?;
            }
            "conflict_strategy" => {
                let text = field_text(field).await?;
                strategy = ConflictStrategy::from_str(text.trim().to_lowercase().as_str())
                    .ok_or_else(|| {
                        AppError::BadRequest(format!("unknown conflict_strategy '{text}'"))
                    })?;
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::BadRequest("missing multipart field 'file'".to_string()))?;

    Ok(ImportForm {
        file_name,
        bytes,
        team_id,
        cadence,
        mappings,
        strategy,
    })
}

/// Read a text field, mapping stream errors to a 400.
async fn field_text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// ---------------------------------------------------------------------------
// Scorecard imports
// ---------------------------------------------------------------------------

/// POST /api/v1/imports/scorecard/preview
///
/// Classify a scorecard upload without writing anything.
pub async fn preview_scorecard_import(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<PreviewReport<MetricCandidate>>>> {
    let form = read_import_form(multipart).await?;
    let ctx = form.context(&auth);

    let report = preview_scorecard(
        &state.pool,
        ctx,
        &form.file_name,
        &form.bytes,
        form.cadence,
        form.mappings,
    )
    .await?;

    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/imports/scorecard
///
/// Execute a scorecard import: one transaction, per-row containment, a
/// history row on commit.
pub async fn execute_scorecard_import(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<ScorecardImportReport>>> {
    let form = read_import_form(multipart).await?;
    let ctx = form.context(&auth);

    let report = execute_scorecard(
        &state.pool,
        ctx,
        &form.file_name,
        &form.bytes,
        form.cadence,
        form.mappings,
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        organization_id = auth.organization_id,
        file = %form.file_name,
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.errors.len(),
        "Scorecard import executed"
    );

    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// Issue imports
// ---------------------------------------------------------------------------

/// POST /api/v1/imports/issues/preview
///
/// Classify an issues upload (short-term and long-term sheets) without
/// writing anything.
pub async fn preview_issues_import(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<PreviewReport<IssueCandidate>>>> {
    let form = read_import_form(multipart).await?;
    let ctx = form.context(&auth);

    let report = preview_issues(&state.pool, ctx, &form.file_name, &form.bytes, form.mappings)
        .await?;

    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/imports/issues
///
/// Execute an issues import.
pub async fn execute_issues_import(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<IssueImportReport>>> {
    let form = read_import_form(multipart).await?;
    let ctx = form.context(&auth);

    let report = execute_issues(&state.pool, ctx, &form.file_name, &form.bytes, form.mappings)
        .await?;

    tracing::info!(
        user_id = auth.user_id,
        organization_id = auth.organization_id,
        file = %form.file_name,
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.errors.len(),
        "Issues import executed"
    );

    Ok(Json(DataResponse { data: report }))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Runs returned by the history endpoint.
const HISTORY_LIMIT: i64 = 50;

/// GET /api/v1/imports/history
///
/// Latest runs for the caller's organization, newest first.
pub async fn import_history(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ImportRun>>>> {
    let runs =
        ImportRunRepo::list_recent(&state.pool, auth.organization_id, HISTORY_LIMIT).await?;

    Ok(Json(DataResponse { data: runs }))
}

// ---------------------------------------------------------------------------
// Issues template
// ---------------------------------------------------------------------------

/// One sheet of the workbook layout the issues importer expects.
#[derive(Debug, Serialize)]
pub struct TemplateSheet {
    pub name: &'static str,
    pub columns: Vec<TemplateColumn>,
}

/// One column of a template sheet. `header` is the canonical spelling;
/// `accepted` lists every header the importer binds to this column.
#[derive(Debug, Serialize)]
pub struct TemplateColumn {
    pub header: &'static str,
    pub accepted: &'static [&'static str],
    pub required: bool,
}

fn template_column(accepted: &'static [&'static str], required: bool) -> TemplateColumn {
    TemplateColumn {
        header: accepted[0],
        accepted,
        required,
    }
}

/// GET /api/v1/imports/issues/template
///
/// Describe the workbook layout the issues importer expects. The column
/// lists are the transformer's own accepted-header tables; clients render
/// their own file from them.
pub async fn issues_template(_auth: AuthUser) -> Json<DataResponse<Vec<TemplateSheet>>> {
    let columns = || {
        vec![
            template_column(TITLE_COLUMNS, true),
            template_column(OWNER_COLUMNS, false),
            template_column(ASSIGNEE_COLUMNS, false),
            template_column(DESCRIPTION_COLUMNS, false),
            template_column(PRIORITY_COLUMNS, false),
            template_column(CREATED_COLUMNS, false),
            template_column(COMPLETED_COLUMNS, false),
            template_column(ARCHIVED_COLUMNS, false),
            template_column(LINK_COLUMNS, false),
        ]
    };

    Json(DataResponse {
        data: vec![
            TemplateSheet {
                name: SHORT_TERM_SHEET.accepted[0],
                columns: columns(),
            },
            TemplateSheet {
                name: LONG_TERM_SHEET.accepted[0],
                columns: columns(),
            },
        ],
    })
}
