//! Route definitions for spreadsheet imports.
//!
//! Mounted at `/imports`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::imports;
use crate::state::AppState;

/// Routes mounted at `/imports`.
///
/// ```text
/// POST   /scorecard/preview   -> preview_scorecard_import  (multipart)
/// POST   /scorecard           -> execute_scorecard_import  (multipart)
/// POST   /issues/preview      -> preview_issues_import     (multipart)
/// POST   /issues              -> execute_issues_import     (multipart)
/// GET    /issues/template     -> issues_template
/// GET    /history             -> import_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/scorecard/preview",
            post(imports::preview_scorecard_import),
        )
        .route("/scorecard", post(imports::execute_scorecard_import))
        .route("/issues/preview", post(imports::preview_issues_import))
        .route("/issues", post(imports::execute_issues_import))
        .route("/issues/template", get(imports::issues_template))
        .route("/history", get(imports::import_history))
}
