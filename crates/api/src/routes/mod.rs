pub mod health;
pub mod imports;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /imports/scorecard/preview     preview scorecard upload (POST, multipart)
/// /imports/scorecard             execute scorecard import (POST, multipart)
/// /imports/issues/preview        preview issues upload (POST, multipart)
/// /imports/issues                execute issues import (POST, multipart)
/// /imports/issues/template       expected workbook layout (GET)
/// /imports/history               recent import runs (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Spreadsheet imports: previews, execution, history, template.
        .nest("/imports", imports::router())
}
