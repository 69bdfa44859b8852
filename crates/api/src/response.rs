//! Shared response envelope types for API handlers.
//!
//! Every success payload crosses the wire as `{ "data": ... }`; errors use
//! the `{ "error", "code" }` shape produced by [`crate::error::AppError`].
//! Use [`DataResponse`] instead of ad-hoc `serde_json::json!` envelopes to
//! get compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: report }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
