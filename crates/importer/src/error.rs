//! Failure surface of the preview and execute flows.

use opsboard_core::sheet::FormatError;

use crate::store::StoreError;

/// Anything a preview or execute call can fail with.
///
/// `Format` means the upload itself was unusable; it surfaces before any
/// database work. The other variants mean the batch stopped, and because
/// every flow runs on one transaction, a stopped batch leaves nothing
/// behind.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("import stopped: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
