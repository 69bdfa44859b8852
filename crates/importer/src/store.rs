//! The persistence seam between the batch engine and the database.
//!
//! The engine never issues SQL; it drives a [`CandidateStore`] and leaves
//! what a "row write" means to the entity-specific implementation. The
//! error type splits failures into two classes because the engine reacts
//! differently to each: a [`StoreError::Row`] is recorded and the batch
//! moves on, anything else stops the batch.

use async_trait::async_trait;
use sqlx::PgConnection;
use thiserror::Error;

use opsboard_core::import::candidate::ImportEntity;
use opsboard_core::import::identity::OwnerResolution;
use opsboard_core::types::DbId;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// A store failure, classified by blast radius.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Scoped to one row's data: the row is rolled back and reported, the
    /// rest of the batch proceeds.
    #[error("{0}")]
    Row(String),

    /// The backing store itself failed; continuing would only repeat the
    /// failure, so the whole batch stops.
    #[error("storage failure: {0}")]
    Infrastructure(#[source] sqlx::Error),
}

impl StoreError {
    /// Sort a `sqlx` failure into one of the two classes.
    ///
    /// Statement-level database errors (constraint violations, bad casts,
    /// check failures) depend on the row that triggered them. Connection,
    /// pool, and protocol failures do not.
    pub fn classify(err: sqlx::Error) -> StoreError {
        match err {
            sqlx::Error::Database(db) => StoreError::Row(db.to_string()),
            sqlx::Error::RowNotFound => StoreError::Row("expected row was missing".into()),
            other => StoreError::Infrastructure(other),
        }
    }
}

// ---------------------------------------------------------------------------
// CandidateStore
// ---------------------------------------------------------------------------

/// What the batch engine needs from persistence, per entity family.
///
/// `begin_row` / `commit_row` / `abort_row` bracket every candidate so a
/// failed row can be undone without touching its predecessors. Rows are
/// strictly sequential; brackets never nest.
#[async_trait]
pub trait CandidateStore<C: ImportEntity + Sync> {
    /// Id of the live record matching the candidate's natural key.
    async fn find_existing(&mut self, candidate: &C) -> Result<Option<DbId>, StoreError>;

    /// Persist a brand-new record for the candidate.
    async fn insert(&mut self, candidate: &C, owner: &OwnerResolution) -> Result<(), StoreError>;

    /// Fold the candidate into an existing record.
    async fn update(
        &mut self,
        existing_id: DbId,
        candidate: &C,
        owner: &OwnerResolution,
    ) -> Result<(), StoreError>;

    /// Open the containment bracket for the next row.
    async fn begin_row(&mut self) -> Result<(), StoreError>;

    /// Keep the bracketed row's writes.
    async fn commit_row(&mut self) -> Result<(), StoreError>;

    /// Discard the bracketed row's writes.
    async fn abort_row(&mut self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Savepoint helpers
// ---------------------------------------------------------------------------

// Shared by the Postgres stores. The savepoint name is fixed; with
// sequential rows the previous one is always released before the next is
// set.

pub(crate) async fn row_savepoint(conn: &mut PgConnection) -> Result<(), StoreError> {
    sqlx::query("SAVEPOINT import_row")
        .execute(conn)
        .await
        .map_err(StoreError::classify)?;
    Ok(())
}

pub(crate) async fn row_release(conn: &mut PgConnection) -> Result<(), StoreError> {
    sqlx::query("RELEASE SAVEPOINT import_row")
        .execute(conn)
        .await
        .map_err(StoreError::classify)?;
    Ok(())
}

pub(crate) async fn row_rollback(conn: &mut PgConnection) -> Result<(), StoreError> {
    sqlx::query("ROLLBACK TO SAVEPOINT import_row")
        .execute(&mut *conn)
        .await
        .map_err(StoreError::classify)?;
    sqlx::query("RELEASE SAVEPOINT import_row")
        .execute(conn)
        .await
        .map_err(StoreError::classify)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_row_scoped() {
        let classified = StoreError::classify(sqlx::Error::RowNotFound);
        assert!(matches!(classified, StoreError::Row(_)));
    }

    #[test]
    fn pool_failures_are_infrastructure() {
        let classified = StoreError::classify(sqlx::Error::PoolTimedOut);
        assert!(matches!(classified, StoreError::Infrastructure(_)));

        let classified = StoreError::classify(sqlx::Error::WorkerCrashed);
        assert!(matches!(classified, StoreError::Infrastructure(_)));
    }
}
