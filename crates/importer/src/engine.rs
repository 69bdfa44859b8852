//! The generic batch loop: one transaction, per-row containment.
//!
//! [`run_batch`] walks candidates in sheet order and drives a
//! [`CandidateStore`] through the resolve / decide / write steps. Each
//! row is bracketed so a failure rolls back only that row; every earlier
//! row's writes stay, and every later row sees them. That ordering is
//! what makes a file that mentions the same record twice behave like two
//! sequential imports of it.

use opsboard_core::import::candidate::ImportEntity;
use opsboard_core::import::conflict::{self, ConflictStrategy, RowAction};
use opsboard_core::import::identity::IdentityIndex;
use opsboard_core::import::outcome::{ImportOutcome, Numbered, RowError};
use opsboard_core::types::DbId;

use crate::store::{CandidateStore, StoreError};

/// Tenancy and policy for one batch. Every store call happens on behalf
/// of this context.
#[derive(Debug, Clone, Copy)]
pub struct ImportContext {
    pub organization_id: DbId,
    pub team_id: Option<DbId>,
    /// User who uploaded the file: owner fallback and history attribution.
    pub importing_user_id: DbId,
    pub strategy: ConflictStrategy,
}

/// Run a batch of candidates against the store.
///
/// A [`StoreError::Row`] aborts the offending row's bracket, records the
/// failure, and continues. Any other error propagates and the caller's
/// transaction rolls the whole batch back.
pub async fn run_batch<C, S>(
    store: &mut S,
    identity: &mut IdentityIndex,
    ctx: &ImportContext,
    candidates: &[Numbered<C>],
) -> Result<ImportOutcome, StoreError>
where
    C: ImportEntity + Sync,
    S: CandidateStore<C>,
{
    let mut outcome = ImportOutcome::default();

    for numbered in candidates {
        let candidate = &numbered.value;
        store.begin_row().await?;

        match import_row(store, identity, ctx, candidate).await {
            Ok(action) => {
                store.commit_row().await?;
                match action {
                    RowAction::Create => outcome.created += 1,
                    RowAction::Update => outcome.updated += 1,
                    RowAction::Skip => outcome.skipped += 1,
                }
            }
            Err(StoreError::Row(message)) => {
                store.abort_row().await?;
                tracing::warn!(
                    entity = C::ENTITY,
                    row = numbered.row,
                    error = %message,
                    "import row failed, continuing batch"
                );
                outcome.errors.push(RowError {
                    row_identifier: row_identifier(candidate, numbered.row),
                    message,
                });
            }
            Err(fatal) => return Err(fatal),
        }
    }

    tracing::info!(
        entity = C::ENTITY,
        created = outcome.created,
        updated = outcome.updated,
        skipped = outcome.skipped,
        errors = outcome.errors.len(),
        "import batch finished"
    );
    Ok(outcome)
}

/// Resolve, decide, and write one candidate. Returns the action taken.
async fn import_row<C, S>(
    store: &mut S,
    identity: &mut IdentityIndex,
    ctx: &ImportContext,
    candidate: &C,
) -> Result<RowAction, StoreError>
where
    C: ImportEntity + Sync,
    S: CandidateStore<C>,
{
    let owner = identity.resolve_owner(candidate.owner_name(), ctx.importing_user_id);

    match store.find_existing(candidate).await? {
        Some(existing_id) => {
            let action = conflict::decide(true, ctx.strategy);
            if action == RowAction::Update {
                store.update(existing_id, candidate, &owner).await?;
            }
            Ok(action)
        }
        None => {
            store.insert(candidate, &owner).await?;
            Ok(RowAction::Create)
        }
    }
}

/// Error label for a row: the title when it has one, the sheet row
/// otherwise.
fn row_identifier<C: ImportEntity>(candidate: &C, row: u32) -> String {
    let title = candidate.title().trim();
    if title.is_empty() {
        format!("row {row}")
    } else {
        title.to_string()
    }
}
