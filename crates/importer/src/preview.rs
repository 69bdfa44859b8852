//! Dry-run mode: the execute stages with the writes left out.

use serde::Serialize;

use opsboard_core::import::candidate::ImportEntity;
use opsboard_core::import::identity::IdentityIndex;
use opsboard_core::import::outcome::{PreviewReport, TransformOutput, SAMPLE_SIZE};

use crate::engine::ImportContext;
use crate::store::{CandidateStore, StoreError};

/// Classify candidates as new or conflicting and assemble the report.
///
/// Owner resolution runs for its side channel, the unmapped-name list,
/// and the store is only probed for existence. Nothing is written, so the
/// counts describe what an execute call over the same file would do.
pub async fn build_preview<C, S>(
    store: &mut S,
    identity: &mut IdentityIndex,
    ctx: &ImportContext,
    transformed: &TransformOutput<C>,
) -> Result<PreviewReport<C>, StoreError>
where
    C: ImportEntity + Clone + Serialize + Sync,
    S: CandidateStore<C>,
{
    let mut new_count = 0;
    let mut conflicting_count = 0;

    for numbered in &transformed.candidates {
        identity.resolve_owner(numbered.value.owner_name(), ctx.importing_user_id);
        if store.find_existing(&numbered.value).await?.is_some() {
            conflicting_count += 1;
        } else {
            new_count += 1;
        }
    }

    let unmapped_names = identity.unmapped_names();
    let mut warnings: Vec<String> = transformed
        .dropped
        .iter()
        .map(|skip| format!("row {} skipped: {}", skip.row, skip.reason))
        .collect();
    if !unmapped_names.is_empty() {
        warnings.push(format!(
            "{} owner name(s) did not match any user and will fall back to the importing user",
            unmapped_names.len()
        ));
    }
    if conflicting_count > 0 {
        warnings.push(format!(
            "{conflicting_count} candidate(s) match existing records and will follow the '{}' strategy",
            ctx.strategy
        ));
    }

    Ok(PreviewReport {
        total_candidates: transformed.candidates.len(),
        new_count,
        conflicting_count,
        unmapped_names,
        sample: transformed
            .candidates
            .iter()
            .take(SAMPLE_SIZE)
            .map(|numbered| numbered.value.clone())
            .collect(),
        warnings,
    })
}
