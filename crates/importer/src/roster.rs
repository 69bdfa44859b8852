//! Roster loading for owner-name resolution.

use std::collections::HashMap;

use opsboard_core::import::identity::IdentityIndex;
use opsboard_core::types::DbId;
use opsboard_db::repositories::UserRepo;
use opsboard_db::DbPool;

/// Build the owner matcher for one organization: every active user plus
/// any operator-supplied name overrides. Loaded once per request; the
/// index memoizes repeated names itself.
pub async fn load_identity_index(
    pool: &DbPool,
    organization_id: DbId,
    overrides: HashMap<String, DbId>,
) -> Result<IdentityIndex, sqlx::Error> {
    let roster = UserRepo::list_active_by_org(pool, organization_id)
        .await?
        .iter()
        .map(|user| user.to_ref())
        .collect();
    Ok(IdentityIndex::new(roster, overrides))
}
