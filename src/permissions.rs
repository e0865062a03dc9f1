//! Companion-creation permission gate.
//!
//! Consulted at creation time only (never when starting a session).
//! The gate is fail-closed: if the usage count cannot be read, the error
//! propagates instead of allowing the create.

use crate::auth::Entitlement;
use crate::errors::StoreError;
use crate::store::CompanionStore;
use tracing::info;

/// Plan slug with no companion ceiling.
pub const UNLIMITED_PLAN: &str = "pro";
/// Feature flag granting up to 10 companions.
pub const LIMIT_10_FEATURE: &str = "10_companion_limit";
/// Feature flag granting up to 3 companions.
pub const LIMIT_3_FEATURE: &str = "3_companion_limit";

/// Companion ceiling an entitlement resolves to.
/// `None` means unlimited.
pub fn companion_ceiling(entitlement: &Entitlement) -> Option<i64> {
    if entitlement.has_plan(UNLIMITED_PLAN) {
        return None;
    }
    // Highest matching feature flag wins; no flag means no companions.
    if entitlement.has_feature(LIMIT_10_FEATURE) {
        Some(10)
    } else if entitlement.has_feature(LIMIT_3_FEATURE) {
        Some(3)
    } else {
        Some(0)
    }
}

/// Decide whether `user_id` may create another companion.
///
/// The existing-companion count is queried fresh on every call; a count
/// equal to the ceiling denies.
pub async fn can_create_companion(
    user_id: &str,
    entitlement: &Entitlement,
    store: &dyn CompanionStore,
) -> Result<bool, StoreError> {
    let ceiling = match companion_ceiling(entitlement) {
        None => return Ok(true),
        Some(ceiling) => ceiling,
    };

    let count = store.count_by_author(user_id).await?;
    let allowed = count < ceiling;

    info!(
        "Companion gate for user {}: {}/{} used, allowed={}",
        user_id, count, ceiling, allowed
    );

    Ok(allowed)
}
