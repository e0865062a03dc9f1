//! Companion and session-history storage
//!
//! This module provides the storage collaborator behind the rest of the
//! service:
//! - `CompanionStore`: full CRUD + listing contract over companions and
//!   session history
//! - `SessionSink`: the narrow append-only slice the session orchestrator
//!   needs to record a finished session
//! - `SqliteStore`: the sqlx-backed implementation of both

mod models;
mod sqlite;

pub use models::{Companion, CompanionFilter, NewCompanion, SessionHistoryRecord, Subject};
pub use sqlite::SqliteStore;

use crate::errors::StoreError;
use async_trait::async_trait;

/// Append-only session-history writer.
///
/// Split out of `CompanionStore` so the session orchestrator depends only
/// on the one operation it performs.
#[async_trait]
pub trait SessionSink: Send + Sync {
    /// Record one completed session. Never updates or deletes.
    async fn record_session(
        &self,
        companion_id: &str,
        user_id: &str,
    ) -> Result<SessionHistoryRecord, StoreError>;
}

/// Storage contract for companions and session history.
///
/// Every operation returns `Result`; read-path degradation (empty list /
/// not-found instead of an error response) is a decision the HTTP boundary
/// makes, uniformly, not something individual operations do ad hoc.
#[async_trait]
pub trait CompanionStore: Send + Sync {
    /// Insert a companion owned by `author`. Fails with
    /// `StoreError::Unauthorized` when no author id is supplied.
    async fn create(&self, data: NewCompanion, author: &str) -> Result<Companion, StoreError>;

    /// Fetch one companion; `Ok(None)` when no row matches.
    async fn get_by_id(&self, id: &str) -> Result<Option<Companion>, StoreError>;

    /// Filtered library listing, newest first, offset-paginated.
    async fn list(&self, filter: &CompanionFilter) -> Result<Vec<Companion>, StoreError>;

    /// All companions owned by `user_id`, newest first.
    async fn list_by_author(&self, user_id: &str) -> Result<Vec<Companion>, StoreError>;

    /// Exact count of companions owned by `user_id`. Always a fresh query.
    async fn count_by_author(&self, user_id: &str) -> Result<i64, StoreError>;

    /// Delete a companion the caller owns. `NotFound` when the id does not
    /// exist, `Unauthorized` when the caller is not the author.
    async fn delete(&self, id: &str, requesting_user: &str) -> Result<(), StoreError>;

    /// Companions the user has had sessions with, newest session first,
    /// each companion appearing once (first-seen order preserved).
    async fn sessions_by_user(&self, user_id: &str) -> Result<Vec<Companion>, StoreError>;

    /// Companions from the latest sessions across all users, newest
    /// session first. The row limit applies before deduplication, so
    /// repeat sessions with one companion shrink the result.
    async fn recent_sessions(&self, limit: u32) -> Result<Vec<Companion>, StoreError>;
}
