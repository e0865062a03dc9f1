use super::models::{Companion, CompanionFilter, NewCompanion, SessionHistoryRecord};
use super::{CompanionStore, SessionSink};
use crate::errors::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

const COMPANION_COLUMNS: &str =
    "id, name, subject, topic, voice, style, duration, author, created_at";

/// sqlx-backed store over two tables: `companions` and `session_history`.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and create the schema if it does not exist yet.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        info!("Connecting to database at {}", url);

        let pool = SqlitePool::connect(url).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS companions (
                id         TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                subject    TEXT NOT NULL,
                topic      TEXT NOT NULL,
                voice      TEXT NOT NULL,
                style      TEXT NOT NULL,
                duration   INTEGER NOT NULL,
                author     TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS session_history (
                id           TEXT PRIMARY KEY,
                companion_id TEXT NOT NULL REFERENCES companions(id),
                user_id      TEXT NOT NULL,
                created_at   TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        info!("Database schema ready");

        Ok(Self { pool })
    }
}

#[async_trait]
impl CompanionStore for SqliteStore {
    async fn create(&self, data: NewCompanion, author: &str) -> Result<Companion, StoreError> {
        if author.trim().is_empty() {
            return Err(StoreError::Unauthorized);
        }

        let companion = Companion {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            subject: data.subject,
            topic: data.topic,
            voice: data.voice,
            style: data.style,
            duration: data.duration,
            author: author.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO companions (id, name, subject, topic, voice, style, duration, author, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&companion.id)
        .bind(&companion.name)
        .bind(&companion.subject)
        .bind(&companion.topic)
        .bind(&companion.voice)
        .bind(&companion.style)
        .bind(companion.duration)
        .bind(&companion.author)
        .bind(companion.created_at)
        .execute(&self.pool)
        .await?;

        info!("Created companion {} for user {}", companion.id, author);

        Ok(companion)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Companion>, StoreError> {
        let companion = sqlx::query_as::<_, Companion>(&format!(
            "SELECT {COMPANION_COLUMNS} FROM companions WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(companion)
    }

    async fn list(&self, filter: &CompanionFilter) -> Result<Vec<Companion>, StoreError> {
        // SQLite LIKE is case-insensitive for ASCII, which matches the
        // ilike semantics the filters need.
        let mut sql = format!("SELECT {COMPANION_COLUMNS} FROM companions");
        let mut clauses: Vec<&str> = Vec::new();

        if filter.subject.is_some() {
            clauses.push("subject LIKE ?");
        }
        if filter.topic.is_some() {
            clauses.push("(topic LIKE ? OR name LIKE ?)");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query_as::<_, Companion>(&sql);
        if let Some(subject) = &filter.subject {
            query = query.bind(format!("%{subject}%"));
        }
        if let Some(topic) = &filter.topic {
            let pattern = format!("%{topic}%");
            query = query.bind(pattern.clone()).bind(pattern);
        }
        query = query.bind(filter.effective_limit()).bind(filter.offset());

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn list_by_author(&self, user_id: &str) -> Result<Vec<Companion>, StoreError> {
        let companions = sqlx::query_as::<_, Companion>(&format!(
            "SELECT {COMPANION_COLUMNS} FROM companions WHERE author = ? ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(companions)
    }

    async fn count_by_author(&self, user_id: &str) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companions WHERE author = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    async fn delete(&self, id: &str, requesting_user: &str) -> Result<(), StoreError> {
        // Ownership check first, so a missing row and a foreign row stay
        // distinguishable to the caller.
        let author: Option<(String,)> =
            sqlx::query_as("SELECT author FROM companions WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let (author,) = author.ok_or(StoreError::NotFound)?;
        if author != requesting_user {
            return Err(StoreError::Unauthorized);
        }

        // Scoped to the author as well, so a concurrent reassignment
        // between the check and the delete cannot remove a foreign row.
        sqlx::query("DELETE FROM companions WHERE id = ? AND author = ?")
            .bind(id)
            .bind(requesting_user)
            .execute(&self.pool)
            .await?;

        info!("Deleted companion {} for user {}", id, requesting_user);

        Ok(())
    }

    async fn sessions_by_user(&self, user_id: &str) -> Result<Vec<Companion>, StoreError> {
        let rows = sqlx::query_as::<_, Companion>(
            "SELECT c.id, c.name, c.subject, c.topic, c.voice, c.style, c.duration, c.author, c.created_at
             FROM session_history sh
             JOIN companions c ON c.id = sh.companion_id
             WHERE sh.user_id = ?
             ORDER BY sh.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        // A user can have many sessions with the same companion; keep each
        // companion once, in first-seen (most recent session) order.
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for companion in rows {
            if seen.insert(companion.id.clone()) {
                distinct.push(companion);
            }
        }

        Ok(distinct)
    }

    async fn recent_sessions(&self, limit: u32) -> Result<Vec<Companion>, StoreError> {
        let rows = sqlx::query_as::<_, Companion>(
            "SELECT c.id, c.name, c.subject, c.topic, c.voice, c.style, c.duration, c.author, c.created_at
             FROM session_history sh
             JOIN companions c ON c.id = sh.companion_id
             ORDER BY sh.created_at DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for companion in rows {
            if seen.insert(companion.id.clone()) {
                distinct.push(companion);
            }
        }

        Ok(distinct)
    }
}

#[async_trait]
impl SessionSink for SqliteStore {
    async fn record_session(
        &self,
        companion_id: &str,
        user_id: &str,
    ) -> Result<SessionHistoryRecord, StoreError> {
        let record = SessionHistoryRecord {
            id: Uuid::new_v4().to_string(),
            companion_id: companion_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO session_history (id, companion_id, user_id, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.companion_id)
        .bind(&record.user_id)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            "Recorded session for companion {} (user {})",
            companion_id, user_id
        );

        Ok(record)
    }
}
