use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subject categories a companion can teach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Maths,
    Language,
    Science,
    History,
    Coding,
    Geography,
    Economics,
    Finance,
    Business,
}

impl Subject {
    pub const ALL: [Subject; 9] = [
        Subject::Maths,
        Subject::Language,
        Subject::Science,
        Subject::History,
        Subject::Coding,
        Subject::Geography,
        Subject::Economics,
        Subject::Finance,
        Subject::Business,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Maths => "maths",
            Subject::Language => "language",
            Subject::Science => "science",
            Subject::History => "history",
            Subject::Coding => "coding",
            Subject::Geography => "geography",
            Subject::Economics => "economics",
            Subject::Finance => "finance",
            Subject::Business => "business",
        }
    }

    /// Parse a subject slug, case-insensitively.
    pub fn parse(s: &str) -> Option<Subject> {
        let lower = s.to_ascii_lowercase();
        Subject::ALL.iter().copied().find(|sub| sub.as_str() == lower)
    }
}

/// A configured AI tutoring persona owned by one user.
///
/// The author is fixed at creation time and never changes.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Companion {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub topic: String,
    pub voice: String,
    pub style: String,
    /// Planned session length in minutes
    pub duration: i64,
    /// Owner user id
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a companion (author comes from the caller's identity).
#[derive(Debug, Clone, Deserialize)]
pub struct NewCompanion {
    pub name: String,
    pub subject: String,
    pub topic: String,
    pub voice: String,
    pub style: String,
    pub duration: i64,
}

/// One completed (or disconnected) voice session, append-only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionHistoryRecord {
    pub id: String,
    pub companion_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Filters for the companion library listing.
#[derive(Debug, Clone, Default)]
pub struct CompanionFilter {
    /// Case-insensitive substring match against the subject column
    pub subject: Option<String>,
    /// Case-insensitive substring match against topic OR name
    pub topic: Option<String>,
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
}

impl CompanionFilter {
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Row offset for the requested page (page 1 starts at row 0).
    ///
    /// Page and limit come straight from query parameters, so the math
    /// saturates instead of overflowing on hostile values.
    pub fn offset(&self) -> i64 {
        let page = u64::from(self.page.max(1));
        let offset = (page - 1).saturating_mul(u64::from(self.effective_limit()));
        i64::try_from(offset).unwrap_or(i64::MAX)
    }

    pub fn effective_limit(&self) -> u32 {
        if self.limit == 0 {
            Self::DEFAULT_LIMIT
        } else {
            self.limit
        }
    }
}
