use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Completion {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl Completion {
    /// Calendar day the completion counts towards (UTC).
    pub fn completed_date(&self) -> NaiveDate {
        self.completed_at.date_naive()
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateCompletionRequest {
    #[validate(length(max = 500, message = "Note must be under 500 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StreakQuery {
    /// Reference day for the streak walk. Default: today (UTC).
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakResult {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completions: u64,
}

#[derive(Debug, Serialize)]
pub struct StreakInfo {
    pub habit_id: Uuid,
    #[serde(flatten)]
    pub streak: StreakResult,
    pub completion_rate_30d: f64,
}
