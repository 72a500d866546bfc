use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::nullable;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Mood {
    pub id: Uuid,
    pub user_id: Uuid,
    /// 1 (very bad) ..= 5 (excellent)
    pub mood_level: i16,
    pub mood_date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MoodLevel {
    VeryBad = 1,
    Bad = 2,
    Neutral = 3,
    Good = 4,
    Excellent = 5,
}

impl MoodLevel {
    pub fn from_level(level: i16) -> Option<Self> {
        match level {
            1 => Some(Self::VeryBad),
            2 => Some(Self::Bad),
            3 => Some(Self::Neutral),
            4 => Some(Self::Good),
            5 => Some(Self::Excellent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryBad => "very_bad",
            Self::Bad => "bad",
            Self::Neutral => "neutral",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }

    pub fn value(&self) -> i16 {
        *self as i16
    }
}

/// Creating a mood for a date that already has one replaces it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertMoodRequest {
    #[validate(range(min = 1, max = 5, message = "Mood level must be 1-5"))]
    pub mood_level: i16,

    /// Default: today (UTC)
    pub mood_date: Option<NaiveDate>,

    #[validate(length(max = 5000, message = "Note must be under 5000 characters"))]
    pub note: Option<String>,
}

/// Partial update of an existing mood. An explicit `null` note clears it.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMoodRequest {
    #[validate(range(min = 1, max = 5, message = "Mood level must be 1-5"))]
    pub mood_level: Option<i16>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 5000, message = "Note must be under 5000 characters"))]
    pub note: Option<Option<String>>,
}

impl Mood {
    pub fn apply_update(&mut self, update: UpdateMoodRequest, now: DateTime<Utc>) {
        if let Some(level) = update.mood_level {
            self.mood_level = level;
        }
        if let Some(note) = update.note {
            self.note = note;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Deserialize)]
pub struct MoodListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MoodRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct MoodStatsQuery {
    /// Window length in days. Default: 30
    pub days: Option<i64>,
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MoodStats {
    pub average_mood: f64,
    pub total_records: usize,
    pub mood_distribution: BTreeMap<String, usize>,
    pub best_day: Option<NaiveDate>,
    pub worst_day: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_mood() -> Mood {
        let now = Utc::now();
        Mood {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            mood_level: 2,
            mood_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            note: Some("rainy".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_update_keeps_missing_fields() {
        let update: UpdateMoodRequest =
            serde_json::from_value(serde_json::json!({ "mood_level": 4 })).unwrap();
        let mut mood = stored_mood();
        mood.apply_update(update, Utc::now());
        assert_eq!(mood.mood_level, 4);
        assert_eq!(mood.note.as_deref(), Some("rainy"));
    }

    #[test]
    fn test_update_null_note_clears_it() {
        let update: UpdateMoodRequest =
            serde_json::from_value(serde_json::json!({ "note": null })).unwrap();
        let mut mood = stored_mood();
        mood.apply_update(update, Utc::now());
        assert_eq!(mood.mood_level, 2);
        assert_eq!(mood.note, None);
    }

    #[test]
    fn test_update_level_out_of_range() {
        let update: UpdateMoodRequest =
            serde_json::from_value(serde_json::json!({ "mood_level": 0 })).unwrap();
        assert!(update.validate().is_err());
    }
}
