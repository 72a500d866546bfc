use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::completion::Completion;
use crate::models::nullable;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub frequency: HabitFrequency,
    /// 0 = Monday .. 6 = Sunday, only read for weekly habits
    pub weekdays: Option<Vec<i16>>,
    pub custom_interval_days: Option<i32>,
    pub target_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub is_active: bool,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default)]
#[sqlx(type_name = "habit_frequency", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HabitFrequency {
    #[default]
    Daily,
    Weekly,
    Custom,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHabitRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(max = 500, message = "Description must be under 500 characters"))]
    pub description: Option<String>,

    /// Default: "daily"
    pub frequency: Option<HabitFrequency>,
    pub weekdays: Option<Vec<i16>>,

    #[validate(range(min = 1, message = "custom_interval_days must be at least 1"))]
    pub custom_interval_days: Option<i32>,

    pub target_time: Option<NaiveTime>,

    #[validate(range(min = 1, max = 1440, message = "Duration must be 1-1440 minutes"))]
    pub duration_minutes: Option<i32>,

    pub is_active: Option<bool>,
    pub color: Option<String>,
}

/// Partial update. Absent fields keep their stored value, an explicit `null`
/// clears a nullable field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateHabitRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = 500))]
    pub description: Option<Option<String>>,

    pub frequency: Option<HabitFrequency>,

    #[serde(default, deserialize_with = "nullable")]
    pub weekdays: Option<Option<Vec<i16>>>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(range(min = 1, message = "custom_interval_days must be at least 1"))]
    pub custom_interval_days: Option<Option<i32>>,

    #[serde(default, deserialize_with = "nullable")]
    pub target_time: Option<Option<NaiveTime>>,

    #[serde(default, deserialize_with = "nullable")]
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<Option<i32>>,

    pub is_active: Option<bool>,

    #[serde(default, deserialize_with = "nullable")]
    pub color: Option<Option<String>>,
}

/// Fields a store needs to insert a habit. Ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub title: String,
    pub description: Option<String>,
    pub frequency: HabitFrequency,
    pub weekdays: Option<Vec<i16>>,
    pub custom_interval_days: Option<i32>,
    pub target_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub is_active: bool,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HabitListQuery {
    #[serde(default)]
    pub active_only: bool,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// One row of the per-date agenda.
#[derive(Debug, Clone, Serialize)]
pub struct HabitForDate {
    pub habit: Habit,
    pub is_completed: bool,
    pub completion: Option<Completion>,
}

impl CreateHabitRequest {
    /// Schedule fields must be usable for the chosen frequency.
    pub fn validate_schedule(&self) -> Result<(), String> {
        validate_schedule_fields(
            self.frequency.unwrap_or_default(),
            self.weekdays.as_deref(),
            self.custom_interval_days,
        )?;
        validate_color(self.color.as_deref())
    }

    pub fn into_new_habit(self) -> NewHabit {
        NewHabit {
            title: self.title,
            description: self.description,
            frequency: self.frequency.unwrap_or_default(),
            weekdays: self.weekdays,
            custom_interval_days: self.custom_interval_days,
            target_time: self.target_time,
            duration_minutes: self.duration_minutes,
            is_active: self.is_active.unwrap_or(true),
            color: self.color,
        }
    }
}

impl UpdateHabitRequest {
    /// Checks the schedule the habit would have once the update is applied.
    pub fn validate_against(&self, existing: &Habit) -> Result<(), String> {
        let frequency = self.frequency.unwrap_or(existing.frequency);
        let weekdays = match &self.weekdays {
            Some(weekdays) => weekdays.as_deref(),
            None => existing.weekdays.as_deref(),
        };
        let interval = self
            .custom_interval_days
            .unwrap_or(existing.custom_interval_days);
        validate_schedule_fields(frequency, weekdays, interval)?;
        validate_color(self.color.as_ref().and_then(|c| c.as_deref()))
    }
}

impl Habit {
    pub fn apply_update(&mut self, update: UpdateHabitRequest, now: DateTime<Utc>) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(frequency) = update.frequency {
            self.frequency = frequency;
        }
        if let Some(weekdays) = update.weekdays {
            self.weekdays = weekdays;
        }
        if let Some(interval) = update.custom_interval_days {
            self.custom_interval_days = interval;
        }
        if let Some(target_time) = update.target_time {
            self.target_time = target_time;
        }
        if let Some(duration) = update.duration_minutes {
            self.duration_minutes = duration;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        self.updated_at = now;
    }
}

fn validate_schedule_fields(
    frequency: HabitFrequency,
    weekdays: Option<&[i16]>,
    custom_interval_days: Option<i32>,
) -> Result<(), String> {
    if let Some(d) = weekdays.into_iter().flatten().find(|d| !(0..=6).contains(*d)) {
        return Err(format!("Weekday {} is invalid; must be 0-6 (Mon-Sun)", d));
    }
    if let Some(n) = custom_interval_days.filter(|n| *n < 1) {
        return Err(format!("custom_interval_days must be at least 1, got {}", n));
    }

    match frequency {
        HabitFrequency::Daily => Ok(()),
        HabitFrequency::Weekly => match weekdays {
            Some(days) if !days.is_empty() => Ok(()),
            _ => Err("weekly frequency requires at least one weekday".into()),
        },
        HabitFrequency::Custom => match custom_interval_days {
            Some(_) => Ok(()),
            None => Err("custom frequency requires custom_interval_days".into()),
        },
    }
}

fn validate_color(color: Option<&str>) -> Result<(), String> {
    let Some(color) = color else {
        return Ok(());
    };
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err("color must be a hex value like #FF5733".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(frequency: HabitFrequency) -> CreateHabitRequest {
        CreateHabitRequest {
            title: "Read".into(),
            description: None,
            frequency: Some(frequency),
            weekdays: None,
            custom_interval_days: None,
            target_time: None,
            duration_minutes: None,
            is_active: None,
            color: None,
        }
    }

    #[test]
    fn test_weekly_requires_weekdays() {
        let mut req = request(HabitFrequency::Weekly);
        assert!(req.validate_schedule().is_err());

        req.weekdays = Some(vec![0, 2, 4]);
        assert!(req.validate_schedule().is_ok());

        req.weekdays = Some(vec![7]);
        assert!(req.validate_schedule().is_err());
    }

    #[test]
    fn test_custom_requires_positive_interval() {
        let mut req = request(HabitFrequency::Custom);
        assert!(req.validate_schedule().is_err());

        req.custom_interval_days = Some(0);
        assert!(req.validate_schedule().is_err());

        req.custom_interval_days = Some(3);
        assert!(req.validate_schedule().is_ok());
    }

    #[test]
    fn test_color_format() {
        let mut req = request(HabitFrequency::Daily);
        req.color = Some("#FF5733".into());
        assert!(req.validate_schedule().is_ok());

        req.color = Some("red".into());
        assert!(req.validate_schedule().is_err());
    }

    #[test]
    fn test_schedule_fields_checked_for_every_frequency() {
        let mut req = request(HabitFrequency::Daily);
        req.weekdays = Some(vec![42]);
        assert!(req.validate_schedule().is_err());

        req.weekdays = None;
        req.custom_interval_days = Some(0);
        assert!(req.validate_schedule().is_err());
        assert!(req.validate().is_err());

        req.frequency = Some(HabitFrequency::Weekly);
        req.weekdays = Some(vec![1]);
        assert!(req.validate_schedule().is_err());
    }

    fn stored_habit() -> Habit {
        let now = Utc::now();
        Habit {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Read".into(),
            description: Some("twenty pages".into()),
            frequency: HabitFrequency::Weekly,
            weekdays: Some(vec![0, 3]),
            custom_interval_days: None,
            target_time: NaiveTime::from_hms_opt(7, 30, 0),
            duration_minutes: Some(20),
            is_active: true,
            color: Some("#112233".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_update_null_clears_and_missing_keeps() {
        let update: UpdateHabitRequest = serde_json::from_value(serde_json::json!({
            "description": null,
            "color": null,
            "target_time": null
        }))
        .unwrap();
        assert_eq!(update.description, Some(None));
        assert_eq!(update.duration_minutes, None);

        let mut habit = stored_habit();
        update.validate_against(&habit).unwrap();
        habit.apply_update(update, Utc::now());
        assert_eq!(habit.description, None);
        assert_eq!(habit.color, None);
        assert_eq!(habit.target_time, None);
        assert_eq!(habit.duration_minutes, Some(20));
        assert_eq!(habit.weekdays, Some(vec![0, 3]));
    }

    #[test]
    fn test_update_cannot_clear_weekdays_of_weekly_habit() {
        let update: UpdateHabitRequest =
            serde_json::from_value(serde_json::json!({ "weekdays": null })).unwrap();
        assert!(update.validate_against(&stored_habit()).is_err());

        let update: UpdateHabitRequest = serde_json::from_value(serde_json::json!({
            "frequency": "daily",
            "weekdays": null
        }))
        .unwrap();
        assert!(update.validate_against(&stored_habit()).is_ok());
    }

    #[test]
    fn test_update_rejects_zero_interval() {
        let update: UpdateHabitRequest =
            serde_json::from_value(serde_json::json!({ "custom_interval_days": 0 })).unwrap();
        assert!(update.validate().is_err());
        assert!(update.validate_against(&stored_habit()).is_err());
    }
}
