//! Storage contracts consumed by the HTTP handlers.
//!
//! Every query is scoped to an owner. The engine never sees these traits;
//! handlers load snapshots through them and hand plain values to the engine.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::completion::Completion;
use crate::models::habit::{Habit, NewHabit};
use crate::models::mood::Mood;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

/// Offset/limit pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            skip: skip.unwrap_or(0).max(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub(crate) fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.skip as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
pub trait HabitStore: Send + Sync {
    async fn fetch_habit(&self, habit_id: Uuid, owner_id: Uuid) -> AppResult<Option<Habit>>;

    /// Newest first.
    async fn list_habits(&self, owner_id: Uuid, active_only: bool, page: Page)
        -> AppResult<Vec<Habit>>;

    async fn list_active_habits(&self, owner_id: Uuid) -> AppResult<Vec<Habit>>;

    async fn create_habit(&self, owner_id: Uuid, habit: NewHabit) -> AppResult<Habit>;

    /// Persists every mutable field of `habit`.
    async fn save_habit(&self, habit: &Habit) -> AppResult<Habit>;

    /// Removes the habit and its completions. `false` if nothing matched.
    async fn delete_habit(&self, habit_id: Uuid, owner_id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait CompletionStore: Send + Sync {
    async fn create_completion(
        &self,
        habit_id: Uuid,
        completed_at: DateTime<Utc>,
        note: Option<String>,
    ) -> AppResult<Completion>;

    /// Only returns the completion if its habit belongs to `owner_id`.
    async fn fetch_completion(
        &self,
        completion_id: Uuid,
        owner_id: Uuid,
    ) -> AppResult<Option<Completion>>;

    async fn delete_completion(&self, completion_id: Uuid) -> AppResult<bool>;

    /// Full history of a habit, any order.
    async fn fetch_completions(&self, habit_id: Uuid) -> AppResult<Vec<Completion>>;

    /// Newest first.
    async fn list_completions(&self, habit_id: Uuid, page: Page) -> AppResult<Vec<Completion>>;

    async fn fetch_completions_on_date(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<Completion>>;
}

#[async_trait]
pub trait MoodStore: Send + Sync {
    /// Creates the mood for `date` or replaces the existing one.
    async fn upsert_mood(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        level: i16,
        note: Option<String>,
    ) -> AppResult<Mood>;

    async fn fetch_mood(&self, mood_id: Uuid, owner_id: Uuid) -> AppResult<Option<Mood>>;

    /// Persists the level and note of `mood`.
    async fn update_mood(&self, mood: &Mood) -> AppResult<Mood>;

    /// Newest date first.
    async fn list_moods(&self, owner_id: Uuid, page: Page) -> AppResult<Vec<Mood>>;

    async fn fetch_mood_by_date(&self, owner_id: Uuid, date: NaiveDate)
        -> AppResult<Option<Mood>>;

    /// Inclusive range, oldest date first.
    async fn moods_between(
        &self,
        owner_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Mood>>;

    async fn delete_mood(&self, mood_id: Uuid, owner_id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait Store: HabitStore + CompletionStore + MoodStore {
    /// Readiness probe.
    async fn ping(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamps() {
        assert_eq!(Page::default(), Page { skip: 0, limit: 100 });
        assert_eq!(Page::new(Some(-5), Some(0)), Page { skip: 0, limit: 1 });
        assert_eq!(Page::new(Some(10), Some(5000)), Page { skip: 10, limit: 1000 });
    }

    #[test]
    fn test_page_apply() {
        let page = Page::new(Some(2), Some(3));
        assert_eq!(page.apply((0..10).collect::<Vec<i32>>()), vec![2, 3, 4]);
    }
}
