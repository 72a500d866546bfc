use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::completion::Completion;
use crate::models::habit::{Habit, NewHabit};
use crate::models::mood::Mood;
use crate::store::{CompletionStore, HabitStore, MoodStore, Page, Store};

/// Process-local store, used when no database is configured and in tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    habits: HashMap<Uuid, Habit>,
    completions: HashMap<Uuid, Completion>,
    moods: HashMap<Uuid, Mood>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn owns_habit(&self, habit_id: Uuid, owner_id: Uuid) -> bool {
        self.habits
            .get(&habit_id)
            .is_some_and(|h| h.user_id == owner_id)
    }
}

#[async_trait]
impl HabitStore for MemoryStore {
    async fn fetch_habit(&self, habit_id: Uuid, owner_id: Uuid) -> AppResult<Option<Habit>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .habits
            .get(&habit_id)
            .filter(|h| h.user_id == owner_id)
            .cloned())
    }

    async fn list_habits(
        &self,
        owner_id: Uuid,
        active_only: bool,
        page: Page,
    ) -> AppResult<Vec<Habit>> {
        let tables = self.inner.lock().await;
        let mut habits: Vec<Habit> = tables
            .habits
            .values()
            .filter(|h| h.user_id == owner_id && (!active_only || h.is_active))
            .cloned()
            .collect();
        habits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.apply(habits))
    }

    async fn list_active_habits(&self, owner_id: Uuid) -> AppResult<Vec<Habit>> {
        let tables = self.inner.lock().await;
        let mut habits: Vec<Habit> = tables
            .habits
            .values()
            .filter(|h| h.user_id == owner_id && h.is_active)
            .cloned()
            .collect();
        habits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(habits)
    }

    async fn create_habit(&self, owner_id: Uuid, habit: NewHabit) -> AppResult<Habit> {
        let now = Utc::now();
        let habit = Habit {
            id: Uuid::new_v4(),
            user_id: owner_id,
            title: habit.title,
            description: habit.description,
            frequency: habit.frequency,
            weekdays: habit.weekdays,
            custom_interval_days: habit.custom_interval_days,
            target_time: habit.target_time,
            duration_minutes: habit.duration_minutes,
            is_active: habit.is_active,
            color: habit.color,
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.inner.lock().await;
        tables.habits.insert(habit.id, habit.clone());
        Ok(habit)
    }

    async fn save_habit(&self, habit: &Habit) -> AppResult<Habit> {
        let mut tables = self.inner.lock().await;
        if !tables.owns_habit(habit.id, habit.user_id) {
            return Err(AppError::NotFound("Habit not found".into()));
        }
        let mut saved = habit.clone();
        saved.updated_at = Utc::now();
        tables.habits.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete_habit(&self, habit_id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let mut tables = self.inner.lock().await;
        if !tables.owns_habit(habit_id, owner_id) {
            return Ok(false);
        }
        tables.habits.remove(&habit_id);
        tables.completions.retain(|_, c| c.habit_id != habit_id);
        Ok(true)
    }
}

#[async_trait]
impl CompletionStore for MemoryStore {
    async fn create_completion(
        &self,
        habit_id: Uuid,
        completed_at: DateTime<Utc>,
        note: Option<String>,
    ) -> AppResult<Completion> {
        let mut tables = self.inner.lock().await;
        if !tables.habits.contains_key(&habit_id) {
            return Err(AppError::NotFound("Habit not found".into()));
        }
        let completion = Completion {
            id: Uuid::new_v4(),
            habit_id,
            completed_at,
            note,
        };
        tables.completions.insert(completion.id, completion.clone());
        Ok(completion)
    }

    async fn fetch_completion(
        &self,
        completion_id: Uuid,
        owner_id: Uuid,
    ) -> AppResult<Option<Completion>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .completions
            .get(&completion_id)
            .filter(|c| tables.owns_habit(c.habit_id, owner_id))
            .cloned())
    }

    async fn delete_completion(&self, completion_id: Uuid) -> AppResult<bool> {
        let mut tables = self.inner.lock().await;
        Ok(tables.completions.remove(&completion_id).is_some())
    }

    async fn fetch_completions(&self, habit_id: Uuid) -> AppResult<Vec<Completion>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .completions
            .values()
            .filter(|c| c.habit_id == habit_id)
            .cloned()
            .collect())
    }

    async fn list_completions(&self, habit_id: Uuid, page: Page) -> AppResult<Vec<Completion>> {
        let mut completions = self.fetch_completions(habit_id).await?;
        completions.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(page.apply(completions))
    }

    async fn fetch_completions_on_date(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<Completion>> {
        let tables = self.inner.lock().await;
        let mut completions: Vec<Completion> = tables
            .completions
            .values()
            .filter(|c| c.completed_date() == date && tables.owns_habit(c.habit_id, owner_id))
            .cloned()
            .collect();
        completions.sort_by_key(|c| c.completed_at);
        Ok(completions)
    }
}

#[async_trait]
impl MoodStore for MemoryStore {
    async fn upsert_mood(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        level: i16,
        note: Option<String>,
    ) -> AppResult<Mood> {
        let now = Utc::now();
        let mut tables = self.inner.lock().await;
        let existing = tables
            .moods
            .values_mut()
            .find(|m| m.user_id == owner_id && m.mood_date == date);

        let mood = match existing {
            Some(mood) => {
                mood.mood_level = level;
                mood.note = note;
                mood.updated_at = now;
                mood.clone()
            }
            None => {
                let mood = Mood {
                    id: Uuid::new_v4(),
                    user_id: owner_id,
                    mood_level: level,
                    mood_date: date,
                    note,
                    created_at: now,
                    updated_at: now,
                };
                tables.moods.insert(mood.id, mood.clone());
                mood
            }
        };
        Ok(mood)
    }

    async fn fetch_mood(&self, mood_id: Uuid, owner_id: Uuid) -> AppResult<Option<Mood>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .moods
            .get(&mood_id)
            .filter(|m| m.user_id == owner_id)
            .cloned())
    }

    async fn update_mood(&self, mood: &Mood) -> AppResult<Mood> {
        let mut tables = self.inner.lock().await;
        let stored = tables
            .moods
            .get_mut(&mood.id)
            .filter(|m| m.user_id == mood.user_id)
            .ok_or(AppError::NotFound("Mood not found".into()))?;
        stored.mood_level = mood.mood_level;
        stored.note = mood.note.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn list_moods(&self, owner_id: Uuid, page: Page) -> AppResult<Vec<Mood>> {
        let tables = self.inner.lock().await;
        let mut moods: Vec<Mood> = tables
            .moods
            .values()
            .filter(|m| m.user_id == owner_id)
            .cloned()
            .collect();
        moods.sort_by(|a, b| b.mood_date.cmp(&a.mood_date));
        Ok(page.apply(moods))
    }

    async fn fetch_mood_by_date(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<Mood>> {
        let tables = self.inner.lock().await;
        Ok(tables
            .moods
            .values()
            .find(|m| m.user_id == owner_id && m.mood_date == date)
            .cloned())
    }

    async fn moods_between(
        &self,
        owner_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Mood>> {
        let tables = self.inner.lock().await;
        let mut moods: Vec<Mood> = tables
            .moods
            .values()
            .filter(|m| m.user_id == owner_id && (start..=end).contains(&m.mood_date))
            .cloned()
            .collect();
        moods.sort_by_key(|m| m.mood_date);
        Ok(moods)
    }

    async fn delete_mood(&self, mood_id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let mut tables = self.inner.lock().await;
        let owned = tables
            .moods
            .get(&mood_id)
            .is_some_and(|m| m.user_id == owner_id);
        if owned {
            tables.moods.remove(&mood_id);
        }
        Ok(owned)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::habit::HabitFrequency;

    fn new_habit(title: &str, is_active: bool) -> NewHabit {
        NewHabit {
            title: title.into(),
            description: None,
            frequency: HabitFrequency::Daily,
            weekdays: None,
            custom_interval_days: None,
            target_time: None,
            duration_minutes: None,
            is_active,
            color: None,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_habits_are_scoped_to_owner() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let habit = store.create_habit(alice, new_habit("Run", true)).await.unwrap();

        assert!(store.fetch_habit(habit.id, alice).await.unwrap().is_some());
        assert!(store.fetch_habit(habit.id, bob).await.unwrap().is_none());
        assert!(!store.delete_habit(habit.id, bob).await.unwrap());
        assert!(store.list_habits(bob, false, Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_active_filter() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store.create_habit(owner, new_habit("On", true)).await.unwrap();
        store.create_habit(owner, new_habit("Off", false)).await.unwrap();

        assert_eq!(store.list_habits(owner, false, Page::default()).await.unwrap().len(), 2);
        assert_eq!(store.list_habits(owner, true, Page::default()).await.unwrap().len(), 1);
        let active = store.list_active_habits(owner).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "On");
    }

    #[tokio::test]
    async fn test_delete_habit_cascades_completions() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let habit = store.create_habit(owner, new_habit("Read", true)).await.unwrap();
        let completion = store
            .create_completion(habit.id, Utc::now(), None)
            .await
            .unwrap();

        assert!(store.delete_habit(habit.id, owner).await.unwrap());
        assert!(store.fetch_completions(habit.id).await.unwrap().is_empty());
        assert!(store.fetch_completion(completion.id, owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_completions_on_date_only_for_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mine = store.create_habit(owner, new_habit("Mine", true)).await.unwrap();
        let theirs = store.create_habit(other, new_habit("Theirs", true)).await.unwrap();

        let at = day(3).and_hms_opt(10, 0, 0).unwrap().and_utc();
        store.create_completion(mine.id, at, None).await.unwrap();
        store.create_completion(theirs.id, at, None).await.unwrap();
        store
            .create_completion(mine.id, day(4).and_hms_opt(10, 0, 0).unwrap().and_utc(), None)
            .await
            .unwrap();

        let on_date = store.fetch_completions_on_date(owner, day(3)).await.unwrap();
        assert_eq!(on_date.len(), 1);
        assert_eq!(on_date[0].habit_id, mine.id);
    }

    #[tokio::test]
    async fn test_mood_upsert_replaces_same_date() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();

        let first = store
            .upsert_mood(owner, day(1), 2, Some("tired".into()))
            .await
            .unwrap();
        let second = store.upsert_mood(owner, day(1), 4, None).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.mood_level, 4);
        assert_eq!(second.note, None);
        assert_eq!(store.list_moods(owner, Page::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_moods_between_is_inclusive_and_sorted() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        for d in [5, 1, 3, 7] {
            store.upsert_mood(owner, day(d), 3, None).await.unwrap();
        }

        let moods = store.moods_between(owner, day(1), day(5)).await.unwrap();
        let dates: Vec<NaiveDate> = moods.iter().map(|m| m.mood_date).collect();
        assert_eq!(dates, vec![day(1), day(3), day(5)]);
    }

    #[tokio::test]
    async fn test_mood_update_is_scoped_to_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mut mood = store
            .upsert_mood(owner, day(2), 3, Some("ok".into()))
            .await
            .unwrap();

        assert!(store.fetch_mood(mood.id, Uuid::new_v4()).await.unwrap().is_none());

        mood.mood_level = 5;
        mood.note = None;
        let saved = store.update_mood(&mood).await.unwrap();
        assert_eq!(saved.mood_level, 5);
        assert_eq!(saved.note, None);
        assert_eq!(saved.mood_date, day(2));

        let fetched = store.fetch_mood(mood.id, owner).await.unwrap().unwrap();
        assert_eq!(fetched.mood_level, 5);

        mood.user_id = Uuid::new_v4();
        assert!(matches!(
            store.update_mood(&mood).await,
            Err(AppError::NotFound(_))
        ));
    }
}
