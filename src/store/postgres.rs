use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::completion::Completion;
use crate::models::habit::{Habit, NewHabit};
use crate::models::mood::Mood;
use crate::store::{CompletionStore, HabitStore, MoodStore, Page, Store};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `[start of date, start of next day)` in UTC.
fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + chrono::Duration::days(1))
}

#[async_trait]
impl HabitStore for PgStore {
    async fn fetch_habit(&self, habit_id: Uuid, owner_id: Uuid) -> AppResult<Option<Habit>> {
        let habit = sqlx::query_as::<_, Habit>(
            "SELECT * FROM habits WHERE id = $1 AND user_id = $2",
        )
        .bind(habit_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(habit)
    }

    async fn list_habits(
        &self,
        owner_id: Uuid,
        active_only: bool,
        page: Page,
    ) -> AppResult<Vec<Habit>> {
        let habits = sqlx::query_as::<_, Habit>(
            r#"
            SELECT * FROM habits
            WHERE user_id = $1 AND ($2 = false OR is_active = true)
            ORDER BY created_at DESC
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(owner_id)
        .bind(active_only)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(habits)
    }

    async fn list_active_habits(&self, owner_id: Uuid) -> AppResult<Vec<Habit>> {
        let habits = sqlx::query_as::<_, Habit>(
            r#"
            SELECT * FROM habits
            WHERE user_id = $1 AND is_active = true
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(habits)
    }

    async fn create_habit(&self, owner_id: Uuid, habit: NewHabit) -> AppResult<Habit> {
        let habit = sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (id, user_id, title, description, frequency, weekdays, custom_interval_days, target_time, duration_minutes, is_active, color)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&habit.title)
        .bind(&habit.description)
        .bind(habit.frequency)
        .bind(&habit.weekdays)
        .bind(habit.custom_interval_days)
        .bind(habit.target_time)
        .bind(habit.duration_minutes)
        .bind(habit.is_active)
        .bind(&habit.color)
        .fetch_one(&self.pool)
        .await?;

        Ok(habit)
    }

    async fn save_habit(&self, habit: &Habit) -> AppResult<Habit> {
        let saved = sqlx::query_as::<_, Habit>(
            r#"
            UPDATE habits SET
                title = $3,
                description = $4,
                frequency = $5,
                weekdays = $6,
                custom_interval_days = $7,
                target_time = $8,
                duration_minutes = $9,
                is_active = $10,
                color = $11,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(habit.id)
        .bind(habit.user_id)
        .bind(&habit.title)
        .bind(&habit.description)
        .bind(habit.frequency)
        .bind(&habit.weekdays)
        .bind(habit.custom_interval_days)
        .bind(habit.target_time)
        .bind(habit.duration_minutes)
        .bind(habit.is_active)
        .bind(&habit.color)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn delete_habit(&self, habit_id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        // habit_completions rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
            .bind(habit_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CompletionStore for PgStore {
    async fn create_completion(
        &self,
        habit_id: Uuid,
        completed_at: DateTime<Utc>,
        note: Option<String>,
    ) -> AppResult<Completion> {
        let completion = sqlx::query_as::<_, Completion>(
            r#"
            INSERT INTO habit_completions (id, habit_id, completed_at, note)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(habit_id)
        .bind(completed_at)
        .bind(&note)
        .fetch_one(&self.pool)
        .await?;

        Ok(completion)
    }

    async fn fetch_completion(
        &self,
        completion_id: Uuid,
        owner_id: Uuid,
    ) -> AppResult<Option<Completion>> {
        let completion = sqlx::query_as::<_, Completion>(
            r#"
            SELECT c.* FROM habit_completions c
            JOIN habits h ON h.id = c.habit_id
            WHERE c.id = $1 AND h.user_id = $2
            "#,
        )
        .bind(completion_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(completion)
    }

    async fn delete_completion(&self, completion_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM habit_completions WHERE id = $1")
            .bind(completion_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn fetch_completions(&self, habit_id: Uuid) -> AppResult<Vec<Completion>> {
        let completions = sqlx::query_as::<_, Completion>(
            "SELECT * FROM habit_completions WHERE habit_id = $1",
        )
        .bind(habit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(completions)
    }

    async fn list_completions(&self, habit_id: Uuid, page: Page) -> AppResult<Vec<Completion>> {
        let completions = sqlx::query_as::<_, Completion>(
            r#"
            SELECT * FROM habit_completions
            WHERE habit_id = $1
            ORDER BY completed_at DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(habit_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(completions)
    }

    async fn fetch_completions_on_date(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<Completion>> {
        let (start, end) = day_bounds(date);
        let completions = sqlx::query_as::<_, Completion>(
            r#"
            SELECT c.* FROM habit_completions c
            JOIN habits h ON h.id = c.habit_id
            WHERE h.user_id = $1 AND c.completed_at >= $2 AND c.completed_at < $3
            ORDER BY c.completed_at ASC
            "#,
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(completions)
    }
}

#[async_trait]
impl MoodStore for PgStore {
    async fn upsert_mood(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        level: i16,
        note: Option<String>,
    ) -> AppResult<Mood> {
        let mood = sqlx::query_as::<_, Mood>(
            r#"
            INSERT INTO moods (id, user_id, mood_level, mood_date, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, mood_date) DO UPDATE SET
                mood_level = EXCLUDED.mood_level,
                note = EXCLUDED.note,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(level)
        .bind(date)
        .bind(&note)
        .fetch_one(&self.pool)
        .await?;

        Ok(mood)
    }

    async fn fetch_mood(&self, mood_id: Uuid, owner_id: Uuid) -> AppResult<Option<Mood>> {
        let mood = sqlx::query_as::<_, Mood>("SELECT * FROM moods WHERE id = $1 AND user_id = $2")
            .bind(mood_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(mood)
    }

    async fn update_mood(&self, mood: &Mood) -> AppResult<Mood> {
        let saved = sqlx::query_as::<_, Mood>(
            r#"
            UPDATE moods SET
                mood_level = $3,
                note = $4,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(mood.id)
        .bind(mood.user_id)
        .bind(mood.mood_level)
        .bind(&mood.note)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Mood not found".into()))?;

        Ok(saved)
    }

    async fn list_moods(&self, owner_id: Uuid, page: Page) -> AppResult<Vec<Mood>> {
        let moods = sqlx::query_as::<_, Mood>(
            r#"
            SELECT * FROM moods
            WHERE user_id = $1
            ORDER BY mood_date DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(owner_id)
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(moods)
    }

    async fn fetch_mood_by_date(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<Mood>> {
        let mood = sqlx::query_as::<_, Mood>(
            "SELECT * FROM moods WHERE user_id = $1 AND mood_date = $2",
        )
        .bind(owner_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(mood)
    }

    async fn moods_between(
        &self,
        owner_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<Mood>> {
        let moods = sqlx::query_as::<_, Mood>(
            r#"
            SELECT * FROM moods
            WHERE user_id = $1 AND mood_date BETWEEN $2 AND $3
            ORDER BY mood_date ASC
            "#,
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(moods)
    }

    async fn delete_mood(&self, mood_id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM moods WHERE id = $1 AND user_id = $2")
            .bind(mood_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}
