use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{Days, Months, NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::engine::mood_statistics;
use crate::error::{AppError, AppResult};
use crate::models::mood::{
    Mood, MoodListQuery, MoodRangeQuery, MoodStats, MoodStatsQuery, UpdateMoodRequest,
    UpsertMoodRequest,
};
use crate::store::{MoodStore, Page};
use crate::AppState;

const DEFAULT_STATS_DAYS: i64 = 30;
const MAX_STATS_DAYS: i64 = 366;
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// One mood per day: posting for a date that already has one replaces it.
pub async fn upsert_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertMoodRequest>,
) -> AppResult<(StatusCode, Json<Mood>)> {
    body.validate()?;

    let mood_date = body.mood_date.unwrap_or_else(|| Utc::now().date_naive());
    let mood = state
        .store
        .upsert_mood(auth_user.id, mood_date, body.mood_level, body.note)
        .await?;

    Ok((StatusCode::CREATED, Json(mood)))
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodListQuery>,
) -> AppResult<Json<Vec<Mood>>> {
    let moods = state
        .store
        .list_moods(auth_user.id, Page::new(query.skip, query.limit))
        .await?;

    Ok(Json(moods))
}

pub async fn get_mood_by_date(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Mood>> {
    let mood = state
        .store
        .fetch_mood_by_date(auth_user.id, date)
        .await?
        .ok_or(AppError::NotFound("Mood record not found for this date".into()))?;

    Ok(Json(mood))
}

pub async fn get_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(mood_id): Path<Uuid>,
) -> AppResult<Json<Mood>> {
    let mood = state
        .store
        .fetch_mood(mood_id, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("Mood not found".into()))?;

    Ok(Json(mood))
}

pub async fn update_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(mood_id): Path<Uuid>,
    Json(body): Json<UpdateMoodRequest>,
) -> AppResult<Json<Mood>> {
    body.validate()?;

    let mut mood = state
        .store
        .fetch_mood(mood_id, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("Mood not found".into()))?;

    mood.apply_update(body, Utc::now());
    let mood = state.store.update_mood(&mood).await?;
    Ok(Json(mood))
}

/// Every mood in one calendar month, oldest first. Feeds the calendar view.
pub async fn list_moods_by_month(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<Json<Vec<Mood>>> {
    let (start, end) = month_bounds(year, month)?;
    let moods = state.store.moods_between(auth_user.id, start, end).await?;

    Ok(Json(moods))
}

fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    if !(1..=12).contains(&month) {
        return Err(AppError::BadRequest("Month must be between 1 and 12".into()));
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::BadRequest(format!(
            "Year must be between {} and {}",
            MIN_YEAR, MAX_YEAR
        )));
    }

    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest("Invalid month".into()))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::BadRequest("Invalid month".into()))?;
    Ok((start, end))
}

pub async fn list_moods_in_range(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodRangeQuery>,
) -> AppResult<Json<Vec<Mood>>> {
    if query.start_date > query.end_date {
        return Err(AppError::Validation(
            "start_date must not be after end_date".into(),
        ));
    }

    let moods = state
        .store
        .moods_between(auth_user.id, query.start_date, query.end_date)
        .await?;

    Ok(Json(moods))
}

/// Statistics over the `days` before `as_of` (inclusive of both ends).
pub async fn get_mood_statistics(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodStatsQuery>,
) -> AppResult<Json<MoodStats>> {
    let days = query.days.unwrap_or(DEFAULT_STATS_DAYS);
    if !(1..=MAX_STATS_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "days must be between 1 and {}",
            MAX_STATS_DAYS
        )));
    }

    let end = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let start = end
        .checked_sub_days(Days::new(days as u64))
        .ok_or_else(|| AppError::Validation("as_of is out of range".into()))?;

    let moods = state.store.moods_between(auth_user.id, start, end).await?;
    Ok(Json(mood_statistics(&moods)))
}

pub async fn delete_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(mood_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if !state.store.delete_mood(mood_id, auth_user.id).await? {
        return Err(AppError::NotFound("Mood record not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(2024, 2).unwrap(),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            month_bounds(2023, 12).unwrap(),
            (date(2023, 12, 1), date(2023, 12, 31))
        );
    }

    #[test]
    fn test_month_bounds_rejects_out_of_range() {
        assert!(matches!(month_bounds(2024, 0), Err(AppError::BadRequest(_))));
        assert!(matches!(month_bounds(2024, 13), Err(AppError::BadRequest(_))));
        assert!(matches!(month_bounds(1899, 5), Err(AppError::BadRequest(_))));
        assert!(matches!(month_bounds(2101, 5), Err(AppError::BadRequest(_))));
    }
}
