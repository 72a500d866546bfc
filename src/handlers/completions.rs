use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, SubsecRound, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::engine::{completion_dates, completion_rate, streak_from_dates, Schedule};
use crate::error::{AppError, AppResult};
use crate::models::completion::{
    Completion, CompletionListQuery, CreateCompletionRequest, StreakInfo, StreakQuery,
};
use crate::store::{CompletionStore, HabitStore, Page};
use crate::AppState;

const COMPLETION_RATE_WINDOW_DAYS: u64 = 30;

/// Marks a habit done now. An empty body is allowed, anything else must
/// be a valid completion request.
pub async fn complete_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Completion>)> {
    let body = parse_optional_body(&body)?;
    body.validate()?;

    // Verify habit ownership
    state
        .store
        .fetch_habit(habit_id, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("Habit not found".into()))?;

    let completion = state
        .store
        .create_completion(habit_id, Utc::now().trunc_subsecs(0), body.note)
        .await?;
    tracing::info!(habit_id = %habit_id, completion_id = %completion.id, "Habit completed");

    Ok((StatusCode::CREATED, Json(completion)))
}

/// Retracts one completion.
pub async fn delete_completion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(completion_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let completion = state
        .store
        .fetch_completion(completion_id, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("Completion not found".into()))?;

    state.store.delete_completion(completion.id).await?;
    tracing::info!(habit_id = %completion.habit_id, completion_id = %completion.id, "Completion retracted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn list_habit_completions(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    Query(query): Query<CompletionListQuery>,
) -> AppResult<Json<Vec<Completion>>> {
    state
        .store
        .fetch_habit(habit_id, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("Habit not found".into()))?;

    let completions = state
        .store
        .list_completions(habit_id, Page::new(query.skip, query.limit))
        .await?;

    Ok(Json(completions))
}

pub async fn list_completions_on_date(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Vec<Completion>>> {
    let completions = state
        .store
        .fetch_completions_on_date(auth_user.id, date)
        .await?;

    Ok(Json(completions))
}

/// Streaks are recomputed from the full history on every read.
pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    Query(query): Query<StreakQuery>,
) -> AppResult<Json<StreakInfo>> {
    let habit = state
        .store
        .fetch_habit(habit_id, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("Habit not found".into()))?;

    let today = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let completions = state.store.fetch_completions(habit_id).await?;

    let schedule = Schedule::for_habit(&habit);
    let dates = completion_dates(&completions);
    let streak = streak_from_dates(&schedule, &dates, completions.len() as u64, today);
    let completion_rate_30d =
        completion_rate(&schedule, &dates, today, COMPLETION_RATE_WINDOW_DAYS);
    tracing::debug!(
        habit_id = %habit_id,
        current = streak.current_streak,
        longest = streak.longest_streak,
        "Streak computed"
    );

    Ok(Json(StreakInfo {
        habit_id,
        streak,
        completion_rate_30d,
    }))
}

fn parse_optional_body(body: &[u8]) -> AppResult<CreateCompletionRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateCompletionRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)))
}
