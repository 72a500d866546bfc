use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::engine::{group_by_habit, habits_for_date};
use crate::error::{AppError, AppResult};
use crate::models::habit::{
    CreateHabitRequest, Habit, HabitForDate, HabitListQuery, UpdateHabitRequest,
};
use crate::store::{CompletionStore, HabitStore, Page};
use crate::AppState;

pub async fn list_habits(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<HabitListQuery>,
) -> AppResult<Json<Vec<Habit>>> {
    let page = Page::new(query.skip, query.limit);
    let habits = state
        .store
        .list_habits(auth_user.id, query.active_only, page)
        .await?;

    Ok(Json(habits))
}

pub async fn get_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<Habit>> {
    let habit = state
        .store
        .fetch_habit(habit_id, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("Habit not found".into()))?;

    Ok(Json(habit))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateHabitRequest>,
) -> AppResult<(StatusCode, Json<Habit>)> {
    body.validate()?;
    body.validate_schedule().map_err(AppError::Validation)?;

    let habit = state
        .store
        .create_habit(auth_user.id, body.into_new_habit())
        .await?;
    tracing::info!(habit_id = %habit.id, user_id = %auth_user.id, frequency = ?habit.frequency, "Habit created");

    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
    Json(body): Json<UpdateHabitRequest>,
) -> AppResult<Json<Habit>> {
    body.validate()?;

    let mut habit = state
        .store
        .fetch_habit(habit_id, auth_user.id)
        .await?
        .ok_or(AppError::NotFound("Habit not found".into()))?;

    body.validate_against(&habit).map_err(AppError::Validation)?;
    habit.apply_update(body, Utc::now());

    let habit = state.store.save_habit(&habit).await?;
    Ok(Json(habit))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(habit_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if !state.store.delete_habit(habit_id, auth_user.id).await? {
        return Err(AppError::NotFound("Habit not found".into()));
    }
    tracing::info!(habit_id = %habit_id, user_id = %auth_user.id, "Habit deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Active habits due on `date`, each with that day's completion if any.
pub async fn list_habits_for_date(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<Vec<HabitForDate>>> {
    let habits = state.store.list_active_habits(auth_user.id).await?;
    let completions = state
        .store
        .fetch_completions_on_date(auth_user.id, date)
        .await?;

    let agenda = habits_for_date(&habits, &group_by_habit(completions), date);
    Ok(Json(agenda))
}
