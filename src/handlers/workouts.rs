use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{non_blank, MessageResponse, WorkoutRequest};
use crate::error::{AppError, AppResult};
use crate::models::workout::Workout;
use crate::AppState;

/// Load a workout and check the caller owns it: 404 before 403.
async fn find_owned_workout(db: &PgPool, auth_user: &AuthUser, workout_id: Uuid) -> AppResult<Workout> {
    let workout = sqlx::query_as::<_, Workout>("SELECT * FROM workouts WHERE id = $1")
        .bind(workout_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("Workout not found".into()))?;

    auth_user.ensure_owns(workout.user_id)?;
    Ok(workout)
}

pub async fn list_workouts(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<Workout>>> {
    let workouts = sqlx::query_as::<_, Workout>(
        r#"
        SELECT * FROM workouts
        WHERE user_id = $1
        ORDER BY date DESC, created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(workouts))
}

pub async fn create_workout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<WorkoutRequest>,
) -> AppResult<(StatusCode, Json<Workout>)> {
    body.validate()?;

    let workout = sqlx::query_as::<_, Workout>(
        r#"
        INSERT INTO workouts (id, user_id, exercise, duration, calories, notes, date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.exercise.trim())
    .bind(body.duration)
    .bind(body.calories)
    .bind(non_blank(body.notes))
    .bind(body.date)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(workout)))
}

pub async fn get_workout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(workout_id): Path<Uuid>,
) -> AppResult<Json<Workout>> {
    let workout = find_owned_workout(&state.db, &auth_user, workout_id).await?;
    Ok(Json(workout))
}

pub async fn update_workout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(workout_id): Path<Uuid>,
    Json(body): Json<WorkoutRequest>,
) -> AppResult<Json<Workout>> {
    find_owned_workout(&state.db, &auth_user, workout_id).await?;
    body.validate()?;

    let workout = sqlx::query_as::<_, Workout>(
        r#"
        UPDATE workouts SET
            exercise = $3,
            duration = $4,
            calories = $5,
            notes = $6,
            date = $7,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(workout_id)
    .bind(auth_user.id)
    .bind(body.exercise.trim())
    .bind(body.duration)
    .bind(body.calories)
    .bind(non_blank(body.notes))
    .bind(body.date)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Workout not found".into()))?;

    Ok(Json(workout))
}

/// Deleting a log that a scheduled workout derived reverts that entry to
/// not completed, in the same transaction.
pub async fn delete_workout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(workout_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    find_owned_workout(&state.db, &auth_user, workout_id).await?;

    let mut tx = state.db.begin().await?;

    let reverted = sqlx::query(
        r#"
        UPDATE scheduled_workouts
        SET completed = false, workout_id = NULL, updated_at = NOW()
        WHERE workout_id = $1
        "#,
    )
    .bind(workout_id)
    .execute(&mut *tx)
    .await?;

    let deleted = sqlx::query("DELETE FROM workouts WHERE id = $1 AND user_id = $2")
        .bind(workout_id)
        .bind(auth_user.id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound("Workout not found".into()));
    }

    tx.commit().await?;

    if reverted.rows_affected() > 0 {
        tracing::info!(
            workout_id = %workout_id,
            "Deleted workout was linked to a scheduled workout; marked it incomplete"
        );
    }

    Ok(Json(MessageResponse::new("Workout deleted")))
}
