use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{non_blank, CreateCustomWorkoutRequest, MessageResponse};
use crate::error::{AppError, AppResult};
use crate::models::custom_workout::{CustomWorkout, CustomWorkoutWithExercises, PlanItem, PlanItemRow};
use crate::models::exercise::Exercise;
use crate::AppState;

/// Attach ordered exercises to each plan with two batched queries.
async fn with_exercises(db: &PgPool, plans: Vec<CustomWorkout>) -> AppResult<Vec<CustomWorkoutWithExercises>> {
    let plan_ids: Vec<Uuid> = plans.iter().map(|p| p.id).collect();

    let rows = sqlx::query_as::<_, PlanItemRow>(
        r#"
        SELECT * FROM custom_workout_exercises
        WHERE custom_workout_id = ANY($1)
        ORDER BY custom_workout_id, position ASC
        "#,
    )
    .bind(&plan_ids)
    .fetch_all(db)
    .await?;

    let mut exercise_ids: Vec<Uuid> = rows.iter().map(|r| r.exercise_id).collect();
    exercise_ids.sort();
    exercise_ids.dedup();

    let exercises: HashMap<Uuid, Exercise> =
        sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE id = ANY($1)")
            .bind(&exercise_ids)
            .fetch_all(db)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

    let mut items: HashMap<Uuid, Vec<PlanItem>> = HashMap::new();
    for row in rows {
        let exercise = exercises.get(&row.exercise_id).cloned().ok_or_else(|| {
            AppError::DataIntegrity(format!(
                "plan item {} references missing exercise {}",
                row.id, row.exercise_id
            ))
        })?;
        items
            .entry(row.custom_workout_id)
            .or_default()
            .push(PlanItem::from_row(row, exercise));
    }

    Ok(plans
        .into_iter()
        .map(|workout| {
            let exercises = items.remove(&workout.id).unwrap_or_default();
            CustomWorkoutWithExercises { workout, exercises }
        })
        .collect())
}

async fn find_owned_plan(db: &PgPool, auth_user: &AuthUser, plan_id: Uuid) -> AppResult<CustomWorkout> {
    let plan = sqlx::query_as::<_, CustomWorkout>("SELECT * FROM custom_workouts WHERE id = $1")
        .bind(plan_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("Custom workout not found".into()))?;

    auth_user.ensure_owns(plan.user_id)?;
    Ok(plan)
}

pub async fn list_custom_workouts(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<CustomWorkoutWithExercises>>> {
    let plans = sqlx::query_as::<_, CustomWorkout>(
        "SELECT * FROM custom_workouts WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(with_exercises(&state.db, plans).await?))
}

pub async fn create_custom_workout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateCustomWorkoutRequest>,
) -> AppResult<(StatusCode, Json<CustomWorkoutWithExercises>)> {
    body.validate()?;

    let wanted = body.exercise_ids();
    let known = sqlx::query_scalar::<_, Uuid>("SELECT id FROM exercises WHERE id = ANY($1)")
        .bind(&wanted)
        .fetch_all(&state.db)
        .await?;

    if known.len() != wanted.len() {
        return Err(AppError::Validation("Unknown exercise in plan".into()));
    }

    let mut tx = state.db.begin().await?;

    let plan = sqlx::query_as::<_, CustomWorkout>(
        r#"
        INSERT INTO custom_workouts (id, user_id, name, description)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.name.trim())
    .bind(non_blank(body.description))
    .fetch_one(&mut *tx)
    .await?;

    for (position, item) in body.exercises.into_iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO custom_workout_exercises
                (id, custom_workout_id, exercise_id, sets, reps, duration, position, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(plan.id)
        .bind(item.id)
        .bind(item.sets)
        .bind(item.reps)
        .bind(item.duration)
        .bind(position as i32)
        .bind(non_blank(item.notes))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(user_id = %auth_user.id, custom_workout_id = %plan.id, "Custom workout created");

    let mut created = with_exercises(&state.db, vec![plan]).await?;
    let created = created
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("created plan vanished")))?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_custom_workout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(plan_id): Path<Uuid>,
) -> AppResult<Json<CustomWorkoutWithExercises>> {
    let plan = find_owned_plan(&state.db, &auth_user, plan_id).await?;

    let mut loaded = with_exercises(&state.db, vec![plan]).await?;
    loaded
        .pop()
        .map(Json)
        .ok_or(AppError::NotFound("Custom workout not found".into()))
}

/// Scheduled entries for the plan go with it; logs already derived from
/// them are kept.
pub async fn delete_custom_workout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(plan_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    find_owned_plan(&state.db, &auth_user, plan_id).await?;

    let result = sqlx::query("DELETE FROM custom_workouts WHERE id = $1 AND user_id = $2")
        .bind(plan_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Custom workout not found".into()));
    }

    Ok(Json(MessageResponse::new("Custom workout deleted")))
}
