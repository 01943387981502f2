use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::db::PgCompletionStore;
use crate::dto::{non_blank, CreateScheduleRequest, MessageResponse, UpdateCompletionRequest};
use crate::error::{AppError, AppResult};
use crate::models::custom_workout::CustomWorkout;
use crate::models::schedule::{
    ResolvedWorkout, ScheduleEntry, ScheduleQuery, ScheduledWorkout, ScheduledWorkoutDetail, WorkoutReference,
};
use crate::models::workout::Workout;
use crate::models::workout_type::WorkoutType;
use crate::services::completion_sync;
use crate::AppState;

/// Records a batch of schedule rows point at, keyed by id.
#[derive(Debug, Default)]
struct Associations {
    types: HashMap<Uuid, WorkoutType>,
    plans: HashMap<Uuid, CustomWorkout>,
    logs: HashMap<Uuid, Workout>,
}

impl Associations {
    async fn load(db: &PgPool, rows: &[ScheduledWorkout]) -> AppResult<Self> {
        let type_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.workout_type_id).collect();
        let plan_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.custom_workout_id).collect();
        let log_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.workout_id).collect();

        let types = sqlx::query_as::<_, WorkoutType>("SELECT * FROM workout_types WHERE id = ANY($1)")
            .bind(&type_ids)
            .fetch_all(db)
            .await?;

        let plans = sqlx::query_as::<_, CustomWorkout>("SELECT * FROM custom_workouts WHERE id = ANY($1)")
            .bind(&plan_ids)
            .fetch_all(db)
            .await?;

        let logs = sqlx::query_as::<_, Workout>("SELECT * FROM workouts WHERE id = ANY($1)")
            .bind(&log_ids)
            .fetch_all(db)
            .await?;

        Ok(Self {
            types: types.into_iter().map(|t| (t.id, t)).collect(),
            plans: plans.into_iter().map(|p| (p.id, p)).collect(),
            logs: logs.into_iter().map(|w| (w.id, w)).collect(),
        })
    }

    fn resolve(&self, row: &ScheduledWorkout) -> Option<ResolvedWorkout> {
        match row.reference()? {
            WorkoutReference::Template(id) => self.types.get(&id).cloned().map(ResolvedWorkout::Template),
            WorkoutReference::Plan(id) => self.plans.get(&id).cloned().map(ResolvedWorkout::Plan),
        }
    }

    fn detail(&self, row: ScheduledWorkout) -> ScheduledWorkoutDetail {
        let (workout_type, custom_workout) = match self.resolve(&row) {
            Some(ResolvedWorkout::Template(t)) => (Some(t), None),
            Some(ResolvedWorkout::Plan(p)) => (None, Some(p)),
            None => (None, None),
        };
        let workout = row.workout_id.and_then(|id| self.logs.get(&id).cloned());

        ScheduledWorkoutDetail {
            entry: row,
            workout_type,
            custom_workout,
            workout,
        }
    }
}

async fn find_owned_entry(db: &PgPool, auth_user: &AuthUser, entry_id: Uuid) -> AppResult<ScheduledWorkout> {
    let row = sqlx::query_as::<_, ScheduledWorkout>("SELECT * FROM scheduled_workouts WHERE id = $1")
        .bind(entry_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("Scheduled workout not found".into()))?;

    auth_user.ensure_owns(row.user_id)?;
    Ok(row)
}

async fn load_detail(db: &PgPool, row: ScheduledWorkout) -> AppResult<ScheduledWorkoutDetail> {
    let associations = Associations::load(db, std::slice::from_ref(&row)).await?;
    Ok(associations.detail(row))
}

pub async fn list_schedule(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ScheduleQuery>,
) -> AppResult<Json<Vec<ScheduledWorkoutDetail>>> {
    let (start, end) = query.range().unzip();

    let rows = sqlx::query_as::<_, ScheduledWorkout>(
        r#"
        SELECT * FROM scheduled_workouts
        WHERE user_id = $1
          AND ($2::date IS NULL OR scheduled_date BETWEEN $2 AND $3)
        ORDER BY scheduled_date ASC, created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    let associations = Associations::load(&state.db, &rows).await?;
    Ok(Json(rows.into_iter().map(|r| associations.detail(r)).collect()))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateScheduleRequest>,
) -> AppResult<(StatusCode, Json<ScheduledWorkoutDetail>)> {
    body.validate()?;
    let reference = body.reference()?;

    match reference {
        WorkoutReference::Template(id) => {
            let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM workout_types WHERE id = $1)")
                .bind(id)
                .fetch_one(&state.db)
                .await?;
            if !exists {
                return Err(AppError::Validation("Unknown workout type".into()));
            }
        }
        WorkoutReference::Plan(id) => {
            let owner = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM custom_workouts WHERE id = $1")
                .bind(id)
                .fetch_optional(&state.db)
                .await?
                .ok_or(AppError::Validation("Unknown custom workout".into()))?;
            auth_user.ensure_owns(owner)?;
        }
    }

    let row = sqlx::query_as::<_, ScheduledWorkout>(
        r#"
        INSERT INTO scheduled_workouts
            (id, user_id, scheduled_date, notes, workout_type_id, custom_workout_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.scheduled_date)
    .bind(non_blank(body.notes))
    .bind(reference.workout_type_id())
    .bind(reference.custom_workout_id())
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        user_id = %auth_user.id,
        scheduled_workout_id = %row.id,
        scheduled_date = %row.scheduled_date,
        "Workout scheduled"
    );

    Ok((StatusCode::CREATED, Json(load_detail(&state.db, row).await?)))
}

/// Removing the entry leaves any workout already logged from it in place.
pub async fn delete_schedule(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    find_owned_entry(&state.db, &auth_user, entry_id).await?;

    let result = sqlx::query("DELETE FROM scheduled_workouts WHERE id = $1 AND user_id = $2")
        .bind(entry_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Scheduled workout not found".into()));
    }

    Ok(Json(MessageResponse::new("Scheduled workout deleted")))
}

/// PATCH /api/schedule/:id: mark a scheduled workout complete or not.
pub async fn update_completion(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateCompletionRequest>,
) -> AppResult<Json<ScheduledWorkoutDetail>> {
    let row = find_owned_entry(&state.db, &auth_user, entry_id).await?;

    let associations = Associations::load(&state.db, std::slice::from_ref(&row)).await?;
    let entry = ScheduleEntry::new(&row, associations.resolve(&row));

    let store = PgCompletionStore::new(&state.db);
    let settled = completion_sync::set_completion(&store, entry, body.completed).await?;

    Ok(Json(load_detail(&state.db, settled_row(row, &settled)).await?))
}

/// The stored row after a transition, as this request left it. Built from
/// the synchronizer's result so a later toggle is not reported as ours.
fn settled_row(row: ScheduledWorkout, settled: &ScheduleEntry) -> ScheduledWorkout {
    if row.completed == settled.completed && row.workout_id == settled.workout_id {
        return row;
    }
    ScheduledWorkout {
        completed: settled.completed,
        workout_id: settled.workout_id,
        updated_at: Utc::now(),
        ..row
    }
}
