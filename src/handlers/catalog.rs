use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::models::exercise::{Exercise, ExerciseQuery};
use crate::models::workout_type::WorkoutType;
use crate::AppState;

pub async fn list_workout_types(State(state): State<AppState>) -> AppResult<Json<Vec<WorkoutType>>> {
    let types = sqlx::query_as::<_, WorkoutType>("SELECT * FROM workout_types ORDER BY name ASC")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(types))
}

/// Exercise library; every filter is optional and they combine with AND.
pub async fn list_exercises(
    State(state): State<AppState>,
    Query(query): Query<ExerciseQuery>,
) -> AppResult<Json<Vec<Exercise>>> {
    let exercises = sqlx::query_as::<_, Exercise>(
        r#"
        SELECT * FROM exercises
        WHERE ($1::text IS NULL OR category = $1)
          AND ($2::text IS NULL OR difficulty = $2)
          AND ($3::text IS NULL OR equipment = $3)
          AND ($4::text IS NULL OR name ILIKE $4)
        ORDER BY name ASC
        "#,
    )
    .bind(query.category.as_deref().filter(|s| !s.is_empty()))
    .bind(query.difficulty.as_deref().filter(|s| !s.is_empty()))
    .bind(query.equipment.as_deref().filter(|s| !s.is_empty()))
    .bind(query.search_pattern())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(exercises))
}
