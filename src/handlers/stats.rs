use axum::{extract::State, Extension, Json};

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::workout::Workout;
use crate::services::stats::{self, WorkoutStats};
use crate::AppState;

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<WorkoutStats>> {
    let workouts = sqlx::query_as::<_, Workout>(
        "SELECT * FROM workouts WHERE user_id = $1 ORDER BY date DESC, created_at DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(stats::summarize(&workouts)))
}
