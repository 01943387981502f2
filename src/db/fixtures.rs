//! Row builders for tests that run against a migrated database.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::schedule::{ResolvedWorkout, ScheduleEntry, ScheduledWorkout};
use crate::models::workout_type::WorkoutType;

pub async fn insert_user(db: &PgPool, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, 'x')")
        .bind(id)
        .bind(username)
        .bind(format!("{}@example.com", username))
        .execute(db)
        .await
        .unwrap();
    id
}

pub async fn seeded_template(db: &PgPool, name: &str) -> WorkoutType {
    sqlx::query_as::<_, WorkoutType>("SELECT * FROM workout_types WHERE name = $1")
        .bind(name)
        .fetch_one(db)
        .await
        .unwrap()
}

pub async fn insert_template_entry(
    db: &PgPool,
    user_id: Uuid,
    template: &WorkoutType,
    scheduled_date: NaiveDate,
) -> ScheduledWorkout {
    sqlx::query_as::<_, ScheduledWorkout>(
        r#"
        INSERT INTO scheduled_workouts (id, user_id, scheduled_date, workout_type_id)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(scheduled_date)
    .bind(template.id)
    .fetch_one(db)
    .await
    .unwrap()
}

pub async fn fetch_entry(db: &PgPool, id: Uuid) -> ScheduledWorkout {
    sqlx::query_as::<_, ScheduledWorkout>("SELECT * FROM scheduled_workouts WHERE id = $1")
        .bind(id)
        .fetch_one(db)
        .await
        .unwrap()
}

/// Current stored state of `row` as the synchronizer sees it.
pub async fn load_entry(db: &PgPool, row: &ScheduledWorkout, template: &WorkoutType) -> ScheduleEntry {
    let row = fetch_entry(db, row.id).await;
    ScheduleEntry::new(&row, Some(ResolvedWorkout::Template(template.clone())))
}

pub async fn workout_count(db: &PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM workouts WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(db)
        .await
        .unwrap()
}
