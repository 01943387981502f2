use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::schedule::ScheduleEntry;
use crate::models::workout::{NewWorkout, Workout};
use crate::services::completion_sync::{CompletionStore, SyncError};

/// Postgres-backed [`CompletionStore`]. Each transition runs in its own
/// transaction and the `scheduled_workouts` update doubles as the
/// compare-and-swap on the entry's completion state.
pub struct PgCompletionStore<'a> {
    db: &'a PgPool,
}

impl<'a> PgCompletionStore<'a> {
    pub fn new(db: &'a PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CompletionStore for PgCompletionStore<'_> {
    async fn record_completion(&self, entry: &ScheduleEntry, log: NewWorkout) -> Result<Workout, SyncError> {
        let mut tx = self.db.begin().await?;

        let workout = sqlx::query_as::<_, Workout>(
            r#"
            INSERT INTO workouts (id, user_id, exercise, duration, calories, notes, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(log.user_id)
        .bind(&log.exercise)
        .bind(log.duration)
        .bind(log.calories)
        .bind(&log.notes)
        .bind(log.date)
        .fetch_one(&mut *tx)
        .await?;

        let linked = sqlx::query(
            r#"
            UPDATE scheduled_workouts
            SET completed = true, workout_id = $2, updated_at = NOW()
            WHERE id = $1 AND completed = false
            "#,
        )
        .bind(entry.id)
        .bind(workout.id)
        .execute(&mut *tx)
        .await?;

        if linked.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(SyncError::ConcurrencyConflict(entry.id));
        }

        tx.commit().await?;
        Ok(workout)
    }

    async fn revert_completion(&self, entry: &ScheduleEntry) -> Result<(), SyncError> {
        let mut tx = self.db.begin().await?;

        // Unlink before deleting: the log row is still referenced until then.
        let unlinked = sqlx::query(
            r#"
            UPDATE scheduled_workouts
            SET completed = false, workout_id = NULL, updated_at = NOW()
            WHERE id = $1 AND completed = true AND workout_id IS NOT DISTINCT FROM $2
            "#,
        )
        .bind(entry.id)
        .bind(entry.workout_id)
        .execute(&mut *tx)
        .await?;

        if unlinked.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(SyncError::ConcurrencyConflict(entry.id));
        }

        if let Some(workout_id) = entry.workout_id {
            sqlx::query("DELETE FROM workouts WHERE id = $1")
                .bind(workout_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
