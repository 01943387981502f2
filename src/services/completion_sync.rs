//! Keeps a scheduled workout and the workout log derived from it in step.
//!
//! A scheduled workout is complete exactly when it links to a logged
//! workout. Marking it complete writes the log and the link in one
//! transaction; marking it incomplete removes both the same way. The store
//! applies each transition only if the entry still looks the way the caller
//! saw it, so racing toggles cannot double-log or double-delete.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::schedule::{ResolvedWorkout, ScheduleEntry};
use crate::models::workout::{NewWorkout, Workout};

pub const FALLBACK_DURATION_MINUTES: i32 = 30;
pub const FALLBACK_CALORIES: i32 = 200;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Scheduled workout {0} has no resolvable workout reference")]
    DataIntegrity(Uuid),

    #[error("Scheduled workout {0} was modified concurrently")]
    ConcurrencyConflict(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Transactional writes behind a completion transition.
///
/// Both methods are all-or-nothing and conditional on the entry's stored
/// state still matching `entry`; a mismatch yields
/// [`SyncError::ConcurrencyConflict`] with nothing written.
#[async_trait]
pub trait CompletionStore: Send + Sync {
    /// Insert `log` and link it to `entry`, which must still be incomplete.
    async fn record_completion(&self, entry: &ScheduleEntry, log: NewWorkout) -> Result<Workout, SyncError>;

    /// Clear the completion of `entry` and delete its linked log, if any.
    /// The entry must still be complete and linked to `entry.workout_id`.
    async fn revert_completion(&self, entry: &ScheduleEntry) -> Result<(), SyncError>;
}

/// Move `entry` to the `completed` state, creating or deleting the derived
/// workout log as needed. Requests matching the current state are no-ops.
pub async fn set_completion<S>(store: &S, entry: ScheduleEntry, completed: bool) -> Result<ScheduleEntry, SyncError>
where
    S: CompletionStore + ?Sized,
{
    match (entry.completed, completed) {
        (false, true) => {
            let log = derive_log(&entry)?;
            let workout = store.record_completion(&entry, log).await?;
            tracing::info!(
                scheduled_workout_id = %entry.id,
                workout_id = %workout.id,
                "Scheduled workout completed"
            );
            Ok(ScheduleEntry {
                completed: true,
                workout_id: Some(workout.id),
                ..entry
            })
        }
        (true, false) => {
            if entry.workout_id.is_none() {
                tracing::warn!(
                    scheduled_workout_id = %entry.id,
                    "Completed scheduled workout has no linked workout; clearing flag only"
                );
            }
            store.revert_completion(&entry).await?;
            tracing::info!(
                scheduled_workout_id = %entry.id,
                workout_id = ?entry.workout_id,
                "Scheduled workout completion reverted"
            );
            Ok(ScheduleEntry {
                completed: false,
                workout_id: None,
                ..entry
            })
        }
        _ => Ok(entry),
    }
}

/// Build the log record for completing `entry`.
pub fn derive_log(entry: &ScheduleEntry) -> Result<NewWorkout, SyncError> {
    let workout = entry
        .workout
        .as_ref()
        .ok_or(SyncError::DataIntegrity(entry.id))?;

    let (duration, calories, default_note) = match workout {
        ResolvedWorkout::Template(t) => (
            t.default_duration.unwrap_or(FALLBACK_DURATION_MINUTES),
            t.default_calories.unwrap_or(FALLBACK_CALORIES),
            format!("Completed scheduled workout: {}", t.name),
        ),
        // Plans carry no aggregate duration or calorie figure.
        ResolvedWorkout::Plan(p) => (
            FALLBACK_DURATION_MINUTES,
            FALLBACK_CALORIES,
            format!("Completed custom workout: {}", p.name),
        ),
    };

    let notes = entry
        .notes
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .unwrap_or(default_note);

    Ok(NewWorkout {
        user_id: entry.user_id,
        exercise: workout.name().to_owned(),
        duration,
        calories,
        notes: Some(notes),
        date: entry.scheduled_date,
    })
}
