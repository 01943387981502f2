use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::exercise::Exercise;

/// User-authored workout plan. Its exercises live in `custom_workout_exercises`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CustomWorkout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PlanItemRow {
    pub id: Uuid,
    pub custom_workout_id: Uuid,
    pub exercise_id: Uuid,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration: Option<i32>,
    pub position: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanItem {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration: Option<i32>,
    pub position: i32,
    pub notes: Option<String>,
    pub exercise: Exercise,
}

impl PlanItem {
    pub fn from_row(row: PlanItemRow, exercise: Exercise) -> Self {
        Self {
            id: row.id,
            exercise_id: row.exercise_id,
            sets: row.sets,
            reps: row.reps,
            duration: row.duration,
            position: row.position,
            notes: row.notes,
            exercise,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomWorkoutWithExercises {
    #[serde(flatten)]
    pub workout: CustomWorkout,
    pub exercises: Vec<PlanItem>,
}
