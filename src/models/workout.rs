use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A completed activity: logged ad hoc, or derived from a completed
/// scheduled workout.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise: String,
    /// Minutes.
    pub duration: i32,
    /// Kilocalories.
    pub calories: i32,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub user_id: Uuid,
    pub exercise: String,
    pub duration: i32,
    pub calories: i32,
    pub notes: Option<String>,
    pub date: NaiveDate,
}

#[cfg(test)]
impl NewWorkout {
    pub fn into_workout(self, id: Uuid, now: DateTime<Utc>) -> Workout {
        Workout {
            id,
            user_id: self.user_id,
            exercise: self.exercise,
            duration: self.duration,
            calories: self.calories,
            notes: self.notes,
            date: self.date,
            created_at: now,
            updated_at: now,
        }
    }
}
