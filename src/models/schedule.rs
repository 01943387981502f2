use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::custom_workout::CustomWorkout;
use super::workout::Workout;
use super::workout_type::WorkoutType;

/// Row shape of `scheduled_workouts`.
///
/// `completed` is true exactly when `workout_id` is set; the table carries a
/// CHECK constraint for it and every writer updates both columns together.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledWorkout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    pub workout_type_id: Option<Uuid>,
    pub custom_workout_id: Option<Uuid>,
    pub workout_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledWorkout {
    pub fn reference(&self) -> Option<WorkoutReference> {
        WorkoutReference::from_columns(self.workout_type_id, self.custom_workout_id)
    }
}

/// What a scheduled workout points at: a shared template or one of the
/// user's own plans, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutReference {
    Template(Uuid),
    Plan(Uuid),
}

impl WorkoutReference {
    /// `None` unless exactly one column is populated.
    pub fn from_columns(workout_type_id: Option<Uuid>, custom_workout_id: Option<Uuid>) -> Option<Self> {
        match (workout_type_id, custom_workout_id) {
            (Some(id), None) => Some(Self::Template(id)),
            (None, Some(id)) => Some(Self::Plan(id)),
            _ => None,
        }
    }

    pub fn workout_type_id(&self) -> Option<Uuid> {
        match self {
            Self::Template(id) => Some(*id),
            Self::Plan(_) => None,
        }
    }

    pub fn custom_workout_id(&self) -> Option<Uuid> {
        match self {
            Self::Template(_) => None,
            Self::Plan(id) => Some(*id),
        }
    }
}

/// A workout reference with the referenced record loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedWorkout {
    Template(WorkoutType),
    Plan(CustomWorkout),
}

impl ResolvedWorkout {
    pub fn name(&self) -> &str {
        match self {
            Self::Template(t) => &t.name,
            Self::Plan(p) => &p.name,
        }
    }
}

/// Scheduled workout as seen by the completion synchronizer.
///
/// `workout` is `None` when the stored reference could not be resolved,
/// which only happens with corrupted data.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub completed: bool,
    pub notes: Option<String>,
    pub workout: Option<ResolvedWorkout>,
    pub workout_id: Option<Uuid>,
}

impl ScheduleEntry {
    pub fn new(row: &ScheduledWorkout, workout: Option<ResolvedWorkout>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            scheduled_date: row.scheduled_date,
            completed: row.completed,
            notes: row.notes.clone(),
            workout,
            workout_id: row.workout_id,
        }
    }
}

/// Response shape: the entry with its template, plan and log embedded.
/// Camel case like the schedule request bodies; embedded records keep the
/// shape their own endpoints return.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledWorkoutDetail {
    #[serde(flatten)]
    pub entry: ScheduledWorkout,
    pub workout_type: Option<WorkoutType>,
    pub custom_workout: Option<CustomWorkout>,
    pub workout: Option<Workout>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ScheduleQuery {
    /// The range only applies when both bounds are present.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start_date?, self.end_date?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_from_template_column() {
        let id = Uuid::new_v4();
        assert_eq!(
            WorkoutReference::from_columns(Some(id), None),
            Some(WorkoutReference::Template(id))
        );
    }

    #[test]
    fn test_reference_from_plan_column() {
        let id = Uuid::new_v4();
        assert_eq!(
            WorkoutReference::from_columns(None, Some(id)),
            Some(WorkoutReference::Plan(id))
        );
    }

    #[test]
    fn test_reference_rejects_none_and_both() {
        assert_eq!(WorkoutReference::from_columns(None, None), None);
        assert_eq!(
            WorkoutReference::from_columns(Some(Uuid::new_v4()), Some(Uuid::new_v4())),
            None
        );
    }

    #[test]
    fn test_reference_column_accessors() {
        let id = Uuid::new_v4();
        let template = WorkoutReference::Template(id);
        assert_eq!(template.workout_type_id(), Some(id));
        assert_eq!(template.custom_workout_id(), None);

        let plan = WorkoutReference::Plan(id);
        assert_eq!(plan.workout_type_id(), None);
        assert_eq!(plan.custom_workout_id(), Some(id));
    }

    #[test]
    fn test_schedule_query_range_requires_both_bounds() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();

        let both = ScheduleQuery { start_date: Some(start), end_date: Some(end) };
        assert_eq!(both.range(), Some((start, end)));

        let only_start = ScheduleQuery { start_date: Some(start), end_date: None };
        assert_eq!(only_start.range(), None);
    }

    #[test]
    fn test_scheduled_workout_serializes_camel_case() {
        let now = Utc::now();
        let row = ScheduledWorkout {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            scheduled_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            completed: false,
            notes: None,
            workout_type_id: Some(Uuid::new_v4()),
            custom_workout_id: None,
            workout_id: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["scheduledDate"], "2025-01-10");
        assert!(json.get("workoutTypeId").is_some());
        assert!(json.get("scheduled_date").is_none());
    }

    #[test]
    fn test_schedule_query_deserializes_camel_case() {
        let q: ScheduleQuery =
            serde_json::from_str(r#"{"startDate":"2025-01-01","endDate":"2025-01-31"}"#).unwrap();
        assert_eq!(q.start_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(q.end_date, NaiveDate::from_ymd_opt(2025, 1, 31));
    }
}
