//! # FitTrack: Request/Response DTOs
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Response` → serialized to client JSON
//! - Field-level validation is expressed via `validator` derive macros;
//!   cross-field rules live in the `impl` blocks at the bottom.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::AppError;
use crate::models::schedule::WorkoutReference;

// ============================================================================
// Common
// ============================================================================

/// Standard success message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Blank optional text is stored as NULL.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Names are stored trimmed, so whitespace-only input counts as missing.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

// ============================================================================
// Auth
// ============================================================================

/// POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 254, message = "Email too long"))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
}

/// POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// POST /api/auth/refresh
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// ============================================================================
// Workout log
// ============================================================================

/// POST /api/workouts, PUT /api/workouts/:id
#[derive(Debug, Deserialize, Validate)]
pub struct WorkoutRequest {
    #[validate(length(min = 1, max = 200, message = "Exercise must be 1-200 characters"))]
    #[validate(custom = "not_blank")]
    pub exercise: String,

    #[validate(range(min = 1, max = 1440, message = "Duration must be 1-1440 minutes"))]
    pub duration: i32,

    #[validate(range(min = 1, max = 20000, message = "Calories must be 1-20000"))]
    pub calories: i32,

    #[validate(length(max = 2000, message = "Notes must be under 2000 characters"))]
    pub notes: Option<String>,

    pub date: NaiveDate,
}

// ============================================================================
// Custom workout plans
// ============================================================================

/// POST /api/custom-workouts
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomWorkoutRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    #[validate(custom = "not_blank")]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be under 2000 characters"))]
    pub description: Option<String>,

    /// Plan order is the order of this list.
    #[validate(length(min = 1, message = "At least one exercise is required"))]
    #[validate]
    pub exercises: Vec<PlanExerciseRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PlanExerciseRequest {
    /// Exercise library id.
    pub id: Uuid,

    #[validate(range(min = 1, max = 100))]
    pub sets: Option<i32>,

    #[validate(range(min = 1, max = 1000))]
    pub reps: Option<i32>,

    /// Minutes.
    #[validate(range(min = 1, max = 600))]
    pub duration: Option<i32>,

    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

// ============================================================================
// Schedule
// ============================================================================

/// POST /api/schedule
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub scheduled_date: NaiveDate,
    pub workout_type_id: Option<Uuid>,
    pub custom_workout_id: Option<Uuid>,

    #[validate(length(max = 2000, message = "Notes must be under 2000 characters"))]
    pub notes: Option<String>,
}

/// PATCH /api/schedule/:id
#[derive(Debug, Deserialize)]
pub struct UpdateCompletionRequest {
    pub completed: bool,
}

// ============================================================================
// Validation helpers
// ============================================================================

impl CreateScheduleRequest {
    /// Exactly one of `workoutTypeId` / `customWorkoutId` must be given.
    pub fn reference(&self) -> Result<WorkoutReference, AppError> {
        WorkoutReference::from_columns(self.workout_type_id, self.custom_workout_id).ok_or_else(|| {
            AppError::Validation("Exactly one of workoutTypeId or customWorkoutId is required".into())
        })
    }
}

impl CreateCustomWorkoutRequest {
    /// Distinct exercise ids referenced by the plan.
    pub fn exercise_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.exercises.iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── RegisterRequest ──────────────────────────────────────────────────

    #[test]
    fn test_register_valid() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"demo","email":"demo@fitness.com","password":"demo123"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_rejects_bad_email_and_short_password() {
        let req = RegisterRequest {
            username: "demo".into(),
            email: "not-an-email".into(),
            password: "123".into(),
        };
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    // ── WorkoutRequest ───────────────────────────────────────────────────

    #[test]
    fn test_workout_request_requires_positive_numbers() {
        let req: WorkoutRequest = serde_json::from_str(
            r#"{"exercise":"Running","duration":0,"calories":-5,"date":"2025-01-10"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("duration"));
        assert!(errors.field_errors().contains_key("calories"));
    }

    #[test]
    fn test_workout_request_rejects_blank_exercise() {
        let req: WorkoutRequest = serde_json::from_str(
            r#"{"exercise":"   ","duration":30,"calories":300,"date":"2025-01-10"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("exercise"));
    }

    #[test]
    fn test_workout_request_accepts_padded_exercise() {
        let req: WorkoutRequest = serde_json::from_str(
            r#"{"exercise":"  Running ","duration":30,"calories":300,"date":"2025-01-10"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_workout_request_missing_date_fails_to_parse() {
        let result = serde_json::from_str::<WorkoutRequest>(
            r#"{"exercise":"Running","duration":30,"calories":300}"#,
        );
        assert!(result.is_err());
    }

    // ── CreateCustomWorkoutRequest ───────────────────────────────────────

    #[test]
    fn test_custom_workout_requires_exercises() {
        let req: CreateCustomWorkoutRequest =
            serde_json::from_str(r#"{"name":"Push Day","exercises":[]}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_custom_workout_validates_nested_exercises() {
        let id = Uuid::new_v4();
        let req: CreateCustomWorkoutRequest = serde_json::from_str(&format!(
            r#"{{"name":"Push Day","exercises":[{{"id":"{}","sets":0}}]}}"#,
            id
        ))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_custom_workout_rejects_blank_name() {
        let req: CreateCustomWorkoutRequest = serde_json::from_str(&format!(
            r#"{{"name":"   ","exercises":[{{"id":"{}"}}]}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_exercise_ids_are_distinct() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let req = CreateCustomWorkoutRequest {
            name: "Circuit".into(),
            description: None,
            exercises: [a, b, a]
                .into_iter()
                .map(|id| PlanExerciseRequest {
                    id,
                    sets: Some(3),
                    reps: Some(10),
                    duration: None,
                    notes: None,
                })
                .collect(),
        };
        assert!(req.validate().is_ok());
        assert_eq!(req.exercise_ids().len(), 2);
    }

    // ── CreateScheduleRequest ────────────────────────────────────────────

    #[test]
    fn test_schedule_request_camel_case() {
        let id = Uuid::new_v4();
        let req: CreateScheduleRequest = serde_json::from_str(&format!(
            r#"{{"scheduledDate":"2025-01-10","workoutTypeId":"{}","notes":"Leg day"}}"#,
            id
        ))
        .unwrap();
        assert_eq!(req.scheduled_date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
        assert_eq!(req.reference().unwrap(), WorkoutReference::Template(id));
    }

    #[test]
    fn test_schedule_request_needs_exactly_one_reference() {
        let neither = CreateScheduleRequest {
            scheduled_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            workout_type_id: None,
            custom_workout_id: None,
            notes: None,
        };
        assert!(matches!(neither.reference(), Err(AppError::Validation(_))));

        let both = CreateScheduleRequest {
            workout_type_id: Some(Uuid::new_v4()),
            custom_workout_id: Some(Uuid::new_v4()),
            ..neither
        };
        assert!(matches!(both.reference(), Err(AppError::Validation(_))));
    }

    // ── helpers ──────────────────────────────────────────────────────────

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("Leg day".into())).as_deref(), Some("Leg day"));
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
