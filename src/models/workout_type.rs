use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Shared, read-only workout template.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct WorkoutType {
    pub id: Uuid,
    pub name: String,
    pub default_duration: Option<i32>,
    pub default_calories: Option<i32>,
    pub created_at: DateTime<Utc>,
}
