use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub primary_muscle_groups: Option<String>,
    pub equipment: Option<String>,
    pub difficulty: Option<String>,
    pub workout_goal: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExerciseQuery {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub equipment: Option<String>,
    pub search: Option<String>,
}

impl ExerciseQuery {
    /// `%term%` pattern for ILIKE, with LIKE metacharacters escaped.
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{}%", escaped))
    }
}
