use std::collections::HashMap;

use serde::Serialize;

use crate::models::workout::Workout;

const TOP_EXERCISE_COUNT: usize = 5;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExerciseStats {
    pub exercise: String,
    pub count: i64,
    pub duration: i64,
    pub calories: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WorkoutStats {
    pub total_workouts: i64,
    pub total_duration: i64,
    pub total_calories: i64,
    pub avg_duration: i64,
    pub avg_calories: i64,
    /// One row per activity name, in order of first appearance.
    pub by_exercise: Vec<ExerciseStats>,
    pub top_exercises: Vec<ExerciseStats>,
}

pub fn summarize(workouts: &[Workout]) -> WorkoutStats {
    let total_workouts = workouts.len() as i64;
    let total_duration: i64 = workouts.iter().map(|w| i64::from(w.duration)).sum();
    let total_calories: i64 = workouts.iter().map(|w| i64::from(w.calories)).sum();

    let mut by_exercise: Vec<ExerciseStats> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for w in workouts {
        let slot = *index.entry(w.exercise.as_str()).or_insert_with(|| {
            by_exercise.push(ExerciseStats {
                exercise: w.exercise.clone(),
                count: 0,
                duration: 0,
                calories: 0,
            });
            by_exercise.len() - 1
        });
        let stats = &mut by_exercise[slot];
        stats.count += 1;
        stats.duration += i64::from(w.duration);
        stats.calories += i64::from(w.calories);
    }

    // Stable sort: ties keep first-appearance order.
    let mut top_exercises = by_exercise.clone();
    top_exercises.sort_by(|a, b| b.count.cmp(&a.count));
    top_exercises.truncate(TOP_EXERCISE_COUNT);

    WorkoutStats {
        total_workouts,
        total_duration,
        total_calories,
        avg_duration: rounded_mean(total_duration, total_workouts),
        avg_calories: rounded_mean(total_calories, total_workouts),
        by_exercise,
        top_exercises,
    }
}

/// Mean rounded half up; 0 for an empty set.
fn rounded_mean(total: i64, count: i64) -> i64 {
    if count == 0 {
        return 0;
    }
    (2 * total + count).div_euclid(2 * count)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;

    fn workout(exercise: &str, duration: i32, calories: i32) -> Workout {
        Workout {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            exercise: exercise.into(),
            duration,
            calories,
            notes: None,
            date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_log_has_zero_averages() {
        let stats = summarize(&[]);
        assert_eq!(stats.total_workouts, 0);
        assert_eq!(stats.avg_duration, 0);
        assert_eq!(stats.avg_calories, 0);
        assert!(stats.by_exercise.is_empty());
        assert!(stats.top_exercises.is_empty());
    }

    #[test]
    fn test_totals_and_rounded_averages() {
        let stats = summarize(&[
            workout("Running", 30, 300),
            workout("Yoga", 45, 150),
            workout("Running", 20, 201),
        ]);
        assert_eq!(stats.total_workouts, 3);
        assert_eq!(stats.total_duration, 95);
        assert_eq!(stats.total_calories, 651);
        // 95 / 3 = 31.67, 651 / 3 = 217
        assert_eq!(stats.avg_duration, 32);
        assert_eq!(stats.avg_calories, 217);
    }

    #[test]
    fn test_half_rounds_up() {
        let stats = summarize(&[workout("Running", 30, 100), workout("Running", 31, 101)]);
        assert_eq!(stats.avg_duration, 31); // 30.5
        assert_eq!(stats.avg_calories, 101); // 100.5
    }

    #[test]
    fn test_groups_by_exercise_in_first_seen_order() {
        let stats = summarize(&[
            workout("Yoga", 45, 150),
            workout("Running", 30, 300),
            workout("Yoga", 30, 100),
        ]);
        assert_eq!(
            stats.by_exercise,
            vec![
                ExerciseStats { exercise: "Yoga".into(), count: 2, duration: 75, calories: 250 },
                ExerciseStats { exercise: "Running".into(), count: 1, duration: 30, calories: 300 },
            ]
        );
    }

    #[test]
    fn test_top_exercises_limited_and_sorted_by_count() {
        let mut log = Vec::new();
        for (name, times) in [("A", 1), ("B", 3), ("C", 2), ("D", 1), ("E", 4), ("F", 2)] {
            for _ in 0..times {
                log.push(workout(name, 10, 10));
            }
        }
        let stats = summarize(&log);
        let names: Vec<&str> = stats.top_exercises.iter().map(|s| s.exercise.as_str()).collect();
        assert_eq!(names, vec!["E", "B", "C", "F", "A"]);
        assert_eq!(stats.by_exercise.len(), 6);
    }
}
