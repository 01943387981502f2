pub mod custom_workout;
pub mod exercise;
pub mod schedule;
pub mod user;
pub mod workout;
pub mod workout_type;
