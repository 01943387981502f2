pub mod auth;
pub mod catalog;
pub mod custom_workouts;
pub mod health;
pub mod schedule;
pub mod stats;
pub mod workouts;
