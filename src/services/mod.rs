pub mod exercises;
pub mod workouts;
