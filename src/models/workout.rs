use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::exercise::ExerciseRef;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub workout_type: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub status: String,
    pub rating: Option<i32>,
    pub perceived_effort: Option<i32>,
    pub comments: Option<String>,
    pub tags: Vec<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line item joined with its exercise, as read from storage.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct WorkoutExerciseRow {
    pub id: i64,
    pub exercise_id: Uuid,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<i32>,
    pub rest_time_seconds: i32,
    pub order_index: i32,
    pub notes: Option<String>,
    pub completed_sets: Option<i32>,
    pub completed_reps: Option<i32>,
    pub completed_weights: Option<Vec<f64>>,
    pub rir: Option<i32>,
    pub exercise_name: String,
    pub exercise_category: String,
    pub exercise_muscle_group: Option<String>,
}

/// Response shape for a line item: exercise fields nested under `exercise`.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseDetail {
    pub id: i64,
    pub exercise_id: Uuid,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<i32>,
    pub rest_time_seconds: i32,
    pub order_index: i32,
    pub notes: Option<String>,
    pub completed_sets: Option<i32>,
    pub completed_reps: Option<i32>,
    pub completed_weights: Option<Vec<f64>>,
    pub rir: Option<i32>,
    pub exercise: ExerciseRef,
}

impl From<WorkoutExerciseRow> for WorkoutExerciseDetail {
    fn from(row: WorkoutExerciseRow) -> Self {
        WorkoutExerciseDetail {
            id: row.id,
            exercise_id: row.exercise_id,
            sets: row.sets,
            reps: row.reps,
            weight: row.weight,
            distance_km: row.distance_km,
            duration_minutes: row.duration_minutes,
            rest_time_seconds: row.rest_time_seconds,
            order_index: row.order_index,
            notes: row.notes,
            completed_sets: row.completed_sets,
            completed_reps: row.completed_reps,
            completed_weights: row.completed_weights,
            rir: row.rir,
            exercise: ExerciseRef {
                id: row.exercise_id,
                name: row.exercise_name,
                category: row.exercise_category,
                muscle_group: row.exercise_muscle_group,
            },
        }
    }
}

#[derive(Serialize, Debug)]
pub struct WorkoutDetail {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercises: Vec<WorkoutExerciseDetail>,
}

/// Abbreviated line item embedded in list results.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseSummary {
    #[serde(skip_serializing)]
    pub workout_id: Uuid,
    pub id: i64,
    pub exercise_id: Uuid,
    pub exercise_name: String,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercises_summary: Vec<WorkoutExerciseSummary>,
}

/// Storage shape for a new workout, already translated from the request DTO.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub workout_type: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub tags: Vec<String>,
}

/// Storage shape for a new line item. `order_index` is `None` when the
/// client did not supply one; the repository fills in the input position.
#[derive(Debug, Clone)]
pub struct NewWorkoutExercise {
    pub exercise_id: Uuid,
    pub sets: i32,
    pub reps: i32,
    pub weight: Option<f64>,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<i32>,
    pub rest_time_seconds: i32,
    pub order_index: Option<i32>,
    pub notes: Option<String>,
}

/// The allow-list of patchable workout columns. Anything not representable
/// here cannot reach an UPDATE statement.
#[derive(Debug, Clone, Default)]
pub struct WorkoutPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub workout_type: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub status: Option<String>,
    pub comments: Option<String>,
    pub rating: Option<i32>,
    pub perceived_effort: Option<i32>,
    pub completed_at: Option<DateTime<Utc>>,
    pub tags: Option<Vec<String>>,
}

/// Post-completion actuals for one line item.
#[derive(Debug, Clone, Default)]
pub struct ExerciseCompletion {
    pub completed_sets: Option<i32>,
    pub completed_reps: Option<i32>,
    pub completed_weights: Option<Vec<f64>>,
    pub rir: Option<i32>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseRequest {
    pub exercise_id: Uuid,

    #[validate(range(min = 1, message = "Sets must be at least 1"))]
    pub sets: Option<i32>,

    #[validate(range(min = 1, message = "Reps must be at least 1"))]
    pub reps: Option<i32>,

    #[validate(range(min = 0.0, message = "Weight cannot be negative"))]
    pub weight: Option<f64>,

    #[validate(range(min = 0.0, message = "Distance cannot be negative"))]
    pub distance_km: Option<f64>,

    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: Option<i32>,

    #[validate(range(min = 0, message = "Rest time cannot be negative"))]
    pub rest_time_seconds: Option<i32>,

    pub order_index: Option<i32>,

    #[validate(length(max = 200, message = "Notes cannot exceed 200 characters"))]
    pub notes: Option<String>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutRequest {
    #[validate(length(min = 3, max = 100, message = "Name must be between 3 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,

    pub workout_type: Option<String>,

    pub scheduled_date: NaiveDate,

    pub scheduled_time: Option<String>,

    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: Option<i32>,

    pub tags: Option<Vec<String>>,

    #[validate]
    pub exercises: Option<Vec<WorkoutExerciseRequest>>,
}

#[derive(Deserialize, Validate, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkoutRequest {
    #[validate(length(min = 3, max = 100, message = "Name must be between 3 and 100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,

    pub workout_type: Option<String>,

    pub scheduled_date: Option<NaiveDate>,

    pub scheduled_time: Option<String>,

    #[validate(range(min = 1, message = "Duration must be at least 1 minute"))]
    pub duration_minutes: Option<i32>,

    pub status: Option<String>,

    #[validate(length(max = 500, message = "Comments cannot exceed 500 characters"))]
    pub comments: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,

    #[validate(range(min = 1, max = 10, message = "Perceived effort must be between 1 and 10"))]
    pub perceived_effort: Option<i32>,

    pub tags: Option<Vec<String>>,

    #[validate]
    pub exercises: Option<Vec<WorkoutExerciseRequest>>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseCompletionRequest {
    pub workout_exercise_id: i64,

    #[validate(range(min = 0, message = "Completed sets cannot be negative"))]
    pub completed_sets: Option<i32>,

    #[validate(range(min = 0, message = "Completed reps cannot be negative"))]
    pub completed_reps: Option<i32>,

    pub completed_weights: Option<Vec<f64>>,

    #[validate(range(min = 0, max = 10, message = "RIR must be between 0 and 10"))]
    pub rir: Option<i32>,
}

#[derive(Deserialize, Validate, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompleteWorkoutRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,

    #[validate(range(min = 1, max = 10, message = "Perceived effort must be between 1 and 10"))]
    pub perceived_effort: Option<i32>,

    #[validate(length(max = 500, message = "Comments cannot exceed 500 characters"))]
    pub comments: Option<String>,

    #[validate]
    pub exercises: Option<Vec<ExerciseCompletionRequest>>,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutStats {
    pub total_workouts: i64,
    pub completed_workouts: i64,
    pub scheduled_workouts: i64,
    pub average_rating: Option<f64>,
    pub total_minutes: Option<i64>,
    pub first_workout_date: Option<NaiveDate>,
    pub last_workout_date: Option<NaiveDate>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Pagination {
            page,
            limit,
            total,
            total_pages,
            has_next: page * limit < total,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_first_page() {
        let p = Pagination::new(1, 20, 45);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn pagination_last_page() {
        let p = Pagination::new(3, 20, 45);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn pagination_exact_boundary() {
        // 40 rows at 20 per page: page 2 is the last page
        let p = Pagination::new(2, 20, 40);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn pagination_empty_result() {
        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn create_request_parses_camel_case_and_drops_unknown_fields() {
        let body = serde_json::json!({
            "name": "Leg Day",
            "workoutType": "strength",
            "scheduledDate": "2026-09-07",
            "scheduledTime": "07:30",
            "somethingElse": "ignored",
            "exercises": [
                {"exerciseId": "7f2c1d9e-5a3b-4c6d-8e9f-0a1b2c3d4e5f", "sets": 4, "reps": 8, "weight": 100.0}
            ]
        });
        let req: CreateWorkoutRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.name, "Leg Day");
        assert_eq!(req.scheduled_time.as_deref(), Some("07:30"));
        let lines = req.exercises.unwrap();
        assert_eq!(lines[0].sets, Some(4));
        assert_eq!(lines[0].weight, Some(100.0));
        assert!(lines[0].order_index.is_none());
    }

    #[test]
    fn create_request_rejects_short_name() {
        let req: CreateWorkoutRequest = serde_json::from_value(serde_json::json!({
            "name": "ab",
            "scheduledDate": "2026-09-07"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn nested_line_validation_runs() {
        let req: CreateWorkoutRequest = serde_json::from_value(serde_json::json!({
            "name": "Leg Day",
            "scheduledDate": "2026-09-07",
            "exercises": [
                {"exerciseId": "7f2c1d9e-5a3b-4c6d-8e9f-0a1b2c3d4e5f", "sets": 0}
            ]
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_has_no_completed_at_path() {
        // completed_at is only ever set by the completion flow; a client
        // sending it through update must see it dropped
        let req: UpdateWorkoutRequest = serde_json::from_value(serde_json::json!({
            "status": "completed",
            "completedAt": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(req.status.as_deref(), Some("completed"));
    }

    #[test]
    fn line_detail_nests_exercise_ref() {
        let row = WorkoutExerciseRow {
            id: 1,
            exercise_id: Uuid::new_v4(),
            sets: 4,
            reps: 8,
            weight: Some(100.0),
            distance_km: None,
            duration_minutes: None,
            rest_time_seconds: 60,
            order_index: 0,
            notes: None,
            completed_sets: None,
            completed_reps: None,
            completed_weights: None,
            rir: None,
            exercise_name: "Bench Press".to_string(),
            exercise_category: "strength".to_string(),
            exercise_muscle_group: Some("chest".to_string()),
        };
        let detail: WorkoutExerciseDetail = row.into();
        assert_eq!(detail.exercise.name, "Bench Press");
        assert_eq!(detail.exercise.id, detail.exercise_id);

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["exercise"]["muscleGroup"], "chest");
        assert_eq!(json["restTimeSeconds"], 60);
    }
}
