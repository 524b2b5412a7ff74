use chrono::{NaiveDate, NaiveTime, Utc};
use lazy_static::lazy_static;
use moka::sync::Cache;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::workouts::{ExerciseStats, WorkoutFilters};
use crate::errors::AppError;
use crate::models::workout::{
    CompleteWorkoutRequest, CreateWorkoutRequest, ExerciseCompletion, NewWorkout,
    NewWorkoutExercise, Pagination, UpdateWorkoutRequest, Workout, WorkoutDetail,
    WorkoutExerciseRequest, WorkoutPatch, WorkoutStats, WorkoutSummary,
};
use crate::utils::validation::{
    validate_scheduled_time, validate_workout_status, validate_workout_type,
};

lazy_static! {
    // The catalog is immutable from this backend, so a confirmed id stays valid
    static ref EXERCISE_CACHE: Cache<Uuid, ()> = Cache::new(10_000);
}

/// Every referenced exercise must exist before a line item is persisted.
/// Fails naming the first missing id.
async fn ensure_exercises_exist(
    pool: &PgPool,
    lines: &[WorkoutExerciseRequest],
) -> Result<(), AppError> {
    for line in lines {
        if EXERCISE_CACHE.get(&line.exercise_id).is_some() {
            continue;
        }
        match db::exercises::find_by_id(pool, line.exercise_id).await? {
            Some(_) => EXERCISE_CACHE.insert(line.exercise_id, ()),
            None => {
                return Err(AppError::BadRequest(format!(
                    "Exercise with ID {} not found",
                    line.exercise_id
                )))
            }
        }
    }
    Ok(())
}

/// Existence is decided before ownership so a missing workout always reads
/// as "not found" and another user's id never leaks as "forbidden".
fn authorize_owned(workout: Option<Workout>, user_id: Uuid) -> Result<Workout, AppError> {
    let workout = workout.ok_or_else(|| AppError::NotFound("Workout not found".to_string()))?;

    if workout.user_id != user_id {
        return Err(AppError::Forbidden(
            "Unauthorized access to workout".to_string(),
        ));
    }
    Ok(workout)
}

async fn fetch_owned(pool: &PgPool, user_id: Uuid, workout_id: Uuid) -> Result<Workout, AppError> {
    authorize_owned(db::workouts::find_by_id(pool, workout_id).await?, user_id)
}

fn parse_scheduled_time(time: Option<&str>) -> Result<Option<NaiveTime>, AppError> {
    match time {
        None => Ok(None),
        Some(time) => {
            validate_scheduled_time(time)?;
            NaiveTime::parse_from_str(time, "%H:%M")
                .map(Some)
                .map_err(|_| AppError::BadRequest("Invalid scheduled time".to_string()))
        }
    }
}

fn to_new_line(req: WorkoutExerciseRequest) -> NewWorkoutExercise {
    NewWorkoutExercise {
        exercise_id: req.exercise_id,
        sets: req.sets.unwrap_or(3),
        reps: req.reps.unwrap_or(10),
        weight: req.weight,
        distance_km: req.distance_km,
        duration_minutes: req.duration_minutes,
        rest_time_seconds: req.rest_time_seconds.unwrap_or(60),
        order_index: req.order_index,
        notes: req.notes,
    }
}

/// Translates the update request into the patchable column set. The typed
/// struct is the allow-list: anything outside it never reaches an UPDATE.
/// `completed_at` has no request path; only the completion flow sets it.
fn build_patch(req: &UpdateWorkoutRequest) -> Result<WorkoutPatch, AppError> {
    if let Some(workout_type) = &req.workout_type {
        validate_workout_type(workout_type)?;
    }
    // Any allow-listed status value is accepted; transition legality is not
    // enforced, matching the update path's contract.
    if let Some(status) = &req.status {
        validate_workout_status(status)?;
    }

    Ok(WorkoutPatch {
        name: req.name.clone(),
        description: req.description.clone(),
        workout_type: req.workout_type.clone(),
        scheduled_date: req.scheduled_date,
        scheduled_time: parse_scheduled_time(req.scheduled_time.as_deref())?,
        duration_minutes: req.duration_minutes,
        status: req.status.clone(),
        comments: req.comments.clone(),
        rating: req.rating,
        perceived_effort: req.perceived_effort,
        completed_at: None,
        tags: req.tags.clone(),
    })
}

pub async fn create_workout(
    pool: &PgPool,
    user_id: Uuid,
    req: CreateWorkoutRequest,
) -> Result<WorkoutDetail, AppError> {
    let workout_type = req.workout_type.unwrap_or_else(|| "strength".to_string());
    validate_workout_type(&workout_type)?;

    let lines = req.exercises.unwrap_or_default();
    ensure_exercises_exist(pool, &lines).await?;

    let workout = NewWorkout {
        user_id,
        name: req.name,
        description: req.description,
        workout_type,
        scheduled_date: req.scheduled_date,
        scheduled_time: parse_scheduled_time(req.scheduled_time.as_deref())?,
        duration_minutes: req.duration_minutes,
        tags: req.tags.unwrap_or_default(),
    };
    let lines: Vec<NewWorkoutExercise> = lines.into_iter().map(to_new_line).collect();

    db::workouts::create_with_exercises(pool, &workout, &lines).await
}

pub async fn get_workout(
    pool: &PgPool,
    user_id: Uuid,
    workout_id: Uuid,
) -> Result<WorkoutDetail, AppError> {
    let (workout, exercises) =
        match db::workouts::find_by_id_with_exercises(pool, workout_id).await? {
            Some(WorkoutDetail { workout, exercises }) => (Some(workout), exercises),
            None => (None, Vec::new()),
        };
    let workout = authorize_owned(workout, user_id)?;
    Ok(WorkoutDetail { workout, exercises })
}

pub async fn list_workouts(
    pool: &PgPool,
    user_id: Uuid,
    filters: &WorkoutFilters,
    page: i64,
    limit: i64,
) -> Result<(Vec<WorkoutSummary>, Pagination), AppError> {
    if let Some(status) = &filters.status {
        validate_workout_status(status)?;
    }
    if let Some(workout_type) = &filters.workout_type {
        validate_workout_type(workout_type)?;
    }
    db::workouts::list_by_user(pool, user_id, filters, page, limit).await
}

pub async fn update_workout(
    pool: &PgPool,
    user_id: Uuid,
    workout_id: Uuid,
    req: UpdateWorkoutRequest,
) -> Result<WorkoutDetail, AppError> {
    fetch_owned(pool, user_id, workout_id).await?;

    if let Some(lines) = &req.exercises {
        ensure_exercises_exist(pool, lines).await?;
    }

    let patch = build_patch(&req)?;
    let lines: Option<Vec<NewWorkoutExercise>> = req
        .exercises
        .map(|lines| lines.into_iter().map(to_new_line).collect());

    db::workouts::update_with_exercises(pool, workout_id, &patch, lines.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))
}

pub async fn delete_workout(
    pool: &PgPool,
    user_id: Uuid,
    workout_id: Uuid,
) -> Result<(), AppError> {
    fetch_owned(pool, user_id, workout_id).await?;
    db::workouts::delete(pool, workout_id).await?;
    Ok(())
}

/// Marks the workout completed, stamps the completion time and writes any
/// reported per-line actuals.
pub async fn complete_workout(
    pool: &PgPool,
    user_id: Uuid,
    workout_id: Uuid,
    req: CompleteWorkoutRequest,
) -> Result<WorkoutDetail, AppError> {
    fetch_owned(pool, user_id, workout_id).await?;

    for line in req.exercises.unwrap_or_default() {
        let completion = ExerciseCompletion {
            completed_sets: line.completed_sets,
            completed_reps: line.completed_reps,
            completed_weights: line.completed_weights,
            rir: line.rir,
        };
        db::workouts::update_exercise_completion(
            pool,
            workout_id,
            line.workout_exercise_id,
            &completion,
        )
        .await?;
    }

    let patch = WorkoutPatch {
        status: Some("completed".to_string()),
        completed_at: Some(Utc::now()),
        comments: req.comments,
        rating: req.rating,
        perceived_effort: req.perceived_effort,
        ..Default::default()
    };
    db::workouts::update(pool, workout_id, &patch).await?;

    db::workouts::find_by_id_with_exercises(pool, workout_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))
}

pub async fn get_stats(pool: &PgPool, user_id: Uuid) -> Result<WorkoutStats, AppError> {
    db::workouts::user_stats(pool, user_id).await
}

pub async fn get_upcoming(
    pool: &PgPool,
    user_id: Uuid,
    days: i32,
) -> Result<Vec<Workout>, AppError> {
    db::workouts::upcoming(pool, user_id, days).await
}

pub async fn get_exercise_stats(
    pool: &PgPool,
    user_id: Uuid,
    exercise_id: Uuid,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<ExerciseStats, AppError> {
    db::workouts::exercise_stats(pool, user_id, exercise_id, start_date, end_date).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_defaults_applied() {
        let req = WorkoutExerciseRequest {
            exercise_id: Uuid::new_v4(),
            sets: None,
            reps: None,
            weight: None,
            distance_km: None,
            duration_minutes: None,
            rest_time_seconds: None,
            order_index: None,
            notes: None,
        };
        let line = to_new_line(req);
        assert_eq!(line.sets, 3);
        assert_eq!(line.reps, 10);
        assert_eq!(line.rest_time_seconds, 60);
        assert!(line.order_index.is_none());
    }

    #[test]
    fn explicit_line_values_kept() {
        let req = WorkoutExerciseRequest {
            exercise_id: Uuid::new_v4(),
            sets: Some(5),
            reps: Some(5),
            weight: Some(120.0),
            distance_km: None,
            duration_minutes: None,
            rest_time_seconds: Some(180),
            order_index: Some(2),
            notes: Some("top set".to_string()),
        };
        let line = to_new_line(req);
        assert_eq!(line.sets, 5);
        assert_eq!(line.rest_time_seconds, 180);
        assert_eq!(line.order_index, Some(2));
    }

    #[test]
    fn patch_never_carries_completed_at() {
        let req = UpdateWorkoutRequest {
            status: Some("completed".to_string()),
            rating: Some(5),
            ..Default::default()
        };
        let patch = build_patch(&req).unwrap();
        assert!(patch.completed_at.is_none());
        assert_eq!(patch.status.as_deref(), Some("completed"));
    }

    #[test]
    fn patch_accepts_any_allow_listed_status() {
        // no transition checks: completed -> scheduled is allowed
        let req = UpdateWorkoutRequest {
            status: Some("scheduled".to_string()),
            ..Default::default()
        };
        assert!(build_patch(&req).is_ok());

        let req = UpdateWorkoutRequest {
            status: Some("archived".to_string()),
            ..Default::default()
        };
        assert!(build_patch(&req).is_err());
    }

    #[test]
    fn patch_rejects_bad_workout_type() {
        let req = UpdateWorkoutRequest {
            workout_type: Some("crossfit".to_string()),
            ..Default::default()
        };
        assert!(build_patch(&req).is_err());
    }

    fn owned_workout(owner: Uuid) -> Workout {
        Workout {
            id: Uuid::new_v4(),
            user_id: owner,
            name: "Leg Day".to_string(),
            description: None,
            workout_type: "strength".to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 9, 7).unwrap(),
            scheduled_time: None,
            duration_minutes: None,
            status: "scheduled".to_string(),
            rating: None,
            perceived_effort: None,
            comments: None,
            tags: vec![],
            start_time: None,
            end_time: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_workout_reads_not_found_for_everyone() {
        let err = authorize_owned(None, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn other_owners_workout_reads_forbidden_never_not_found() {
        let workout = owned_workout(Uuid::new_v4());
        let err = authorize_owned(Some(workout), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn owner_passes_the_access_check() {
        let owner = Uuid::new_v4();
        let workout = owned_workout(owner);
        assert!(authorize_owned(Some(workout), owner).is_ok());
    }

    #[test]
    fn scheduled_time_parsing() {
        assert_eq!(
            parse_scheduled_time(Some("07:30")).unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0)
        );
        assert_eq!(parse_scheduled_time(None).unwrap(), None);
        assert!(parse_scheduled_time(Some("25:00")).is_err());
    }
}
