use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::workout::{
    ExerciseCompletion, NewWorkout, NewWorkoutExercise, Pagination, Workout, WorkoutDetail,
    WorkoutExerciseDetail, WorkoutExerciseRow, WorkoutExerciseSummary, WorkoutPatch, WorkoutStats,
    WorkoutSummary,
};

// Line columns carry a prefix so they never collide with w.* in the joined
// detail projection.
const DETAIL_COLUMNS: &str = "w.*, \
     we.id AS line_id, we.exercise_id AS line_exercise_id, we.sets AS line_sets, \
     we.reps AS line_reps, we.weight AS line_weight, we.distance_km AS line_distance_km, \
     we.duration_minutes AS line_duration_minutes, we.rest_time_seconds AS line_rest_time_seconds, \
     we.order_index AS line_order_index, we.notes AS line_notes, \
     we.completed_sets AS line_completed_sets, we.completed_reps AS line_completed_reps, \
     we.completed_weights AS line_completed_weights, we.rir AS line_rir, \
     e.name AS exercise_name, e.category AS exercise_category, \
     e.muscle_group AS exercise_muscle_group";

/// Optional listing filters, AND-combined with the mandatory owner predicate.
#[derive(Debug, Default, Clone)]
pub struct WorkoutFilters {
    pub status: Option<String>,
    pub workout_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStats {
    pub workout_count: i64,
    pub total_sets: Option<i64>,
    pub total_reps: Option<i64>,
    pub average_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

fn push_filters(qb: &mut QueryBuilder<Postgres>, user_id: Uuid, filters: &WorkoutFilters) {
    qb.push(" WHERE w.user_id = ").push_bind(user_id);

    if let Some(status) = &filters.status {
        qb.push(" AND w.status = ").push_bind(status.clone());
    }
    if let Some(workout_type) = &filters.workout_type {
        qb.push(" AND w.workout_type = ").push_bind(workout_type.clone());
    }
    if let Some(start_date) = filters.start_date {
        qb.push(" AND w.scheduled_date >= ").push_bind(start_date);
    }
    if let Some(end_date) = filters.end_date {
        qb.push(" AND w.scheduled_date <= ").push_bind(end_date);
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (w.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR w.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn effective_order_index(line: &NewWorkoutExercise, position: usize) -> i32 {
    line.order_index.unwrap_or(position as i32)
}

/// Multi-row insert for a workout's line items. Input order becomes
/// `order_index` for lines that did not supply one.
fn push_line_inserts<'a>(
    qb: &mut QueryBuilder<'a, Postgres>,
    workout_id: Uuid,
    lines: &'a [NewWorkoutExercise],
) {
    qb.push(
        "INSERT INTO workout_exercises (workout_id, exercise_id, sets, reps, weight, \
         distance_km, duration_minutes, rest_time_seconds, order_index, notes) ",
    );
    qb.push_values(lines.iter().enumerate(), |mut b, (i, line)| {
        b.push_bind(workout_id)
            .push_bind(line.exercise_id)
            .push_bind(line.sets)
            .push_bind(line.reps)
            .push_bind(line.weight)
            .push_bind(line.distance_km)
            .push_bind(line.duration_minutes)
            .push_bind(line.rest_time_seconds)
            .push_bind(effective_order_index(line, i))
            .push_bind(line.notes.clone());
    });
}

fn push_patch(qb: &mut QueryBuilder<Postgres>, patch: &WorkoutPatch) {
    if let Some(name) = &patch.name {
        qb.push(", name = ").push_bind(name.clone());
    }
    if let Some(description) = &patch.description {
        qb.push(", description = ").push_bind(description.clone());
    }
    if let Some(workout_type) = &patch.workout_type {
        qb.push(", workout_type = ").push_bind(workout_type.clone());
    }
    if let Some(scheduled_date) = patch.scheduled_date {
        qb.push(", scheduled_date = ").push_bind(scheduled_date);
    }
    if let Some(scheduled_time) = patch.scheduled_time {
        qb.push(", scheduled_time = ").push_bind(scheduled_time);
    }
    if let Some(duration_minutes) = patch.duration_minutes {
        qb.push(", duration_minutes = ").push_bind(duration_minutes);
    }
    if let Some(status) = &patch.status {
        qb.push(", status = ").push_bind(status.clone());
    }
    if let Some(comments) = &patch.comments {
        qb.push(", comments = ").push_bind(comments.clone());
    }
    if let Some(rating) = patch.rating {
        qb.push(", rating = ").push_bind(rating);
    }
    if let Some(perceived_effort) = patch.perceived_effort {
        qb.push(", perceived_effort = ").push_bind(perceived_effort);
    }
    if let Some(completed_at) = patch.completed_at {
        qb.push(", completed_at = ").push_bind(completed_at);
    }
    if let Some(tags) = &patch.tags {
        qb.push(", tags = ").push_bind(tags.clone());
    }
}

/// Inserts the workout row and all its line items inside one transaction,
/// then re-reads the full projection. Any line failure (e.g. a referential
/// violation) rolls the whole write back.
pub async fn create_with_exercises(
    pool: &PgPool,
    workout: &NewWorkout,
    lines: &[NewWorkoutExercise],
) -> Result<WorkoutDetail, AppError> {
    let workout_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO workouts (id, user_id, name, description, workout_type, scheduled_date, \
         scheduled_time, duration_minutes, status, tags, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'scheduled', $9, NOW(), NOW())",
    )
    .bind(workout_id)
    .bind(workout.user_id)
    .bind(&workout.name)
    .bind(&workout.description)
    .bind(&workout.workout_type)
    .bind(workout.scheduled_date)
    .bind(workout.scheduled_time)
    .bind(workout.duration_minutes)
    .bind(&workout.tags)
    .execute(&mut *tx)
    .await?;

    if !lines.is_empty() {
        let mut qb = QueryBuilder::new("");
        push_line_inserts(&mut qb, workout_id, lines);
        qb.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    find_by_id_with_exercises(pool, workout_id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Workout vanished after create".to_string()))
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Workout>, AppError> {
    let workout = sqlx::query_as::<_, Workout>("SELECT * FROM workouts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(workout)
}

/// One row of the joined detail projection. Line columns are nullable: a
/// workout without lines still yields one row through the LEFT JOIN.
#[derive(sqlx::FromRow)]
struct WorkoutDetailRow {
    #[sqlx(flatten)]
    workout: Workout,
    line_id: Option<i64>,
    line_exercise_id: Option<Uuid>,
    line_sets: Option<i32>,
    line_reps: Option<i32>,
    line_weight: Option<f64>,
    line_distance_km: Option<f64>,
    line_duration_minutes: Option<i32>,
    line_rest_time_seconds: Option<i32>,
    line_order_index: Option<i32>,
    line_notes: Option<String>,
    line_completed_sets: Option<i32>,
    line_completed_reps: Option<i32>,
    line_completed_weights: Option<Vec<f64>>,
    line_rir: Option<i32>,
    exercise_name: Option<String>,
    exercise_category: Option<String>,
    exercise_muscle_group: Option<String>,
}

impl WorkoutDetailRow {
    fn into_parts(self) -> (Workout, Option<WorkoutExerciseRow>) {
        let line = match (self.line_id, self.line_exercise_id) {
            (Some(id), Some(exercise_id)) => Some(WorkoutExerciseRow {
                id,
                exercise_id,
                sets: self.line_sets.unwrap_or_default(),
                reps: self.line_reps.unwrap_or_default(),
                weight: self.line_weight,
                distance_km: self.line_distance_km,
                duration_minutes: self.line_duration_minutes,
                rest_time_seconds: self.line_rest_time_seconds.unwrap_or_default(),
                order_index: self.line_order_index.unwrap_or_default(),
                notes: self.line_notes,
                completed_sets: self.line_completed_sets,
                completed_reps: self.line_completed_reps,
                completed_weights: self.line_completed_weights,
                rir: self.line_rir,
                exercise_name: self.exercise_name.unwrap_or_default(),
                exercise_category: self.exercise_category.unwrap_or_default(),
                exercise_muscle_group: self.exercise_muscle_group,
            }),
            _ => None,
        };
        (self.workout, line)
    }
}

/// Folds the joined rows into one workout with its ordered lines. The
/// workout columns and the line set come out of the same statement, so a
/// concurrent line replacement can never pair stale workout columns with
/// the replacement lines.
fn group_detail_rows(rows: Vec<WorkoutDetailRow>) -> Option<WorkoutDetail> {
    let mut rows = rows.into_iter();
    let (workout, first_line) = rows.next()?.into_parts();
    let mut exercises: Vec<WorkoutExerciseDetail> =
        first_line.map(Into::into).into_iter().collect();
    for row in rows {
        if let (_, Some(line)) = row.into_parts() {
            exercises.push(line.into());
        }
    }
    Some(WorkoutDetail { workout, exercises })
}

/// Full projection in a single statement: the workout row joined to its line
/// items and their exercises, lines ordered by `order_index` with insertion
/// order as tiebreak.
pub async fn find_by_id_with_exercises(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<WorkoutDetail>, AppError> {
    let sql = format!(
        "SELECT {DETAIL_COLUMNS}
         FROM workouts w
         LEFT JOIN workout_exercises we ON we.workout_id = w.id
         LEFT JOIN exercises e ON we.exercise_id = e.id
         WHERE w.id = $1
         ORDER BY we.order_index, we.id"
    );
    let rows = sqlx::query_as::<_, WorkoutDetailRow>(&sql)
        .bind(id)
        .fetch_all(pool)
        .await?;

    Ok(group_detail_rows(rows))
}

/// Patches the changed workout columns; when `lines` is supplied (including
/// an empty list) the prior line set is deleted and the replacement inserted
/// in the same transaction. Full-replace semantics, never a merge.
pub async fn update_with_exercises(
    pool: &PgPool,
    id: Uuid,
    patch: &WorkoutPatch,
    lines: Option<&[NewWorkoutExercise]>,
) -> Result<Option<WorkoutDetail>, AppError> {
    let mut tx = pool.begin().await?;

    let mut qb = QueryBuilder::new("UPDATE workouts SET updated_at = NOW()");
    push_patch(&mut qb, patch);
    qb.push(" WHERE id = ").push_bind(id);
    qb.build().execute(&mut *tx).await?;

    if let Some(lines) = lines {
        sqlx::query("DELETE FROM workout_exercises WHERE workout_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if !lines.is_empty() {
            let mut qb = QueryBuilder::new("");
            push_line_inserts(&mut qb, id, lines);
            qb.build().execute(&mut *tx).await?;
        }
    }

    tx.commit().await?;

    find_by_id_with_exercises(pool, id).await
}

pub async fn update(pool: &PgPool, id: Uuid, patch: &WorkoutPatch) -> Result<(), AppError> {
    let mut qb = QueryBuilder::new("UPDATE workouts SET updated_at = NOW()");
    push_patch(&mut qb, patch);
    qb.push(" WHERE id = ").push_bind(id);
    qb.build().execute(pool).await?;
    Ok(())
}

/// Line rows go with the workout via ON DELETE CASCADE.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// One row of the joined page projection, line columns nullable through the
/// LEFT JOIN.
#[derive(sqlx::FromRow)]
struct WorkoutSummaryRow {
    #[sqlx(flatten)]
    workout: Workout,
    line_id: Option<i64>,
    line_exercise_id: Option<Uuid>,
    exercise_name: Option<String>,
    line_sets: Option<i32>,
    line_reps: Option<i32>,
    line_weight: Option<f64>,
}

/// Folds the joined page rows into per-workout summaries. Rows arrive
/// ordered by workout then line, so adjacent rows with the same workout id
/// belong to one summary.
fn group_summary_rows(rows: Vec<WorkoutSummaryRow>) -> Vec<WorkoutSummary> {
    let mut summaries: Vec<WorkoutSummary> = Vec::new();
    for row in rows {
        let line = match (row.line_id, row.line_exercise_id) {
            (Some(id), Some(exercise_id)) => Some(WorkoutExerciseSummary {
                workout_id: row.workout.id,
                id,
                exercise_id,
                exercise_name: row.exercise_name.unwrap_or_default(),
                sets: row.line_sets.unwrap_or_default(),
                reps: row.line_reps.unwrap_or_default(),
                weight: row.line_weight,
            }),
            _ => None,
        };
        match summaries.last_mut() {
            Some(last) if last.workout.id == row.workout.id => {
                last.exercises_summary.extend(line);
            }
            _ => summaries.push(WorkoutSummary {
                workout: row.workout,
                exercises_summary: line.into_iter().collect(),
            }),
        }
    }
    summaries
}

/// Two statements against the same predicate set: a COUNT for the pagination
/// metadata, and the page itself joined to its line summaries so each
/// workout and its lines come out of one snapshot. Newest scheduled first;
/// LIMIT/OFFSET apply to workouts, not joined rows, via the inner query.
pub async fn list_by_user(
    pool: &PgPool,
    user_id: Uuid,
    filters: &WorkoutFilters,
    page: i64,
    limit: i64,
) -> Result<(Vec<WorkoutSummary>, Pagination), AppError> {
    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM workouts w");
    push_filters(&mut count_qb, user_id, filters);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let offset = (page - 1) * limit;
    let mut qb = QueryBuilder::new(
        "SELECT w.*, we.id AS line_id, we.exercise_id AS line_exercise_id, \
         e.name AS exercise_name, we.sets AS line_sets, we.reps AS line_reps, \
         we.weight AS line_weight \
         FROM (SELECT w.* FROM workouts w",
    );
    push_filters(&mut qb, user_id, filters);
    qb.push(" ORDER BY w.scheduled_date DESC, w.scheduled_time DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset)
        .push(
            ") w \
             LEFT JOIN workout_exercises we ON we.workout_id = w.id \
             LEFT JOIN exercises e ON we.exercise_id = e.id \
             ORDER BY w.scheduled_date DESC, w.scheduled_time DESC, w.id, \
                      we.order_index, we.id",
        );
    let rows = qb
        .build_query_as::<WorkoutSummaryRow>()
        .fetch_all(pool)
        .await?;

    Ok((group_summary_rows(rows), Pagination::new(page, limit, total)))
}

pub async fn user_stats(pool: &PgPool, user_id: Uuid) -> Result<WorkoutStats, AppError> {
    let stats = sqlx::query_as::<_, WorkoutStats>(
        "SELECT
            COUNT(*)::int8 AS total_workouts,
            COUNT(CASE WHEN status = 'completed' THEN 1 END)::int8 AS completed_workouts,
            COUNT(CASE WHEN status = 'scheduled' THEN 1 END)::int8 AS scheduled_workouts,
            AVG(rating)::float8 AS average_rating,
            SUM(duration_minutes)::int8 AS total_minutes,
            MIN(scheduled_date) AS first_workout_date,
            MAX(scheduled_date) AS last_workout_date
         FROM workouts
         WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(stats)
}

pub async fn upcoming(pool: &PgPool, user_id: Uuid, days: i32) -> Result<Vec<Workout>, AppError> {
    let workouts = sqlx::query_as::<_, Workout>(
        "SELECT * FROM workouts
         WHERE user_id = $1
           AND status = 'scheduled'
           AND scheduled_date BETWEEN CURRENT_DATE AND CURRENT_DATE + ($2 * INTERVAL '1 day')
         ORDER BY scheduled_date, scheduled_time
         LIMIT 10",
    )
    .bind(user_id)
    .bind(days)
    .fetch_all(pool)
    .await?;
    Ok(workouts)
}

/// Writes the reported actuals onto one line row. Scoped to the workout so a
/// line id can never reach across an ownership check.
pub async fn update_exercise_completion(
    pool: &PgPool,
    workout_id: Uuid,
    line_id: i64,
    completion: &ExerciseCompletion,
) -> Result<(), AppError> {
    let mut qb = QueryBuilder::new("UPDATE workout_exercises SET ");
    if !push_completion(&mut qb, completion) {
        return Ok(());
    }
    qb.push(" WHERE id = ")
        .push_bind(line_id)
        .push(" AND workout_id = ")
        .push_bind(workout_id);
    qb.build().execute(pool).await?;
    Ok(())
}

fn push_completion(qb: &mut QueryBuilder<Postgres>, completion: &ExerciseCompletion) -> bool {
    let mut any = false;
    {
        let mut sep = qb.separated(", ");
        if let Some(completed_sets) = completion.completed_sets {
            sep.push("completed_sets = ").push_bind_unseparated(completed_sets);
            any = true;
        }
        if let Some(completed_reps) = completion.completed_reps {
            sep.push("completed_reps = ").push_bind_unseparated(completed_reps);
            any = true;
        }
        if let Some(completed_weights) = &completion.completed_weights {
            sep.push("completed_weights = ")
                .push_bind_unseparated(completed_weights.clone());
            any = true;
        }
        if let Some(rir) = completion.rir {
            sep.push("rir = ").push_bind_unseparated(rir);
            any = true;
        }
    }
    any
}

pub async fn exercise_stats(
    pool: &PgPool,
    user_id: Uuid,
    exercise_id: Uuid,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<ExerciseStats, AppError> {
    let stats = sqlx::query_as::<_, ExerciseStats>(
        "SELECT
            COUNT(DISTINCT w.id)::int8 AS workout_count,
            SUM(we.sets)::int8 AS total_sets,
            SUM(we.reps)::int8 AS total_reps,
            AVG(we.weight)::float8 AS average_weight,
            MAX(we.weight)::float8 AS max_weight,
            MIN(w.scheduled_date) AS first_date,
            MAX(w.scheduled_date) AS last_date
         FROM workouts w
         JOIN workout_exercises we ON w.id = we.workout_id
         WHERE w.user_id = $1
           AND we.exercise_id = $2
           AND w.status = 'completed'
           AND ($3::date IS NULL OR w.scheduled_date >= $3)
           AND ($4::date IS NULL OR w.scheduled_date <= $4)",
    )
    .bind(user_id)
    .bind(exercise_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_one(pool)
    .await?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn workout_row(name: &str) -> Workout {
        Workout {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: name.to_string(),
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

    fn detail_row(workout: &Workout, line_id: Option<i64>) -> WorkoutDetailRow {
        WorkoutDetailRow {
            workout: workout.clone(),
            line_id,
            line_exercise_id: line_id.map(|_| Uuid::new_v4()),
            line_sets: line_id.map(|_| 4),
            line_reps: line_id.map(|_| 8),
            line_weight: None,
            line_distance_km: None,
            line_duration_minutes: None,
            line_rest_time_seconds: line_id.map(|_| 60),
            line_order_index: line_id.map(|id| id as i32),
            line_notes: None,
            line_completed_sets: None,
            line_completed_reps: None,
            line_completed_weights: None,
            line_rir: None,
            exercise_name: line_id.map(|id| format!("Exercise {}", id)),
            exercise_category: line_id.map(|_| "strength".to_string()),
            exercise_muscle_group: None,
        }
    }

    #[test]
    fn no_detail_rows_reads_as_absent() {
        assert!(group_detail_rows(vec![]).is_none());
    }

    #[test]
    fn lineless_workout_groups_to_empty_line_set() {
        let w = workout_row("Rest Day Stretch");
        let detail = group_detail_rows(vec![detail_row(&w, None)]).unwrap();
        assert_eq!(detail.workout.id, w.id);
        assert!(detail.exercises.is_empty());
    }

    #[test]
    fn detail_rows_group_into_one_consistent_projection() {
        // workout columns and lines are carried on the same rows, so the
        // assembled projection can never mix two versions of the workout
        let w = workout_row("Leg Day");
        let rows = vec![detail_row(&w, Some(1)), detail_row(&w, Some(2))];
        let detail = group_detail_rows(rows).unwrap();
        assert_eq!(detail.workout.name, "Leg Day");
        assert_eq!(detail.exercises.len(), 2);
        assert_eq!(detail.exercises[0].exercise.name, "Exercise 1");
        assert_eq!(detail.exercises[1].order_index, 2);
    }

    fn summary_row(workout: &Workout, line_id: Option<i64>) -> WorkoutSummaryRow {
        WorkoutSummaryRow {
            workout: workout.clone(),
            line_id,
            line_exercise_id: line_id.map(|_| Uuid::new_v4()),
            exercise_name: line_id.map(|id| format!("Exercise {}", id)),
            line_sets: line_id.map(|_| 3),
            line_reps: line_id.map(|_| 10),
            line_weight: None,
        }
    }

    #[test]
    fn summary_rows_group_by_adjacent_workout() {
        let push_day = workout_row("Push");
        let pull_day = workout_row("Pull");
        let rows = vec![
            summary_row(&push_day, Some(1)),
            summary_row(&push_day, Some(2)),
            summary_row(&pull_day, None),
        ];
        let summaries = group_summary_rows(rows);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].exercises_summary.len(), 2);
        assert_eq!(summaries[0].exercises_summary[1].workout_id, push_day.id);
        assert!(summaries[1].exercises_summary.is_empty());
    }

    fn line(order_index: Option<i32>) -> NewWorkoutExercise {
        NewWorkoutExercise {
            exercise_id: Uuid::new_v4(),
            sets: 3,
            reps: 10,
            weight: None,
            distance_km: None,
            duration_minutes: None,
            rest_time_seconds: 60,
            order_index,
            notes: None,
        }
    }

    #[test]
    fn filters_always_scope_to_owner() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM workouts w");
        push_filters(&mut qb, Uuid::new_v4(), &WorkoutFilters::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM workouts w WHERE w.user_id = $1");
    }

    #[test]
    fn all_filters_and_combined_in_order() {
        let filters = WorkoutFilters {
            status: Some("completed".into()),
            workout_type: Some("strength".into()),
            start_date: Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
            end_date: Some(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
            search: Some("leg".into()),
        };
        let mut qb = QueryBuilder::new("SELECT w.* FROM workouts w");
        push_filters(&mut qb, Uuid::new_v4(), &filters);
        let sql = qb.sql();
        assert!(sql.contains("w.status = $2"));
        assert!(sql.contains("w.workout_type = $3"));
        assert!(sql.contains("w.scheduled_date >= $4"));
        assert!(sql.contains("w.scheduled_date <= $5"));
        assert!(sql.contains("(w.name ILIKE $6 OR w.description ILIKE $7)"));
    }

    #[test]
    fn patch_updates_only_present_columns() {
        let patch = WorkoutPatch {
            name: Some("Leg Day".into()),
            rating: Some(4),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("UPDATE workouts SET updated_at = NOW()");
        push_patch(&mut qb, &patch);
        let sql = qb.sql();
        assert!(sql.contains("name = $1"));
        assert!(sql.contains("rating = $2"));
        assert!(!sql.contains("status"));
        assert!(!sql.contains("description"));
    }

    #[test]
    fn empty_patch_still_touches_updated_at_only() {
        let mut qb = QueryBuilder::new("UPDATE workouts SET updated_at = NOW()");
        push_patch(&mut qb, &WorkoutPatch::default());
        assert_eq!(qb.sql(), "UPDATE workouts SET updated_at = NOW()");
    }

    #[test]
    fn order_index_defaults_to_input_position() {
        assert_eq!(effective_order_index(&line(None), 0), 0);
        assert_eq!(effective_order_index(&line(None), 2), 2);
        assert_eq!(effective_order_index(&line(Some(7)), 2), 7);
    }

    #[test]
    fn line_inserts_are_batched_into_one_statement() {
        let lines = vec![line(None), line(None), line(Some(5))];
        let mut qb = QueryBuilder::new("");
        push_line_inserts(&mut qb, Uuid::new_v4(), &lines);
        let sql = qb.sql();
        assert!(sql.starts_with("INSERT INTO workout_exercises"));
        // 10 columns x 3 rows
        assert!(sql.contains("$30"));
        assert!(!sql.contains("$31"));
    }

    #[test]
    fn completion_skips_absent_fields() {
        let completion = ExerciseCompletion {
            completed_sets: Some(4),
            rir: Some(2),
            ..Default::default()
        };
        let mut qb = QueryBuilder::new("UPDATE workout_exercises SET ");
        assert!(push_completion(&mut qb, &completion));
        let sql = qb.sql();
        assert!(sql.contains("completed_sets = $1"));
        assert!(sql.contains("rir = $2"));
        assert!(!sql.contains("completed_weights"));
    }

    #[test]
    fn empty_completion_builds_nothing() {
        let mut qb = QueryBuilder::new("UPDATE workout_exercises SET ");
        assert!(!push_completion(&mut qb, &ExerciseCompletion::default()));
    }
}
