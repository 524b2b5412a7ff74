use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::workout::Workout;

const DURATION_EXPR: &str = "SUM(CASE \
     WHEN w.start_time IS NOT NULL AND w.end_time IS NOT NULL \
     THEN EXTRACT(EPOCH FROM (w.end_time - w.start_time)) / 60 \
     ELSE COALESCE(w.duration_minutes, 0) \
     END)::float8";

// Weight-less lines still contribute sets x reps; COALESCE to 1, never 0.
const VOLUME_EXPR: &str = "SUM(we.sets * we.reps * COALESCE(we.weight, 1))::float8";

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PeriodProgress {
    pub period: NaiveDate,
    pub workout_count: i64,
    pub completed_count: i64,
    pub average_rating: Option<f64>,
    pub total_duration: Option<f64>,
    pub unique_exercises: i64,
    pub total_volume: Option<f64>,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseProgress {
    pub exercise_id: Option<Uuid>,
    pub exercise_name: Option<String>,
    pub exercise_category: Option<String>,
    pub exercise_muscle_group: Option<String>,
    pub workout_count: i64,
    pub completed_count: i64,
    pub average_rating: Option<f64>,
    pub total_duration: Option<f64>,
    pub unique_exercises: i64,
    pub total_volume: Option<f64>,
}

/// The progress report changes row shape when grouped by exercise, so the
/// two variants serialize transparently as plain arrays.
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum ProgressReport {
    ByPeriod(Vec<PeriodProgress>),
    ByExercise(Vec<ExerciseProgress>),
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VolumeRow {
    pub exercise_name: String,
    pub category: String,
    pub muscle_group: Option<String>,
    pub workout_count: i64,
    pub total_sets: Option<i64>,
    pub total_reps: Option<i64>,
    pub average_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub total_volume: Option<f64>,
    pub days_performed: i64,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyRow {
    pub week: NaiveDate,
    pub days_trained: i64,
    pub workouts_completed: i64,
    pub total_minutes: Option<i64>,
    pub days_list: Option<String>,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StrengthProgressRow {
    pub scheduled_date: NaiveDate,
    pub weight: f64,
    pub sets: i32,
    pub reps: i32,
    pub completed_weights: Option<Vec<f64>>,
    pub completed_reps: Option<i32>,
    pub volume: f64,
    pub rating: Option<i32>,
    pub perceived_effort: Option<i32>,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BodyMetricRow {
    pub metric_date: NaiveDate,
    pub weight_kg: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass_kg: Option<f64>,
    pub resting_heart_rate: Option<i32>,
    pub sleep_hours: Option<f64>,
    pub stress_level: Option<i32>,
    pub notes: Option<String>,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GoalRow {
    pub id: Uuid,
    pub title: String,
    pub goal_type: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub status: String,
    pub target_date: Option<NaiveDate>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    #[serde(flatten)]
    pub goal: GoalRow,
    pub calculated_progress: f64,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_workouts: i64,
    pub completed_workouts: i64,
    pub scheduled_workouts: i64,
    pub unique_exercises: i64,
    pub average_rating: Option<f64>,
    pub total_minutes: Option<i64>,
    pub first_workout: Option<NaiveDate>,
    pub last_workout: Option<NaiveDate>,
    pub active_days: i64,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FrequentExercise {
    pub name: String,
    pub category: String,
    pub workout_count: i64,
    pub total_volume: Option<f64>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub stats: DashboardOverview,
    pub upcoming_workouts: Vec<Workout>,
    pub frequent_exercises: Vec<FrequentExercise>,
}

/// `current/target * 100`, missing current counts as no progress and a
/// missing or zero target as already met. Clamped to [0, 100].
pub fn goal_progress(current: Option<f64>, target: Option<f64>) -> f64 {
    let Some(current) = current else {
        return 0.0;
    };
    match target {
        None => 100.0,
        Some(target) if target == 0.0 => 100.0,
        Some(target) => (current / target * 100.0).clamp(0.0, 100.0),
    }
}

// Both groupings emit the same aggregate set and order by the group key
// descending; the exercise variant adds the joined exercise identity.
fn progress_by_exercise_sql() -> String {
    format!(
        "SELECT
            we.exercise_id,
            e.name AS exercise_name,
            e.category AS exercise_category,
            e.muscle_group AS exercise_muscle_group,
            COUNT(DISTINCT w.id)::int8 AS workout_count,
            COUNT(DISTINCT CASE WHEN w.status = 'completed' THEN w.id END)::int8 AS completed_count,
            AVG(w.rating)::float8 AS average_rating,
            {DURATION_EXPR} AS total_duration,
            COUNT(DISTINCT we.exercise_id)::int8 AS unique_exercises,
            {VOLUME_EXPR} AS total_volume
         FROM workouts w
         LEFT JOIN workout_exercises we ON w.id = we.workout_id
         LEFT JOIN exercises e ON we.exercise_id = e.id
         WHERE w.user_id = $1
           AND w.scheduled_date BETWEEN $2 AND $3
         GROUP BY we.exercise_id, e.name, e.category, e.muscle_group
         ORDER BY we.exercise_id DESC"
    )
}

fn progress_by_period_sql(unit: &str) -> String {
    format!(
        "SELECT
            DATE_TRUNC('{unit}', w.scheduled_date)::date AS period,
            COUNT(DISTINCT w.id)::int8 AS workout_count,
            COUNT(DISTINCT CASE WHEN w.status = 'completed' THEN w.id END)::int8 AS completed_count,
            AVG(w.rating)::float8 AS average_rating,
            {DURATION_EXPR} AS total_duration,
            COUNT(DISTINCT we.exercise_id)::int8 AS unique_exercises,
            {VOLUME_EXPR} AS total_volume
         FROM workouts w
         LEFT JOIN workout_exercises we ON w.id = we.workout_id
         WHERE w.user_id = $1
           AND w.scheduled_date BETWEEN $2 AND $3
         GROUP BY DATE_TRUNC('{unit}', w.scheduled_date)
         ORDER BY period DESC"
    )
}

pub async fn progress_report(
    pool: &PgPool,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    group_by: &str,
) -> Result<ProgressReport, AppError> {
    if group_by == "exercise" {
        let rows = sqlx::query_as::<_, ExerciseProgress>(&progress_by_exercise_sql())
            .bind(user_id)
            .bind(start_date)
            .bind(end_date)
            .fetch_all(pool)
            .await?;
        return Ok(ProgressReport::ByExercise(rows));
    }

    // group_by is allow-list validated upstream; never user text
    let unit = match group_by {
        "day" => "day",
        "month" => "month",
        _ => "week",
    };
    let rows = sqlx::query_as::<_, PeriodProgress>(&progress_by_period_sql(unit))
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(pool)
        .await?;
    Ok(ProgressReport::ByPeriod(rows))
}

/// Top 20 exercises by training volume over completed workouts.
pub async fn volume_report(
    pool: &PgPool,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<VolumeRow>, AppError> {
    let sql = format!(
        "SELECT
            e.name AS exercise_name,
            e.category,
            e.muscle_group,
            COUNT(DISTINCT w.id)::int8 AS workout_count,
            SUM(we.sets)::int8 AS total_sets,
            SUM(we.reps)::int8 AS total_reps,
            AVG(we.weight)::float8 AS average_weight,
            MAX(we.weight)::float8 AS max_weight,
            {VOLUME_EXPR} AS total_volume,
            COUNT(DISTINCT w.scheduled_date)::int8 AS days_performed
         FROM workouts w
         JOIN workout_exercises we ON w.id = we.workout_id
         JOIN exercises e ON we.exercise_id = e.id
         WHERE w.user_id = $1
           AND w.status = 'completed'
           AND w.scheduled_date BETWEEN $2 AND $3
         GROUP BY e.id, e.name, e.category, e.muscle_group
         ORDER BY total_volume DESC
         LIMIT 20"
    );
    let rows = sqlx::query_as::<_, VolumeRow>(&sql)
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Weekly training frequency: distinct days, completed workouts, minutes and
/// the weekday abbreviations trained (no duplicates, via DISTINCT).
pub async fn frequency_report(
    pool: &PgPool,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<FrequencyRow>, AppError> {
    let rows = sqlx::query_as::<_, FrequencyRow>(
        "SELECT
            DATE_TRUNC('week', w.scheduled_date)::date AS week,
            COUNT(DISTINCT w.scheduled_date)::int8 AS days_trained,
            COUNT(DISTINCT w.id)::int8 AS workouts_completed,
            SUM(w.duration_minutes)::int8 AS total_minutes,
            STRING_AGG(DISTINCT TO_CHAR(w.scheduled_date, 'Dy'), ', ') AS days_list
         FROM workouts w
         WHERE w.user_id = $1
           AND w.status = 'completed'
           AND w.scheduled_date BETWEEN $2 AND $3
         GROUP BY DATE_TRUNC('week', w.scheduled_date)
         ORDER BY week DESC",
    )
    .bind(user_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Date-ascending time series for plotting one lift's trend. Only lines with
/// a recorded weight qualify.
pub async fn strength_progress_report(
    pool: &PgPool,
    user_id: Uuid,
    exercise_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<StrengthProgressRow>, AppError> {
    let rows = sqlx::query_as::<_, StrengthProgressRow>(
        "SELECT
            w.scheduled_date,
            we.weight,
            we.sets,
            we.reps,
            we.completed_weights,
            we.completed_reps,
            (we.sets * we.reps * we.weight)::float8 AS volume,
            w.rating,
            w.perceived_effort
         FROM workouts w
         JOIN workout_exercises we ON w.id = we.workout_id
         WHERE w.user_id = $1
           AND we.exercise_id = $2
           AND w.status = 'completed'
           AND we.weight IS NOT NULL
           AND w.scheduled_date BETWEEN $3 AND $4
         ORDER BY w.scheduled_date",
    )
    .bind(user_id)
    .bind(exercise_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn body_metrics_report(
    pool: &PgPool,
    user_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<BodyMetricRow>, AppError> {
    let rows = sqlx::query_as::<_, BodyMetricRow>(
        "SELECT
            metric_date,
            weight_kg,
            body_fat_percentage,
            muscle_mass_kg,
            resting_heart_rate,
            sleep_hours,
            stress_level,
            notes
         FROM user_metrics
         WHERE user_id = $1
           AND metric_date BETWEEN $2 AND $3
         ORDER BY metric_date DESC",
    )
    .bind(user_id)
    .bind(start_date)
    .bind(end_date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn goal_progress_report(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<GoalProgress>, AppError> {
    let rows = sqlx::query_as::<_, GoalRow>(
        "SELECT id, title, goal_type, target_value, current_value, unit, status, target_date
         FROM user_goals
         WHERE user_id = $1
           AND status = 'active'
         ORDER BY target_date",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|goal| {
            let calculated_progress = goal_progress(goal.current_value, goal.target_value);
            GoalProgress {
                goal,
                calculated_progress,
            }
        })
        .collect())
}

/// Three independent read-only queries issued concurrently. No shared
/// transaction; each runs on its own pooled connection.
pub async fn dashboard_stats(pool: &PgPool, user_id: Uuid) -> Result<DashboardStats, AppError> {
    let stats_sql = "SELECT
            COUNT(DISTINCT w.id)::int8 AS total_workouts,
            COUNT(DISTINCT CASE WHEN w.status = 'completed' THEN w.id END)::int8 AS completed_workouts,
            COUNT(DISTINCT CASE WHEN w.status = 'scheduled' THEN w.id END)::int8 AS scheduled_workouts,
            COUNT(DISTINCT we.exercise_id)::int8 AS unique_exercises,
            AVG(w.rating)::float8 AS average_rating,
            SUM(w.duration_minutes)::int8 AS total_minutes,
            MIN(w.scheduled_date) AS first_workout,
            MAX(w.scheduled_date) AS last_workout,
            COUNT(DISTINCT w.scheduled_date)::int8 AS active_days
         FROM workouts w
         LEFT JOIN workout_exercises we ON w.id = we.workout_id
         WHERE w.user_id = $1";

    let upcoming_sql = "SELECT * FROM workouts
         WHERE user_id = $1
           AND status = 'scheduled'
           AND scheduled_date >= CURRENT_DATE
         ORDER BY scheduled_date, scheduled_time
         LIMIT 5";

    let frequent_sql = format!(
        "SELECT
            e.name,
            e.category,
            COUNT(DISTINCT w.id)::int8 AS workout_count,
            {VOLUME_EXPR} AS total_volume
         FROM workouts w
         JOIN workout_exercises we ON w.id = we.workout_id
         JOIN exercises e ON we.exercise_id = e.id
         WHERE w.user_id = $1
           AND w.status = 'completed'
         GROUP BY e.id, e.name, e.category
         ORDER BY workout_count DESC
         LIMIT 5"
    );

    let stats_fut = sqlx::query_as::<_, DashboardOverview>(stats_sql)
        .bind(user_id)
        .fetch_one(pool);
    let upcoming_fut = sqlx::query_as::<_, Workout>(upcoming_sql)
        .bind(user_id)
        .fetch_all(pool);
    let frequent_fut = sqlx::query_as::<_, FrequentExercise>(&frequent_sql)
        .bind(user_id)
        .fetch_all(pool);

    let (stats, upcoming_workouts, frequent_exercises) =
        tokio::try_join!(stats_fut, upcoming_fut, frequent_fut)?;

    Ok(DashboardStats {
        stats,
        upcoming_workouts,
        frequent_exercises,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_progress_missing_current_is_zero() {
        assert_eq!(goal_progress(None, Some(200.0)), 0.0);
    }

    #[test]
    fn goal_progress_zero_or_missing_target_is_met() {
        assert_eq!(goal_progress(Some(50.0), Some(0.0)), 100.0);
        assert_eq!(goal_progress(Some(50.0), None), 100.0);
    }

    #[test]
    fn goal_progress_ratio() {
        assert_eq!(goal_progress(Some(50.0), Some(200.0)), 25.0);
    }

    #[test]
    fn goal_progress_clamped_to_hundred() {
        assert_eq!(goal_progress(Some(300.0), Some(200.0)), 100.0);
        assert_eq!(goal_progress(Some(-10.0), Some(200.0)), 0.0);
    }

    #[test]
    fn exercise_grouping_keeps_the_common_aggregate_shape() {
        let sql = progress_by_exercise_sql();
        assert!(sql.contains("AS unique_exercises"));
        assert!(sql.contains("ORDER BY we.exercise_id DESC"));
    }

    #[test]
    fn period_grouping_truncates_by_requested_unit() {
        let sql = progress_by_period_sql("month");
        assert!(sql.contains("DATE_TRUNC('month', w.scheduled_date)"));
        assert!(sql.contains("ORDER BY period DESC"));
    }

    #[test]
    fn volume_expr_defaults_missing_weight_to_one() {
        assert!(VOLUME_EXPR.contains("COALESCE(we.weight, 1)"));
    }

    #[test]
    fn duration_expr_prefers_explicit_timestamps() {
        assert!(DURATION_EXPR.contains("w.end_time - w.start_time"));
        assert!(DURATION_EXPR.contains("COALESCE(w.duration_minutes, 0)"));
    }
}
