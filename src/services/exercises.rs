use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::db::exercises::ExerciseFilters;
use crate::errors::AppError;
use crate::models::exercise::Exercise;
use crate::models::workout::Pagination;

pub async fn list_exercises(
    pool: &PgPool,
    filters: &ExerciseFilters,
    page: i64,
    limit: i64,
) -> Result<(Vec<Exercise>, Pagination), AppError> {
    db::exercises::list_with_filters(pool, filters, page, limit).await
}

pub async fn get_exercise(pool: &PgPool, id: Uuid) -> Result<Exercise, AppError> {
    db::exercises::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Exercise not found".to_string()))
}

pub async fn get_by_category(pool: &PgPool, category: &str) -> Result<Vec<Exercise>, AppError> {
    db::exercises::find_by_category(pool, category).await
}

pub async fn search_exercises(pool: &PgPool, term: &str) -> Result<Vec<Exercise>, AppError> {
    db::exercises::search(pool, term).await
}

pub async fn get_categories(pool: &PgPool) -> Result<Vec<String>, AppError> {
    db::exercises::categories(pool).await
}

pub async fn get_muscle_groups(pool: &PgPool) -> Result<Vec<String>, AppError> {
    db::exercises::muscle_groups(pool).await
}
