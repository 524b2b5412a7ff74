use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::exercise::Exercise;
use crate::models::workout::Pagination;

/// Optional catalog filters, AND-combined when present.
#[derive(Debug, Default, Clone)]
pub struct ExerciseFilters {
    pub category: Option<String>,
    pub muscle_group: Option<String>,
    pub difficulty_level: Option<String>,
    pub equipment_needed: Option<String>,
    pub search: Option<String>,
}

fn push_filters(qb: &mut QueryBuilder<Postgres>, filters: &ExerciseFilters) {
    qb.push(" WHERE TRUE");

    if let Some(category) = &filters.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(muscle_group) = &filters.muscle_group {
        qb.push(" AND muscle_group = ").push_bind(muscle_group.clone());
    }
    if let Some(difficulty_level) = &filters.difficulty_level {
        qb.push(" AND difficulty_level = ")
            .push_bind(difficulty_level.clone());
    }
    if let Some(equipment) = &filters.equipment_needed {
        qb.push(" AND equipment_needed ILIKE ")
            .push_bind(format!("%{}%", equipment));
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

pub async fn list_with_filters(
    pool: &PgPool,
    filters: &ExerciseFilters,
    page: i64,
    limit: i64,
) -> Result<(Vec<Exercise>, Pagination), AppError> {
    let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM exercises");
    push_filters(&mut count_qb, filters);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let offset = (page - 1) * limit;
    let mut qb = QueryBuilder::new("SELECT * FROM exercises");
    push_filters(&mut qb, filters);
    qb.push(" ORDER BY name ASC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let exercises = qb.build_query_as::<Exercise>().fetch_all(pool).await?;

    Ok((exercises, Pagination::new(page, limit, total)))
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Exercise>, AppError> {
    let exercise = sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(exercise)
}

pub async fn find_by_category(pool: &PgPool, category: &str) -> Result<Vec<Exercise>, AppError> {
    let exercises =
        sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE category = $1 ORDER BY name")
            .bind(category)
            .fetch_all(pool)
            .await?;
    Ok(exercises)
}

pub async fn search(pool: &PgPool, term: &str) -> Result<Vec<Exercise>, AppError> {
    let exercises = sqlx::query_as::<_, Exercise>(
        "SELECT * FROM exercises
         WHERE name ILIKE $1 OR description ILIKE $1
         ORDER BY name
         LIMIT 50",
    )
    .bind(format!("%{}%", term))
    .fetch_all(pool)
    .await?;
    Ok(exercises)
}

pub async fn categories(pool: &PgPool) -> Result<Vec<String>, AppError> {
    let rows: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT category FROM exercises ORDER BY category")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

pub async fn muscle_groups(pool: &PgPool) -> Result<Vec<String>, AppError> {
    let rows: Vec<String> = sqlx::query_scalar(
        "SELECT DISTINCT muscle_group FROM exercises
         WHERE muscle_group IS NOT NULL
         ORDER BY muscle_group",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filters_builds_unconditional_predicate() {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM exercises");
        push_filters(&mut qb, &ExerciseFilters::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM exercises WHERE TRUE");
    }

    #[test]
    fn present_filters_are_and_combined() {
        let filters = ExerciseFilters {
            category: Some("strength".into()),
            muscle_group: None,
            difficulty_level: Some("beginner".into()),
            equipment_needed: Some("barbell".into()),
            search: Some("press".into()),
        };
        let mut qb = QueryBuilder::new("SELECT * FROM exercises");
        push_filters(&mut qb, &filters);
        let sql = qb.sql();
        assert!(sql.contains("category = $1"));
        assert!(!sql.contains("muscle_group"));
        assert!(sql.contains("difficulty_level = $2"));
        assert!(sql.contains("equipment_needed ILIKE $3"));
        assert!(sql.contains("(name ILIKE $4 OR description ILIKE $5)"));
    }
}
