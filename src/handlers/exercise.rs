use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::exercises::ExerciseFilters;
use crate::errors::AppError;
use crate::services;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExercisesQuery {
    page: Option<i64>,
    limit: Option<i64>,
    category: Option<String>,
    muscle_group: Option<String>,
    difficulty_level: Option<String>,
    equipment_needed: Option<String>,
    search: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

// GET /api/exercises
pub async fn list_exercises(
    pool: web::Data<PgPool>,
    query: web::Query<ListExercisesQuery>,
) -> Result<HttpResponse, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).max(1);
    let filters = ExerciseFilters {
        category: query.category.clone(),
        muscle_group: query.muscle_group.clone(),
        difficulty_level: query.difficulty_level.clone(),
        equipment_needed: query.equipment_needed.clone(),
        search: query.search.clone(),
    };

    let (exercises, pagination) =
        services::exercises::list_exercises(&pool, &filters, page, limit).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": exercises,
        "pagination": pagination
    })))
}

// GET /api/exercises/{id}
pub async fn get_exercise_by_id(
    pool: web::Data<PgPool>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let exercise = services::exercises::get_exercise(&pool, *id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": exercise
    })))
}

// GET /api/exercises/category/{category}
pub async fn get_by_category(
    pool: web::Data<PgPool>,
    category: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let exercises = services::exercises::get_by_category(&pool, &category).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": exercises
    })))
}

// GET /api/exercises/search?q=
pub async fn search_exercises(
    pool: web::Data<PgPool>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let term = query.q.as_deref().unwrap_or("");
    if term.len() < 2 {
        return Err(AppError::BadRequest(
            "Search term must be at least 2 characters".to_string(),
        ));
    }

    let exercises = services::exercises::search_exercises(&pool, term).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": exercises
    })))
}

// GET /api/exercises/categories
pub async fn get_categories(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let categories = services::exercises::get_categories(&pool).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": categories
    })))
}

// GET /api/exercises/muscle-groups
pub async fn get_muscle_groups(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let muscle_groups = services::exercises::get_muscle_groups(&pool).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": muscle_groups
    })))
}
