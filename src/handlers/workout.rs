use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::workouts::WorkoutFilters;
use crate::errors::AppError;
use crate::models::workout::{CompleteWorkoutRequest, CreateWorkoutRequest, UpdateWorkoutRequest};
use crate::services;
use crate::utils::jwt::authenticated_user;
use crate::utils::validation::validate_payload;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWorkoutsQuery {
    page: Option<i64>,
    limit: Option<i64>,
    status: Option<String>,
    workout_type: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    search: Option<String>,
}

#[derive(Deserialize)]
pub struct UpcomingQuery {
    days: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseStatsQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

// POST /api/workouts
pub async fn create_workout(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    payload: web::Json<CreateWorkoutRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    validate_payload(&*payload)?;

    let workout =
        services::workouts::create_workout(&pool, claims.sub, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": workout,
        "message": "Workout created successfully"
    })))
}

// GET /api/workouts
pub async fn get_workouts(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<ListWorkoutsQuery>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).max(1);
    let filters = WorkoutFilters {
        status: query.status.clone(),
        workout_type: query.workout_type.clone(),
        start_date: query.start_date,
        end_date: query.end_date,
        search: query.search.clone(),
    };

    let (workouts, pagination) =
        services::workouts::list_workouts(&pool, claims.sub, &filters, page, limit).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": workouts,
        "pagination": pagination
    })))
}

// GET /api/workouts/{id}
pub async fn get_workout_by_id(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    let workout = services::workouts::get_workout(&pool, claims.sub, *id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": workout
    })))
}

// PUT /api/workouts/{id}
pub async fn update_workout(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateWorkoutRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    validate_payload(&*payload)?;

    let workout =
        services::workouts::update_workout(&pool, claims.sub, *id, payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": workout,
        "message": "Workout updated successfully"
    })))
}

// DELETE /api/workouts/{id}
pub async fn delete_workout(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    services::workouts::delete_workout(&pool, claims.sub, *id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Workout deleted successfully"
    })))
}

// POST /api/workouts/{id}/complete
pub async fn complete_workout(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    id: web::Path<Uuid>,
    payload: web::Json<CompleteWorkoutRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    validate_payload(&*payload)?;

    let workout =
        services::workouts::complete_workout(&pool, claims.sub, *id, payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": workout,
        "message": "Workout marked as completed"
    })))
}

// GET /api/workouts/stats
pub async fn get_workout_stats(
    req: HttpRequest,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    let stats = services::workouts::get_stats(&pool, claims.sub).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": stats
    })))
}

// GET /api/workouts/upcoming
pub async fn get_upcoming_workouts(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<UpcomingQuery>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    let days = query.days.unwrap_or(7).clamp(1, 365);
    let workouts = services::workouts::get_upcoming(&pool, claims.sub, days).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": workouts
    })))
}

// GET /api/workouts/exercises/{exerciseId}/stats
pub async fn get_exercise_stats(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    exercise_id: web::Path<Uuid>,
    query: web::Query<ExerciseStatsQuery>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    let stats = services::workouts::get_exercise_stats(
        &pool,
        claims.sub,
        *exercise_id,
        query.start_date,
        query.end_date,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": stats
    })))
}
