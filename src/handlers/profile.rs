use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{PgPool, QueryBuilder};
use validator::Validate;

use crate::errors::AppError;
use crate::models::user::UserProfile;
use crate::utils::jwt::authenticated_user;
use crate::utils::validation::{validate_fitness_level, validate_payload};

const PROFILE_COLUMNS: &str = "id, email, username, first_name, last_name, date_of_birth, \
     height_cm, weight_kg, fitness_level, last_login, created_at, updated_at";

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 50, message = "First name cannot exceed 50 characters"))]
    first_name: Option<String>,

    #[validate(length(max = 50, message = "Last name cannot exceed 50 characters"))]
    last_name: Option<String>,

    date_of_birth: Option<NaiveDate>,

    #[validate(range(min = 50.0, max = 250.0, message = "Height must be between 50 and 250 cm"))]
    height_cm: Option<f64>,

    #[validate(range(min = 20.0, max = 300.0, message = "Weight must be between 20 and 300 kg"))]
    weight_kg: Option<f64>,

    fitness_level: Option<String>,
}

impl UpdateProfileRequest {
    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.date_of_birth.is_none()
            && self.height_cm.is_none()
            && self.weight_kg.is_none()
            && self.fitness_level.is_none()
    }
}

// GET /api/profile
pub async fn get_profile(
    req: HttpRequest,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;

    let sql = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1");
    let profile = sqlx::query_as::<_, UserProfile>(&sql)
        .bind(claims.sub)
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": profile
    })))
}

// PATCH /api/profile
pub async fn update_profile(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    validate_payload(&*payload)?;

    if payload.is_empty() {
        return Err(AppError::BadRequest("No valid fields to update".to_string()));
    }
    if let Some(fitness_level) = &payload.fitness_level {
        validate_fitness_level(fitness_level)?;
    }

    let mut qb = QueryBuilder::new("UPDATE users SET updated_at = NOW()");
    if let Some(first_name) = &payload.first_name {
        qb.push(", first_name = ").push_bind(first_name.clone());
    }
    if let Some(last_name) = &payload.last_name {
        qb.push(", last_name = ").push_bind(last_name.clone());
    }
    if let Some(date_of_birth) = payload.date_of_birth {
        qb.push(", date_of_birth = ").push_bind(date_of_birth);
    }
    if let Some(height_cm) = payload.height_cm {
        qb.push(", height_cm = ").push_bind(height_cm);
    }
    if let Some(weight_kg) = payload.weight_kg {
        qb.push(", weight_kg = ").push_bind(weight_kg);
    }
    if let Some(fitness_level) = &payload.fitness_level {
        qb.push(", fitness_level = ").push_bind(fitness_level.clone());
    }
    qb.push(" WHERE id = ")
        .push_bind(claims.sub)
        .push(format!(" RETURNING {PROFILE_COLUMNS}"));

    let profile = qb
        .build_query_as::<UserProfile>()
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": profile,
        "message": "Profile updated successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_detected() {
        let req: UpdateProfileRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.is_empty());

        let req: UpdateProfileRequest =
            serde_json::from_value(serde_json::json!({"weightKg": 80.0})).unwrap();
        assert!(!req.is_empty());
    }
}
