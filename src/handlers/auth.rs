use actix_web::rt::task::spawn_blocking;
use actix_web::{web, HttpResponse};
use bcrypt::{hash, verify};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::user::{User, UserProfile};
use crate::utils::jwt::generate_token;
use crate::utils::validation::{validate_fitness_level, validate_password_strength, validate_payload};

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    email: String,

    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"))]
    username: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    password: String,

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

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email address"))]
    email: Option<String>,

    username: Option<String>,

    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

// POST /api/auth/register
pub async fn register(
    req: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;
    validate_password_strength(&req.password)?;
    let fitness_level = req
        .fitness_level
        .clone()
        .unwrap_or_else(|| "beginner".to_string());
    validate_fitness_level(&fitness_level)?;

    let existing: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(&req.email)
            .fetch_optional(&**pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let existing: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(&req.username)
            .fetch_optional(&**pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let password = req.password.clone();
    let password_hash = spawn_blocking(move || hash(&password, 12))
        .await
        .map_err(|_| AppError::InternalServerError("Hashing failed".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let user_id = Uuid::now_v7();
    let profile = sqlx::query_as::<_, UserProfile>(
        "INSERT INTO users (id, email, username, password_hash, first_name, last_name, \
         date_of_birth, height_cm, weight_kg, fitness_level, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
         RETURNING id, email, username, first_name, last_name, date_of_birth, height_cm, \
                   weight_kg, fitness_level, last_login, created_at, updated_at",
    )
    .bind(user_id)
    .bind(&req.email)
    .bind(&req.username)
    .bind(&password_hash)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(req.date_of_birth)
    .bind(req.height_cm)
    .bind(req.weight_kg)
    .bind(&fitness_level)
    .fetch_one(&**pool)
    .await
    .map_err(|e| match &e {
        // unique violation lost to a concurrent register
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AppError::Conflict("Email or username already exists".to_string())
        }
        _ => AppError::from(e),
    })?;

    let token = generate_token(profile.id, &profile.email)
        .map_err(|_| AppError::InternalServerError("Token generation failed".to_string()))?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": { "user": profile, "token": token }
    })))
}

// POST /api/auth/login
pub async fn login(
    req: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    validate_payload(&*req)?;

    let user: Option<User> = if let Some(email) = &req.email {
        sqlx::query_as("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&**pool)
            .await?
    } else if let Some(username) = &req.username {
        sqlx::query_as("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&**pool)
            .await?
    } else {
        return Err(AppError::BadRequest(
            "Email or username is required".to_string(),
        ));
    };

    // Same failure for unknown account and wrong password
    let user = user.ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let password = req.password.clone();
    let password_hash = user.password_hash.clone();
    let is_valid = spawn_blocking(move || verify(password.as_str(), &password_hash))
        .await
        .map_err(|_| AppError::InternalServerError("Password verification error".to_string()))?
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    if !is_valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(user.id)
        .execute(&**pool)
        .await?;

    let token = generate_token(user.id, &user.email)
        .map_err(|_| AppError::InternalServerError("Token generation failed".to_string()))?;

    let profile: UserProfile = user.into();
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": { "user": profile, "token": token }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_validates_ranges() {
        let req: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "lifter@example.com",
            "username": "lifter",
            "password": "Sup3rSecret",
            "heightCm": 300.0
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn login_accepts_username_instead_of_email() {
        let req: LoginRequest = serde_json::from_value(serde_json::json!({
            "username": "lifter",
            "password": "Sup3rSecret"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.email.is_none());
    }
}
