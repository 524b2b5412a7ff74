use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::reports;
use crate::errors::AppError;
use crate::utils::jwt::authenticated_user;
use crate::utils::validation::{validate_group_by, validate_report_type};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    start_date: NaiveDate,
    end_date: NaiveDate,
    report_type: Option<String>,
    group_by: Option<String>,
    exercise_id: Option<Uuid>,
}

// GET /api/reports/progress
pub async fn generate_report(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    let user_id = claims.sub;

    if query.end_date < query.start_date {
        return Err(AppError::BadRequest(
            "End date must not precede start date".to_string(),
        ));
    }

    let report_type = query.report_type.as_deref().unwrap_or("progress");
    validate_report_type(report_type)?;

    let group_by = query.group_by.as_deref().unwrap_or("week");

    let data = match report_type {
        "volume" => serde_json::to_value(
            reports::volume_report(&pool, user_id, query.start_date, query.end_date).await?,
        ),
        "frequency" => serde_json::to_value(
            reports::frequency_report(&pool, user_id, query.start_date, query.end_date).await?,
        ),
        "strength" => {
            let exercise_id = query.exercise_id.ok_or_else(|| {
                AppError::BadRequest("Exercise ID required for strength report".to_string())
            })?;
            serde_json::to_value(
                reports::strength_progress_report(
                    &pool,
                    user_id,
                    exercise_id,
                    query.start_date,
                    query.end_date,
                )
                .await?,
            )
        }
        "body" => serde_json::to_value(
            reports::body_metrics_report(&pool, user_id, query.start_date, query.end_date).await?,
        ),
        "goals" => serde_json::to_value(reports::goal_progress_report(&pool, user_id).await?),
        "dashboard" => serde_json::to_value(reports::dashboard_stats(&pool, user_id).await?),
        _ => {
            validate_group_by(group_by)?;
            serde_json::to_value(
                reports::progress_report(&pool, user_id, query.start_date, query.end_date, group_by)
                    .await?,
            )
        }
    }
    .map_err(|e| AppError::InternalServerError(format!("Report serialization error: {}", e)))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": data,
        "metadata": {
            "startDate": query.start_date,
            "endDate": query.end_date,
            "reportType": report_type,
            "groupBy": group_by,
            "generatedAt": Utc::now().to_rfc3339()
        }
    })))
}

// GET /api/reports/dashboard
pub async fn get_dashboard_stats(
    req: HttpRequest,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let claims = authenticated_user(&req)?;
    let stats = reports::dashboard_stats(&pool, claims.sub).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": stats
    })))
}
