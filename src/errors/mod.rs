use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Forbidden(String),
    Unauthorized(String),
    Conflict(String),
    BadRequest(String),
    InternalServerError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    code: &'static str,
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "UNAUTHORIZED_ACCESS",
            AppError::Unauthorized(_) => "INVALID_CREDENTIALS",
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "VALIDATION_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_ERROR",
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Unauthorized(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg)
            | AppError::InternalServerError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = ErrorResponse {
            success: false,
            message: self.message().to_string(),
            code: self.code(),
        };
        match self {
            AppError::NotFound(_) => HttpResponse::NotFound().json(body),
            AppError::Forbidden(_) => HttpResponse::Forbidden().json(body),
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
            AppError::Conflict(_) => HttpResponse::Conflict().json(body),
            AppError::BadRequest(_) => HttpResponse::BadRequest().json(body),
            AppError::InternalServerError(_) => HttpResponse::InternalServerError().json(body),
        }
    }
}

// Storage failures propagate unchanged up to the handler layer; any open
// transaction is rolled back when it is dropped.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(format!("Database error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            AppError::NotFound("x".into()).error_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("x".into()).error_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::BadRequest("x".into()).error_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InternalServerError("x".into())
                .error_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn sqlx_errors_become_internal() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::InternalServerError(_)));
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
