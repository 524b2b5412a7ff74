use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use actix_web::dev::ServiceRequest;
use actix_web::{Error, HttpMessage};
use actix_web_httpauth::extractors::bearer::BearerAuth;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: usize,
}

/// Generates a JWT token for the given user.
pub fn generate_token(user_id: Uuid, email: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::days(7))
        .expect("Invalid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(env::var("JWT_SECRET").expect("JWT_SECRET must be set").as_ref()),
    )
}

/// Validates a JWT token and returns the claims if valid.
pub fn validate_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(env::var("JWT_SECRET").expect("JWT_SECRET must be set").as_ref()),
        &Validation::new(jsonwebtoken::Algorithm::HS256),
    )
    .map(|data| data.claims)
}

/// Validator function for the `HttpAuthentication::bearer` middleware.
/// On success the decoded claims are stored in the request extensions so
/// handlers can read the authenticated user id.
pub async fn validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let token = credentials.token();
    match validate_token(token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(req)
        }
        Err(_) => Err((actix_web::error::ErrorUnauthorized("Invalid token"), req)),
    }
}

/// Reads the claims the bearer middleware stored on the request. Absent
/// claims mean the route was registered without the middleware.
pub fn authenticated_user(req: &actix_web::HttpRequest) -> Result<Claims, crate::errors::AppError> {
    req.extensions()
        .get::<Claims>()
        .cloned()
        .ok_or_else(|| crate::errors::AppError::Unauthorized("Missing credentials".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        env::set_var("JWT_SECRET", "test-secret");
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, "lifter@example.com").unwrap();
        let claims = validate_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "lifter@example.com");
    }

    #[test]
    fn garbage_token_rejected() {
        env::set_var("JWT_SECRET", "test-secret");
        assert!(validate_token("not-a-token").is_err());
    }
}
