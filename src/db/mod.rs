use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::env;

pub mod exercises;
pub mod reports;
pub mod workouts;

/// Builds the connection pool every query runs through. Transactional writes
/// check a connection out with `pool.begin()`; sqlx commits on explicit
/// `commit()` and rolls back when the transaction guard is dropped, so the
/// connection is returned to the pool on every exit path.
pub async fn create_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .expect("Failed to connect to the database")
}
