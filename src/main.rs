mod db;
mod errors;
mod handlers;
mod models;
mod services;
mod utils;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use actix_web_httpauth::middleware::HttpAuthentication;
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use env_logger::Env;
use log::info;
use std::collections::HashMap;
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Validate JWT secret
    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    if jwt_secret.is_empty() {
        panic!("JWT_SECRET cannot be empty");
    }

    // Initialize the database pool
    let pool = db::create_pool().await;

    // Fetch the server bind address from an environment variable, default to "127.0.0.1:8080"
    let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    info!("Starting server at {}", bind_address);

    // Authentication middleware
    let auth = HttpAuthentication::bearer(utils::jwt::validator);

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "fittrack".to_string());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .expect("Failed to create Prometheus metrics");

    // Start the HTTP server
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default()) // Logging middleware
            .wrap(prometheus.clone()) // Prometheus metrics middleware
            .app_data(web::Data::new(pool.clone())) // Database pool
            .service(
                web::resource("/api/auth/register")
                    .route(web::post().to(handlers::auth::register)),
            )
            .service(
                web::resource("/api/auth/login")
                    .route(web::post().to(handlers::auth::login)),
            )
            .service(
                web::resource("/api/profile")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::profile::get_profile))
                    .route(web::patch().to(handlers::profile::update_profile)),
            )
            .service(
                web::resource("/api/exercises")
                    .route(web::get().to(handlers::exercise::list_exercises)),
            )
            .service(
                web::resource("/api/exercises/categories")
                    .route(web::get().to(handlers::exercise::get_categories)),
            )
            .service(
                web::resource("/api/exercises/muscle-groups")
                    .route(web::get().to(handlers::exercise::get_muscle_groups)),
            )
            .service(
                web::resource("/api/exercises/search")
                    .route(web::get().to(handlers::exercise::search_exercises)),
            )
            .service(
                web::resource("/api/exercises/category/{category}")
                    .route(web::get().to(handlers::exercise::get_by_category)),
            )
            .service(
                web::resource("/api/exercises/{id}")
                    .route(web::get().to(handlers::exercise::get_exercise_by_id)),
            )
            .service(
                web::resource("/api/workouts")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::workout::get_workouts))
                    .route(web::post().to(handlers::workout::create_workout)),
            )
            .service(
                web::resource("/api/workouts/stats")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::workout::get_workout_stats)),
            )
            .service(
                web::resource("/api/workouts/upcoming")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::workout::get_upcoming_workouts)),
            )
            .service(
                web::resource("/api/workouts/exercises/{exerciseId}/stats")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::workout::get_exercise_stats)),
            )
            .service(
                web::resource("/api/workouts/{id}")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::workout::get_workout_by_id))
                    .route(web::put().to(handlers::workout::update_workout))
                    .route(web::delete().to(handlers::workout::delete_workout)),
            )
            .service(
                web::resource("/api/workouts/{id}/complete")
                    .wrap(auth.clone())
                    .route(web::post().to(handlers::workout::complete_workout)),
            )
            .service(
                web::resource("/api/reports/progress")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::report::generate_report)),
            )
            .service(
                web::resource("/api/reports/dashboard")
                    .wrap(auth.clone())
                    .route(web::get().to(handlers::report::get_dashboard_stats)),
            )
    })
    .workers(num_cpus::get())
    .bind(&bind_address)?
    .run()
    .await
}
