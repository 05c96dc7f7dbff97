mod handlers;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::db::Database;

pub fn create_router(db: Database) -> Router {
    let api = Router::new()
        // Students
        .route("/students", get(handlers::list_students))
        .route("/students", post(handlers::create_student))
        .route("/students/{id}", get(handlers::get_student))
        .route("/students/{id}", put(handlers::update_student))
        .route("/students/{id}", delete(handlers::delete_student))
        .route("/students/{id}/fahrten", put(handlers::update_fahrten))
        // Training taxonomy (static)
        .route("/training-categories", get(handlers::get_training_categories))
        // Progress
        .route("/students/{id}/progress", get(handlers::list_student_progress))
        .route("/students/{id}/progress", post(handlers::upsert_student_progress))
        .route("/students/{id}/progress-stats", get(handlers::get_progress_stats))
        .route("/students/{id}/overall-progress", get(handlers::get_overall_progress))
        // Legacy practice-hour log
        .route("/practice-hours", get(handlers::list_practice_hours))
        .route("/practice-hours", post(handlers::add_practice_hour))
        .route("/practice-hours/{id}", delete(handlers::remove_practice_hour))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}
