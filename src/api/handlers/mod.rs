use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::db::Database;
use crate::models::*;
use crate::stats;
use crate::taxonomy::{self, TrainingCategory};

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side for debugging, but clients only
/// see a generic message to avoid leaking internal details.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Students
// ============================================================

pub async fn list_students(
    State(db): State<Database>,
) -> Result<Json<Vec<Student>>, (StatusCode, String)> {
    db.get_all_students().map(Json).map_err(internal_error)
}

pub async fn get_student(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, (StatusCode, String)> {
    db.get_student(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Student not found".to_string()))
}

pub async fn create_student(
    State(db): State<Database>,
    Json(input): Json<CreateStudentInput>,
) -> Result<(StatusCode, Json<Student>), (StatusCode, String)> {
    db.create_student(input)
        .map(|s| (StatusCode::CREATED, Json(s)))
        .map_err(internal_error)
}

pub async fn update_student(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStudentInput>,
) -> Result<Json<Student>, (StatusCode, String)> {
    db.update_student(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Student not found".to_string()))
}

pub async fn delete_student(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.delete_student(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Student not found".to_string()))
    }
}

pub async fn update_fahrten(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(update): Json<FahrtenUpdate>,
) -> Result<Json<Student>, (StatusCode, String)> {
    db.update_fahrten(id, update)
        .map_err(internal_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Student not found".to_string()))
}

// ============================================================
// Training taxonomy
// ============================================================

pub async fn get_training_categories() -> Json<&'static [TrainingCategory]> {
    Json(taxonomy::training_categories())
}

// ============================================================
// Progress
// ============================================================

pub async fn list_student_progress(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ProgressEntry>>, (StatusCode, String)> {
    db.get_student(id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Student not found".to_string()))?;

    db.get_progress_by_student(id)
        .map(Json)
        .map_err(internal_error)
}

/// Query parameters addressing one checklist leaf.
#[derive(Debug, Deserialize)]
pub struct ProgressItemQuery {
    pub category: String,
    pub subcategory: String,
    pub item: String,
}

pub async fn upsert_student_progress(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Query(query): Query<ProgressItemQuery>,
    Json(input): Json<UpsertProgressInput>,
) -> Result<Json<ProgressEntry>, (StatusCode, String)> {
    db.get_student(id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Student not found".to_string()))?;

    if !taxonomy::contains_item(&query.category, &query.subcategory, &query.item) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Unknown training item: {}/{}/{}",
                query.category, query.subcategory, query.item
            ),
        ));
    }

    db.upsert_progress(id, &query.category, &query.subcategory, &query.item, input)
        .map(Json)
        .map_err(internal_error)
}

pub async fn get_progress_stats(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<BTreeMap<String, ProgressStats>>, (StatusCode, String)> {
    db.get_student(id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Student not found".to_string()))?;

    let entries = db.get_progress_by_student(id).map_err(internal_error)?;
    Ok(Json(stats::stats_by_category(&entries)))
}

pub async fn get_overall_progress(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgressStats>, (StatusCode, String)> {
    db.get_student(id)
        .map_err(internal_error)?
        .ok_or((StatusCode::NOT_FOUND, "Student not found".to_string()))?;

    let entries = db.get_progress_by_student(id).map_err(internal_error)?;
    Ok(Json(stats::overall_stats(&entries)))
}

// ============================================================
// Legacy practice-hour log
// ============================================================

pub async fn list_practice_hours(
    State(db): State<Database>,
) -> Result<Json<Vec<PracticeHour>>, (StatusCode, String)> {
    db.get_practice_hours().map(Json).map_err(internal_error)
}

pub async fn add_practice_hour(
    State(db): State<Database>,
    Json(input): Json<CreatePracticeHourInput>,
) -> Result<(StatusCode, Json<PracticeHour>), (StatusCode, String)> {
    if !input.is_valid_duration() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Duration must be 0.5 or 1.0 hours".to_string(),
        ));
    }

    db.add_practice_hour(input)
        .map(|h| (StatusCode::CREATED, Json(h)))
        .map_err(internal_error)
}

pub async fn remove_practice_hour(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    if db.remove_practice_hour(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Practice hour not found".to_string()))
    }
}
