use axum::Json;
use axum::extract::{Path, Query};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::repository;
use crate::error::AppError;
use crate::export;
use crate::models::*;
use crate::quiz::{Question, QuizRequest};
use crate::services::ScheduleSummary;
use crate::state::AppState;

#[derive(Deserialize)]
struct ScheduleQueryParams {
    #[serde(default)]
    course_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ExportFormat {
    Csv,
    #[default]
    Txt,
}

#[derive(Deserialize)]
struct ExportQueryParams {
    #[serde(default)]
    format: ExportFormat,
    #[serde(default)]
    course_id: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    sessions: Vec<StudySession>,
    summary: ScheduleSummary,
}

#[derive(Deserialize)]
struct GenerateQuestionsParams {
    #[serde(default)]
    count: Option<u32>,
}

#[derive(Serialize)]
struct QuizResponse {
    questions: Vec<Question>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", delete(delete_course))
        .route("/availability", get(get_availability).put(put_availability))
        .route("/schedule", get(get_schedule).delete(clear_schedule))
        .route("/schedule/generate", post(generate_schedule))
        .route("/schedule/export", get(export_schedule))
        .route("/state", get(get_state).put(import_state).delete(reset_state))
        .route("/quiz", post(generate_quiz))
        .route("/quiz-sets", get(list_quiz_sets).post(create_quiz_set))
        .route("/quiz-sets/{id}", get(get_quiz_set).delete(delete_quiz_set))
        .route("/quiz-sets/{id}/generate", post(generate_quiz_set))
        .route("/quiz-sets/{id}/summary", post(summarize_quiz_set))
        .route("/quiz-sets/{id}/attempts", post(record_attempt))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;
    Ok(Json(courses))
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = state.planner().add_course(req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    state.planner().remove_course(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_availability(
    State(state): State<AppState>,
) -> Result<Json<AvailabilityProfile>, AppError> {
    let availability = repository::fetch_availability(&state.db).await?;
    Ok(Json(availability))
}

async fn put_availability(
    State(state): State<AppState>,
    Json(req): Json<AvailabilityProfile>
) -> Result<Json<AvailabilityProfile>, AppError> {
    let availability = state.planner().update_availability(req).await?;
    Ok(Json(availability))
}

async fn get_schedule(
    State(state): State<AppState>,
    Query(params): Query<ScheduleQueryParams>
) -> Result<Json<Vec<StudySession>>, AppError> {
    let sessions = state.planner().schedule(params.course_id.as_deref()).await?;
    Ok(Json(sessions))
}

async fn generate_schedule(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, AppError> {
    let sessions = state.planner().regenerate().await?;
    let summary = ScheduleSummary::from_sessions(&sessions);
    Ok(Json(GenerateResponse { sessions, summary }))
}

async fn clear_schedule(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.planner().clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn export_schedule(
    State(state): State<AppState>,
    Query(params): Query<ExportQueryParams>
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.planner().schedule(params.course_id.as_deref()).await?;

    let (content_type, body) = match params.format {
        ExportFormat::Csv => ("text/csv; charset=utf-8", export::to_csv(&sessions)),
        ExportFormat::Txt => ("text/plain; charset=utf-8", export::to_plain_text(&sessions)),
    };

    Ok(([(header::CONTENT_TYPE, content_type)], body))
}

async fn get_state(State(state): State<AppState>) -> Result<Json<PlannerState>, AppError> {
    let planner_state = repository::load_state(&state.db).await?;
    Ok(Json(planner_state))
}

async fn import_state(
    State(state): State<AppState>,
    Json(req): Json<PlannerState>
) -> Result<Json<PlannerState>, AppError> {
    let imported = state.planner().import(req).await?;
    Ok(Json(imported))
}

async fn reset_state(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.planner().reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn generate_quiz(
    State(state): State<AppState>,
    Json(req): Json<QuizRequest>
) -> Result<Json<QuizResponse>, AppError> {
    let questions = state.quiz.generate(&req).await?;
    Ok(Json(QuizResponse { questions }))
}

async fn list_quiz_sets(State(state): State<AppState>) -> Result<Json<Vec<QuizSet>>, AppError> {
    let sets = state.quiz_sets().list().await?;
    Ok(Json(sets))
}

async fn create_quiz_set(
    State(state): State<AppState>,
    Json(req): Json<NewQuizSetRequest>
) -> Result<(StatusCode, Json<QuizSet>), AppError> {
    let set = state.quiz_sets().create(req).await?;
    Ok((StatusCode::CREATED, Json(set)))
}

async fn get_quiz_set(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<QuizSet>, AppError> {
    let set = state.quiz_sets().get(&id).await?;
    Ok(Json(set))
}

async fn delete_quiz_set(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    state.quiz_sets().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn generate_quiz_set(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<GenerateQuestionsParams>
) -> Result<Json<QuizSet>, AppError> {
    let set = state.quiz_sets().generate(&id, params.count).await?;
    Ok(Json(set))
}

async fn summarize_quiz_set(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<QuizSet>, AppError> {
    let set = state.quiz_sets().summarize(&id).await?;
    Ok(Json(set))
}

async fn record_attempt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<NewAttemptRequest>
) -> Result<(StatusCode, Json<QuizAttempt>), AppError> {
    let attempt = state.quiz_sets().record_attempt(&id, req).await?;
    Ok((StatusCode::CREATED, Json(attempt)))
}
