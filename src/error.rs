use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Reasons a schedule cannot be generated from the current planner input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Add at least one course.")]
    NoCourses,

    #[error("Select at least one study day.")]
    NoStudyDays,

    #[error("End time must be later than start time.")]
    InvalidTimeWindow,

    #[error("Session length must be at least 15 minutes.")]
    SessionTooShort,

    #[error("Time window is too small for the session length.")]
    WindowTooSmall,

    #[error("Your latest exam date must be in the future.")]
    NoFutureExam,
}

impl ScheduleError {
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleError::NoCourses => "NoCoursesError",
            ScheduleError::NoStudyDays => "NoStudyDaysError",
            ScheduleError::InvalidTimeWindow => "InvalidTimeWindowError",
            ScheduleError::SessionTooShort => "SessionTooShortError",
            ScheduleError::WindowTooSmall => "WindowTooSmallError",
            ScheduleError::NoFutureExam => "NoFutureExamError",
        }
    }
}

/// Problems with the process environment found at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Corrupt planner state: {0}")]
    CorruptState(String),

    #[error("Quiz service error: {0}")]
    Upstream(String),

    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Schedule(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                e.kind().to_string(),
                e.to_string(),
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                StatusCode::NOT_FOUND.to_string(),
                "Not Found".to_string(),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                StatusCode::BAD_REQUEST.to_string(),
                msg,
            ),
            AppError::Upstream(msg) => {
                error!("quiz service error: {}", msg);
                (StatusCode::BAD_GATEWAY, StatusCode::BAD_GATEWAY.to_string(), msg)
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                internal("Database error occurred")
            }
            AppError::Migrate(e) => {
                error!("migration error: {}", e);
                internal("Database error occurred")
            }
            AppError::CorruptState(msg) => {
                error!("corrupt planner state: {}", msg);
                internal("Stored planner state is corrupt")
            }
            AppError::InternalServerError => internal("Internal server error"),
        };

        let body = Json(ErrorResponse { error: code, message });

        (status, body).into_response()
    }
}

fn internal(message: &str) -> (StatusCode, String, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        StatusCode::INTERNAL_SERVER_ERROR.to_string(),
        message.to_string(),
    )
}
