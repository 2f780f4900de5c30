use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{AvailabilityProfile, Course, NewCourseRequest, PlannerState, StudySession};
use crate::services::scheduler::generate_schedule;

pub struct PlannerService {
    db: SqlitePool,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub sessions: usize,
    pub per_course: Vec<CourseShare>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseShare {
    pub course_id: String,
    pub course_name: String,
    pub sessions: usize,
}

impl ScheduleSummary {
    pub fn from_sessions(sessions: &[StudySession]) -> Self {
        let mut per_course: Vec<CourseShare> = Vec::new();
        for session in sessions {
            match per_course.iter_mut().find(|c| c.course_id == session.course_id) {
                Some(share) => share.sessions += 1,
                None => per_course.push(CourseShare {
                    course_id: session.course_id.clone(),
                    course_name: session.course_name.clone(),
                    sessions: 1,
                }),
            }
        }

        Self {
            sessions: sessions.len(),
            per_course,
        }
    }
}

impl PlannerService {
    pub fn new(db: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Rebuilds the schedule from the stored courses and availability.
    ///
    /// The stored schedule is only replaced when generation succeeds.
    pub async fn regenerate(&self) -> Result<Vec<StudySession>, AppError> {
        let courses = repository::fetch_courses(&self.db).await?;
        let availability = repository::fetch_availability(&self.db).await?;
        let today = self.clock.today();

        let sessions = generate_schedule(&courses, &availability, today).map_err(|e| {
            warn!("schedule generation rejected: {} ({})", e, e.kind());
            e
        })?;

        repository::replace_schedule(&self.db, &sessions).await?;

        let summary = ScheduleSummary::from_sessions(&sessions);
        info!(
            "generated {} sessions from {} for {} courses",
            summary.sessions,
            today,
            summary.per_course.len()
        );
        Ok(sessions)
    }

    pub async fn clear(&self) -> Result<u64, AppError> {
        let removed = repository::clear_schedule(&self.db).await?;
        info!("cleared {} scheduled sessions", removed);
        Ok(removed)
    }

    pub async fn schedule(&self, course_id: Option<&str>) -> Result<Vec<StudySession>, AppError> {
        let mut sessions = repository::fetch_schedule(&self.db).await?;
        if let Some(id) = course_id.filter(|id| !id.is_empty()) {
            sessions.retain(|s| s.course_id == id);
        }
        Ok(sessions)
    }

    pub async fn add_course(&self, req: NewCourseRequest) -> Result<Course, AppError> {
        let course = Course::new(req).map_err(|errors| AppError::BadRequest(errors.join(" ")))?;
        repository::insert_course(&self.db, &course).await?;
        info!("added course {} ({})", course.name, course.id);
        Ok(course)
    }

    pub async fn remove_course(&self, id: &str) -> Result<(), AppError> {
        if !repository::delete_course(&self.db, id).await? {
            return Err(AppError::NotFound);
        }
        info!("removed course {}", id);
        Ok(())
    }

    pub async fn update_availability(
        &self,
        availability: AvailabilityProfile,
    ) -> Result<AvailabilityProfile, AppError> {
        let availability = availability.normalized();
        repository::save_availability(&self.db, &availability).await?;
        Ok(availability)
    }

    /// Replaces everything stored with an exported state.
    ///
    /// Sessions of courses missing from the import are dropped.
    pub async fn import(&self, mut state: PlannerState) -> Result<PlannerState, AppError> {
        for course in &state.courses {
            let errors = course.validate();
            if !errors.is_empty() {
                return Err(AppError::BadRequest(format!(
                    "Course '{}': {}",
                    course.name,
                    errors.join(" ")
                )));
            }
        }

        state.availability = state.availability.normalized();
        state.schedule = state.live_schedule();

        repository::save_state(&self.db, &state).await?;
        info!(
            "imported {} courses, {} sessions and {} quiz sets",
            state.courses.len(),
            state.schedule.len(),
            state.quiz_sets.len()
        );
        Ok(state)
    }

    pub async fn reset(&self) -> Result<(), AppError> {
        repository::reset_state(&self.db).await?;
        warn!("planner state reset");
        Ok(())
    }
}
