use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{AvailabilityProfile, Course, QuizSet, StudySession};

/// Everything the planner persists between requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerState {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub availability: AvailabilityProfile,
    #[serde(default)]
    pub schedule: Vec<StudySession>,
    #[serde(default, rename = "quizSets")]
    pub quiz_sets: Vec<QuizSet>,
}

impl PlannerState {
    /// Schedule without sessions whose course has since been deleted.
    pub fn live_schedule(&self) -> Vec<StudySession> {
        retain_live_sessions(self.schedule.clone(), &self.courses)
    }
}

pub fn retain_live_sessions(mut sessions: Vec<StudySession>, courses: &[Course]) -> Vec<StudySession> {
    let live: HashSet<&str> = courses.iter().map(|c| c.id.as_str()).collect();
    sessions.retain(|s| live.contains(s.course_id.as_str()));
    sessions
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::SessionType;

    fn course(id: &str) -> Course {
        Course {
            id: id.to_string(),
            name: format!("Course {}", id),
            exam_date: NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
            priority: 5,
            created_at: "2025-05-01T00:00:00+00:00".to_string(),
        }
    }

    fn session(course_id: &str, start: u32) -> StudySession {
        StudySession {
            date: NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            start_minutes: start,
            end_minutes: start + 60,
            course_id: course_id.to_string(),
            course_name: format!("Course {}", course_id),
            session_type: SessionType::FocusedStudy,
        }
    }

    #[test]
    fn live_schedule_drops_deleted_courses() {
        let state = PlannerState {
            courses: vec![course("a")],
            availability: AvailabilityProfile::default(),
            schedule: vec![session("a", 600), session("gone", 660), session("a", 720)],
            quiz_sets: Vec::new(),
        };

        let live = state.live_schedule();
        assert_eq!(live.len(), 2);
        assert!(live.iter().all(|s| s.course_id == "a"));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let state: PlannerState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, PlannerState::default());
    }
}
