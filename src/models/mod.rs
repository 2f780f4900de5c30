pub mod availability;
pub mod course;
pub mod planner_state;
pub mod quiz_set;
pub mod session;

pub use availability::AvailabilityProfile;
pub use course::{Course, NewCourseRequest};
pub use planner_state::PlannerState;
pub use quiz_set::{NewAttemptRequest, NewQuizSetRequest, Question, QuizAttempt, QuizSet};
pub use session::{SessionType, StudySession};
