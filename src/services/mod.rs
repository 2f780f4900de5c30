pub mod planner;
pub mod quiz_sets;
pub mod scheduler;

pub use planner::{PlannerService, ScheduleSummary};
pub use quiz_sets::QuizSetService;
pub use scheduler::generate_schedule;
