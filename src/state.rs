use std::sync::Arc;

use sqlx::SqlitePool;

use crate::clock::Clock;
use crate::quiz::QuizGenerator;
use crate::services::{PlannerService, QuizSetService};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub clock: Arc<dyn Clock>,
    pub quiz: Arc<dyn QuizGenerator>,
}

impl AppState {
    pub fn planner(&self) -> PlannerService {
        PlannerService::new(self.db.clone(), self.clock.clone())
    }

    pub fn quiz_sets(&self) -> QuizSetService {
        QuizSetService::new(self.db.clone(), self.quiz.clone())
    }
}
