use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::db::repository;
use crate::error::AppError;
use crate::models::{NewAttemptRequest, NewQuizSetRequest, QuizAttempt, QuizSet};
use crate::quiz::{QuizGenerator, QuizRequest};

pub struct QuizSetService {
    db: SqlitePool,
    quiz: Arc<dyn QuizGenerator>,
}

impl QuizSetService {
    pub fn new(db: SqlitePool, quiz: Arc<dyn QuizGenerator>) -> Self {
        Self { db, quiz }
    }

    pub async fn create(&self, req: NewQuizSetRequest) -> Result<QuizSet, AppError> {
        let set = QuizSet::new(req).map_err(|errors| AppError::BadRequest(errors.join(" ")))?;
        repository::insert_quiz_set(&self.db, &set).await?;
        info!("created quiz set {} ({})", set.title, set.id);
        Ok(set)
    }

    pub async fn list(&self) -> Result<Vec<QuizSet>, AppError> {
        repository::fetch_quiz_sets(&self.db).await
    }

    pub async fn get(&self, id: &str) -> Result<QuizSet, AppError> {
        repository::fetch_quiz_set(&self.db, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if !repository::delete_quiz_set(&self.db, id).await? {
            return Err(AppError::NotFound);
        }
        info!("deleted quiz set {}", id);
        Ok(())
    }

    /// Replaces the set's questions with a fresh batch that avoids earlier prompts.
    pub async fn generate(&self, id: &str, count: Option<u32>) -> Result<QuizSet, AppError> {
        let mut set = self.get(id).await?;

        let req = QuizRequest {
            title: Some(set.title.clone()),
            text: set.source_text.clone(),
            count,
            avoid: set.avoid_list(),
        };
        let questions = self.quiz.generate(&req).await?;
        if questions.is_empty() {
            warn!("quiz service returned no questions for set {}", id);
            return Err(AppError::Upstream(
                "AI returned no questions. Try uploading more material.".to_string(),
            ));
        }

        set.apply_questions(questions);
        self.store(&set).await?;
        info!("generated {} questions for quiz set {}", set.questions.len(), id);
        Ok(set)
    }

    /// Returns the stored summary, asking the generator only when none exists yet.
    pub async fn summarize(&self, id: &str) -> Result<QuizSet, AppError> {
        let mut set = self.get(id).await?;
        if !set.summary.trim().is_empty() {
            return Ok(set);
        }

        let summary = self.quiz.summarize(&set.title, &set.source_text).await?;
        set.summary = summary.trim().to_string();
        if set.summary.is_empty() {
            return Err(AppError::Upstream("AI returned an empty summary.".to_string()));
        }

        self.store(&set).await?;
        Ok(set)
    }

    pub async fn record_attempt(&self, id: &str, req: NewAttemptRequest) -> Result<QuizAttempt, AppError> {
        let mut set = self.get(id).await?;
        let attempt = set
            .record_attempt(req)
            .map_err(AppError::BadRequest)?
            .clone();

        self.store(&set).await?;
        info!("recorded attempt {}/{} for quiz set {}", attempt.score, attempt.total, id);
        Ok(attempt)
    }

    async fn store(&self, set: &QuizSet) -> Result<(), AppError> {
        if !repository::update_quiz_set(&self.db, set).await? {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
