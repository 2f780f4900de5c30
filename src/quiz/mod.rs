pub mod dto;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AppError;
pub use crate::models::Question;

pub const MIN_SOURCE_CHARS: usize = 80;
pub const MIN_QUESTIONS: u32 = 5;
pub const MAX_QUESTIONS: u32 = 25;
pub const DEFAULT_QUESTIONS: u32 = 10;
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(alias = "sourceText")]
    pub text: String,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default, alias = "avoidList")]
    pub avoid: Vec<String>,
}

impl QuizRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.text.trim().chars().count() < MIN_SOURCE_CHARS {
            return Err(AppError::BadRequest(
                "Please provide more study material text.".to_string(),
            ));
        }
        Ok(())
    }

    pub fn question_count(&self) -> u32 {
        self.count
            .filter(|c| *c > 0)
            .unwrap_or(DEFAULT_QUESTIONS)
            .clamp(MIN_QUESTIONS, MAX_QUESTIONS)
    }

    pub fn title_or_default(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled")
    }
}

impl Question {
    /// Accepts only four-option questions whose answer points at one of them.
    pub fn from_raw(raw: dto::RawQuestion) -> Option<Self> {
        if raw.prompt.trim().is_empty() || raw.options.len() != OPTIONS_PER_QUESTION {
            return None;
        }

        let answer_index = match (raw.answer_index, raw.answer.as_deref()) {
            (Some(i), _) => i,
            (None, Some(answer)) => raw.options.iter().position(|o| o == answer)?,
            (None, None) => return None,
        };
        if answer_index >= raw.options.len() {
            return None;
        }

        Some(Self {
            prompt: raw.prompt,
            options: raw.options,
            answer_index,
            explanation: raw.explanation.unwrap_or_default(),
        })
    }
}

#[derive(Clone, Debug)]
pub struct QuizConfig {
    pub base_url: String,
}

#[async_trait]
pub trait QuizGenerator: Send + Sync {
    async fn generate(&self, req: &QuizRequest) -> Result<Vec<Question>, AppError>;

    async fn summarize(&self, title: &str, source_text: &str) -> Result<String, AppError>;
}

pub struct QuizHttpClient {
    client: Client,
    config: QuizConfig,
}

impl QuizHttpClient {
    pub fn new(config: QuizConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Upstream(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl QuizGenerator for QuizHttpClient {
    async fn generate(&self, req: &QuizRequest) -> Result<Vec<Question>, AppError> {
        req.validate()?;

        let url = format!("{}/api/generate-mcqs", self.config.base_url);
        let body = dto::GenerateRequest {
            title: req.title_or_default(),
            source_text: &req.text,
            count: req.question_count(),
            avoid_list: &req.avoid,
        };

        let response = self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<dto::ServiceError>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(AppError::Upstream(format!("{}: {}", status, message)));
        }

        let parsed: dto::GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse quiz response: {}", e)))?;

        let received = parsed.questions.len();
        let questions: Vec<Question> = parsed
            .questions
            .into_iter()
            .filter_map(Question::from_raw)
            .collect();

        if questions.len() < received {
            warn!("dropped {} malformed questions", received - questions.len());
        }
        debug!("quiz service returned {} usable questions", questions.len());

        Ok(questions)
    }

    async fn summarize(&self, title: &str, source_text: &str) -> Result<String, AppError> {
        let url = format!("{}/api/summarize", self.config.base_url);
        let body = dto::SummarizeRequest { title, source_text };

        let response = self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<dto::ServiceError>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(AppError::Upstream(format!("{}: {}", status, message)));
        }

        let parsed: dto::SummarizeResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse summary response: {}", e)))?;

        let summary = parsed.summary.trim().to_string();
        if summary.is_empty() {
            return Err(AppError::Upstream("AI returned an empty summary.".to_string()));
        }
        Ok(summary)
    }
}

/// Used when no quiz service is configured.
pub struct NoopQuizGenerator;

#[async_trait]
impl QuizGenerator for NoopQuizGenerator {
    async fn generate(&self, req: &QuizRequest) -> Result<Vec<Question>, AppError> {
        req.validate()?;
        Err(AppError::Upstream("quiz service is not configured".to_string()))
    }

    async fn summarize(&self, _title: &str, _source_text: &str) -> Result<String, AppError> {
        Err(AppError::Upstream("quiz service is not configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(options: &[&str], answer_index: Option<usize>, answer: Option<&str>) -> dto::RawQuestion {
        dto::RawQuestion {
            prompt: "What is the powerhouse of the cell?".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer_index,
            answer: answer.map(str::to_string),
            explanation: None,
        }
    }

    #[test]
    fn question_count_is_clamped() {
        let mut req = QuizRequest {
            title: None,
            text: String::new(),
            count: None,
            avoid: Vec::new(),
        };
        assert_eq!(req.question_count(), 10);
        req.count = Some(1);
        assert_eq!(req.question_count(), 5);
        req.count = Some(100);
        assert_eq!(req.question_count(), 25);
    }

    #[test]
    fn zero_count_falls_back_to_default() {
        let req = QuizRequest {
            title: None,
            text: String::new(),
            count: Some(0),
            avoid: Vec::new(),
        };
        assert_eq!(req.question_count(), DEFAULT_QUESTIONS);
    }

    #[test]
    fn short_material_is_rejected() {
        let req = QuizRequest {
            title: Some("Biology".to_string()),
            text: "too short".to_string(),
            count: Some(5),
            avoid: Vec::new(),
        };
        assert!(matches!(req.validate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn answer_text_resolves_to_index() {
        let q = Question::from_raw(raw(&["Nucleus", "Mitochondria", "Ribosome", "Golgi"], None, Some("Mitochondria")))
            .unwrap();
        assert_eq!(q.answer_index, 1);
    }

    #[test]
    fn malformed_questions_are_dropped() {
        assert!(Question::from_raw(raw(&["a", "b", "c"], Some(0), None)).is_none());
        assert!(Question::from_raw(raw(&["a", "b", "c", "d"], Some(4), None)).is_none());
        assert!(Question::from_raw(raw(&["a", "b", "c", "d"], None, Some("e"))).is_none());
    }

    #[test]
    fn blank_title_defaults_to_untitled() {
        let req = QuizRequest {
            title: Some("   ".to_string()),
            text: String::new(),
            count: None,
            avoid: Vec::new(),
        };
        assert_eq!(req.title_or_default(), "Untitled");
    }
}
