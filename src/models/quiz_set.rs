use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_TITLE_CHARS: usize = 3;
pub const MIN_MATERIAL_CHARS: usize = 30;
/// Attempts kept per set, newest first.
pub const MAX_ATTEMPTS: usize = 4;
pub const PROMPT_HISTORY_LIMIT: usize = 140;
/// Prompts sent back to the generator as the avoid list.
pub const AVOID_LIMIT: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer_index: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: String,
    pub taken_at: String,
    pub score: u32,
    pub total: u32,
    #[serde(default)]
    pub answers: Vec<Option<usize>>,
    pub minutes_planned: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSet {
    pub id: String,
    pub title: String,
    pub source_text: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub prompt_history: Vec<String>,
    #[serde(default)]
    pub attempts: Vec<QuizAttempt>,
    #[serde(default)]
    pub summary: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuizSetRequest {
    pub title: String,
    pub source_text: String,
    #[serde(default)]
    pub course_id: Option<String>,
}

impl NewQuizSetRequest {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.title.trim().chars().count() < MIN_TITLE_CHARS {
            errors.push("Please enter a title (min 3 characters).".to_string());
        }

        if self.source_text.trim().chars().count() < MIN_MATERIAL_CHARS {
            errors.push(
                "Please provide at least 30 characters of course material.".to_string(),
            );
        }

        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttemptRequest {
    pub score: u32,
    #[serde(default)]
    pub answers: Vec<Option<usize>>,
}

impl QuizSet {
    pub fn new(req: NewQuizSetRequest) -> Result<Self, Vec<String>> {
        let errors = req.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title: req.title.trim().to_string(),
            source_text: req.source_text,
            course_id: req.course_id.filter(|id| !id.is_empty()),
            questions: Vec::new(),
            prompt_history: Vec::new(),
            attempts: Vec::new(),
            summary: String::new(),
            created_at: Utc::now().to_rfc3339(),
        })
    }

    /// Prompts the generator should steer away from, most recent first.
    pub fn avoid_list(&self) -> Vec<String> {
        let source: Vec<&str> = if self.prompt_history.is_empty() {
            self.questions.iter().map(|q| q.prompt.as_str()).collect()
        } else {
            self.prompt_history.iter().map(String::as_str).collect()
        };

        source
            .into_iter()
            .filter(|p| !p.is_empty())
            .take(AVOID_LIMIT)
            .map(str::to_string)
            .collect()
    }

    /// Replaces the current questions and records their prompts in the history.
    pub fn apply_questions(&mut self, questions: Vec<Question>) {
        let mut history: Vec<String> = questions
            .iter()
            .map(|q| q.prompt.clone())
            .filter(|p| !p.is_empty())
            .collect();
        history.append(&mut self.prompt_history);
        history.truncate(PROMPT_HISTORY_LIMIT);

        self.prompt_history = history;
        self.questions = questions;
    }

    pub fn record_attempt(&mut self, req: NewAttemptRequest) -> Result<&QuizAttempt, String> {
        let total = self.questions.len() as u32;
        if total == 0 {
            return Err("This quiz set has no questions yet.".to_string());
        }
        if req.score > total {
            return Err(format!("Score {} exceeds the {} questions in this set.", req.score, total));
        }

        let attempt = QuizAttempt {
            id: Uuid::new_v4().to_string(),
            taken_at: Utc::now().to_rfc3339(),
            score: req.score,
            total,
            answers: req.answers,
            minutes_planned: quiz_minutes(total),
        };

        self.attempts.insert(0, attempt);
        self.attempts.truncate(MAX_ATTEMPTS);
        Ok(&self.attempts[0])
    }

    pub fn best_score(&self) -> u32 {
        self.attempts.iter().map(|a| a.score).max().unwrap_or(0)
    }
}

/// Minutes allotted to a quiz of `count` questions.
pub fn quiz_minutes(count: u32) -> u32 {
    (count * 3).div_ceil(2).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, text: &str) -> NewQuizSetRequest {
        NewQuizSetRequest {
            title: title.to_string(),
            source_text: text.to_string(),
            course_id: Some(String::new()),
        }
    }

    fn question(prompt: &str) -> Question {
        Question {
            prompt: prompt.to_string(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            answer_index: 2,
            explanation: String::new(),
        }
    }

    fn material() -> String {
        "Cells are the basic unit of life in every organism.".to_string()
    }

    #[test]
    fn new_validates_title_and_material() {
        let errors = QuizSet::new(request("Hi", "short")).unwrap_err();
        assert_eq!(errors.len(), 2);

        let set = QuizSet::new(request("  Biology ", &material())).unwrap();
        assert_eq!(set.title, "Biology");
        assert_eq!(set.course_id, None);
        assert!(set.questions.is_empty());
    }

    #[test]
    fn apply_questions_prepends_prompts_to_history() {
        let mut set = QuizSet::new(request("Biology", &material())).unwrap();
        set.apply_questions(vec![question("q1"), question("q2")]);
        set.apply_questions(vec![question("q3")]);

        assert_eq!(set.questions.len(), 1);
        assert_eq!(set.prompt_history, vec!["q3", "q1", "q2"]);
        assert_eq!(set.avoid_list(), vec!["q3", "q1", "q2"]);
    }

    #[test]
    fn history_and_avoid_list_are_capped() {
        let mut set = QuizSet::new(request("Biology", &material())).unwrap();
        for round in 0..30 {
            set.apply_questions((0..5).map(|i| question(&format!("r{}q{}", round, i))).collect());
        }

        assert_eq!(set.prompt_history.len(), PROMPT_HISTORY_LIMIT);
        assert_eq!(set.prompt_history[0], "r29q0");
        assert_eq!(set.avoid_list().len(), AVOID_LIMIT);
    }

    #[test]
    fn only_latest_four_attempts_are_kept() {
        let mut set = QuizSet::new(request("Biology", &material())).unwrap();
        set.apply_questions((0..10).map(|i| question(&format!("q{}", i))).collect());

        for score in [3, 9, 5, 6, 7] {
            set.record_attempt(NewAttemptRequest { score, answers: Vec::new() }).unwrap();
        }

        let scores: Vec<u32> = set.attempts.iter().map(|a| a.score).collect();
        assert_eq!(scores, vec![7, 6, 5, 9]);
        assert_eq!(set.best_score(), 9);
        assert_eq!(set.attempts[0].total, 10);
        assert_eq!(set.attempts[0].minutes_planned, 15);
    }

    #[test]
    fn attempt_needs_questions_and_sane_score() {
        let mut set = QuizSet::new(request("Biology", &material())).unwrap();
        assert!(set.record_attempt(NewAttemptRequest { score: 0, answers: Vec::new() }).is_err());

        set.apply_questions(vec![question("q1")]);
        assert!(set.record_attempt(NewAttemptRequest { score: 2, answers: Vec::new() }).is_err());
        assert_eq!(set.best_score(), 0);
    }

    #[test]
    fn quiz_minutes_rounds_up() {
        assert_eq!(quiz_minutes(0), 1);
        assert_eq!(quiz_minutes(5), 8);
        assert_eq!(quiz_minutes(10), 15);
    }
}
