use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "Final Review")]
    FinalReview,
    #[serde(rename = "Revision")]
    Revision,
    #[serde(rename = "Focused Study")]
    FocusedStudy,
}

impl SessionType {
    /// Classifies a session by how many days remain until the exam.
    pub fn for_days_to_exam(days: i64) -> Self {
        match days {
            d if d <= 3 => SessionType::FinalReview,
            d if d <= 7 => SessionType::Revision,
            _ => SessionType::FocusedStudy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::FinalReview => "Final Review",
            SessionType::Revision => "Revision",
            SessionType::FocusedStudy => "Focused Study",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Final Review" => Ok(SessionType::FinalReview),
            "Revision" => Ok(SessionType::Revision),
            "Focused Study" => Ok(SessionType::FocusedStudy),
            other => Err(format!("unknown session type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub date: NaiveDate,
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub course_id: String,
    pub course_name: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
}
