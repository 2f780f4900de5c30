use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    pub exam_date: NaiveDate,
    pub priority: u8,
    pub created_at: String,
}

impl Course {
    /// Validates `req` and builds a course with a fresh id.
    pub fn new(req: NewCourseRequest) -> Result<Self, Vec<String>> {
        let errors = req.validate();
        let (Some(exam_date), Some(priority)) = (req.exam_date, req.priority) else {
            return Err(errors);
        };
        let Ok(priority) = u8::try_from(priority) else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: req.name.trim().to_string(),
            exam_date,
            priority,
            created_at: Utc::now().to_rfc3339(),
        })
    }

    pub fn validate(&self) -> Vec<String> {
        NewCourseRequest {
            name: self.name.clone(),
            exam_date: Some(self.exam_date),
            priority: Some(i64::from(self.priority)),
        }
        .validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exam_date: Option<NaiveDate>,
    #[serde(default, alias = "workload")]
    pub priority: Option<i64>,
}

impl NewCourseRequest {
    /// Returns every failing rule, empty when the request is acceptable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().chars().count() < 2 {
            errors.push("Course name is required (min 2 characters).".to_string());
        }

        if self.exam_date.is_none() {
            errors.push("Exam date is required.".to_string());
        }

        let range = i64::from(MIN_PRIORITY)..=i64::from(MAX_PRIORITY);
        if !self.priority.is_some_and(|p| range.contains(&p)) {
            errors.push("Priority must be a number between 1 and 10.".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, priority: i64) -> NewCourseRequest {
        NewCourseRequest {
            name: name.to_string(),
            exam_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            priority: Some(priority),
        }
    }

    #[test]
    fn accepts_valid_request() {
        assert!(request("Algebra", 5).validate().is_empty());
    }

    #[test]
    fn rejects_short_name_after_trim() {
        let errors = request("  A ", 5).validate();
        assert_eq!(errors, vec!["Course name is required (min 2 characters).".to_string()]);
    }

    #[test]
    fn reports_every_failing_rule() {
        assert_eq!(request("", 0).validate().len(), 2);
        assert_eq!(request("Physics", 11).validate().len(), 1);
    }

    #[test]
    fn missing_exam_date_and_priority_are_reported() {
        let req: NewCourseRequest = serde_json::from_str(r#"{"name":"Biology"}"#).unwrap();
        assert_eq!(
            req.validate(),
            vec![
                "Exam date is required.".to_string(),
                "Priority must be a number between 1 and 10.".to_string(),
            ]
        );
        assert!(Course::new(req).is_err());
    }

    #[test]
    fn new_trims_name_and_assigns_id() {
        let course = Course::new(request("  Chemistry ", 7)).unwrap();
        assert_eq!(course.name, "Chemistry");
        assert_eq!(course.priority, 7);
        assert!(Uuid::parse_str(&course.id).is_ok());
    }

    #[test]
    fn new_rejects_out_of_range_priority() {
        let errors = Course::new(request("Chemistry", 300)).unwrap_err();
        assert_eq!(errors, vec!["Priority must be a number between 1 and 10.".to_string()]);

        assert!(Course::new(request("Chemistry", -1)).is_err());
    }

    #[test]
    fn workload_alias_is_accepted() {
        let req: NewCourseRequest =
            serde_json::from_str(r#"{"name":"Biology","examDate":"2025-06-01","workload":3}"#).unwrap();
        assert_eq!(req.priority, Some(3));
    }
}
