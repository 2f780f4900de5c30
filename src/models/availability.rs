use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityProfile {
    pub days: Vec<Weekday>,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub session_minutes: u32,
}

impl AvailabilityProfile {
    pub fn includes(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    pub fn start_minutes(&self) -> u32 {
        to_minutes(self.start_time)
    }

    pub fn end_minutes(&self) -> u32 {
        to_minutes(self.end_time)
    }

    /// Drops repeated weekday labels, keeping first occurrences.
    pub fn normalized(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.days.len());
        self.days.retain(|d| {
            if seen.contains(d) {
                false
            } else {
                seen.push(*d);
                true
            }
        });
        self
    }
}

impl Default for AvailabilityProfile {
    fn default() -> Self {
        Self {
            days: Vec::new(),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            end_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN),
            session_minutes: 60,
        }
    }
}

pub fn to_minutes(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// `HH:mm` wire format for times of day.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, String> {
        NaiveTime::parse_from_str(raw.trim(), FORMAT)
            .map_err(|e| format!("invalid time of day '{}': {}", raw, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_evening_window() {
        let profile = AvailabilityProfile::default();
        assert!(profile.days.is_empty());
        assert_eq!(profile.start_minutes(), 18 * 60);
        assert_eq!(profile.end_minutes(), 20 * 60);
        assert_eq!(profile.session_minutes, 60);
    }

    #[test]
    fn deserializes_camel_case_with_day_labels() {
        let profile: AvailabilityProfile = serde_json::from_str(
            r#"{"days":["Mon","Wed"],"startTime":"07:30","endTime":"09:15","sessionMinutes":45}"#,
        )
        .unwrap();

        assert_eq!(profile.days, vec![Weekday::Mon, Weekday::Wed]);
        assert_eq!(profile.start_minutes(), 450);
        assert_eq!(profile.end_minutes(), 555);
        assert!(profile.includes(Weekday::Wed));
        assert!(!profile.includes(Weekday::Fri));
    }

    #[test]
    fn serializes_times_as_hh_mm() {
        let json = serde_json::to_value(AvailabilityProfile::default()).unwrap();
        assert_eq!(json["startTime"], "18:00");
        assert_eq!(json["endTime"], "20:00");
    }

    #[test]
    fn rejects_malformed_time() {
        let result: Result<AvailabilityProfile, _> = serde_json::from_str(
            r#"{"days":["Mon"],"startTime":"25:99","endTime":"20:00","sessionMinutes":60}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn normalized_removes_duplicate_days() {
        let profile = AvailabilityProfile {
            days: vec![Weekday::Tue, Weekday::Mon, Weekday::Tue],
            ..AvailabilityProfile::default()
        }
        .normalized();
        assert_eq!(profile.days, vec![Weekday::Tue, Weekday::Mon]);
    }
}
