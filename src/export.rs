use crate::models::StudySession;

pub const TEXT_TITLE: &str = "CramLess — Generated Study Schedule";
const TEXT_RULE: &str = "----------------------------------";
const CSV_HEADER: [&str; 5] = ["Date", "Start", "End", "Course", "Type"];

/// `HH:MM` for a minute-of-day offset.
pub fn format_minutes(total: u32) -> String {
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub fn to_plain_text(sessions: &[StudySession]) -> String {
    let mut lines = vec![TEXT_TITLE.to_string(), TEXT_RULE.to_string()];
    lines.extend(sessions.iter().map(|s| {
        format!(
            "{} | {}–{} | {} | {}",
            s.date,
            format_minutes(s.start_minutes),
            format_minutes(s.end_minutes),
            s.course_name,
            s.session_type
        )
    }));
    lines.join("\n")
}

pub fn to_csv(sessions: &[StudySession]) -> String {
    let header = CSV_HEADER.iter().map(|h| escape_csv(h)).collect::<Vec<_>>().join(",");

    let rows = sessions.iter().map(|s| {
        [
            s.date.to_string(),
            format_minutes(s.start_minutes),
            format_minutes(s.end_minutes),
            s.course_name.clone(),
            s.session_type.to_string(),
        ]
        .iter()
        .map(|v| escape_csv(v))
        .collect::<Vec<_>>()
        .join(",")
    });

    std::iter::once(header).chain(rows).collect::<Vec<_>>().join("\n")
}

fn escape_csv(value: &str) -> String {
    if value.contains(['"', ',', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::SessionType;

    fn session(name: &str, start: u32) -> StudySession {
        StudySession {
            date: NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
            start_minutes: start,
            end_minutes: start + 45,
            course_id: "c".to_string(),
            course_name: name.to_string(),
            session_type: SessionType::Revision,
        }
    }

    #[test]
    fn formats_minutes_zero_padded() {
        assert_eq!(format_minutes(0), "00:00");
        assert_eq!(format_minutes(545), "09:05");
        assert_eq!(format_minutes(1439), "23:59");
    }

    #[test]
    fn plain_text_has_header_and_one_line_per_session() {
        let text = to_plain_text(&[session("Physics", 1080)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], TEXT_TITLE);
        assert_eq!(lines[2], "2025-02-03 | 18:00–18:45 | Physics | Revision");
    }

    #[test]
    fn csv_quotes_special_values() {
        let csv = to_csv(&[session("Law, \"Intro\"", 600)]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Date,Start,End,Course,Type");
        assert_eq!(lines[1], "2025-02-03,10:00,10:45,\"Law, \"\"Intro\"\"\",Revision");
    }

    #[test]
    fn empty_schedule_exports_header_only() {
        assert_eq!(to_csv(&[]), "Date,Start,End,Course,Type");
        assert_eq!(to_plain_text(&[]).lines().count(), 2);
    }
}
