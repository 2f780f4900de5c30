use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::error::ScheduleError;
use crate::models::{AvailabilityProfile, Course, SessionType, StudySession};

pub const MIN_SESSION_MINUTES: u32 = 15;

/// Need consumed by the course that wins a slot, independent of slot length.
const NEED_PER_SLOT: f64 = 1.0;

/// One fixed-length window on one study day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub date: NaiveDate,
    pub slot_index: u32,
    pub start_minutes: u32,
    pub end_minutes: u32,
}

/// Per-run fairness bookkeeping for one course.
#[derive(Debug)]
struct CourseStat<'a> {
    course: &'a Course,
    weight: f64,
    need: f64,
}

/// Whole calendar days from `from` to `to`, never negative.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days().max(0)
}

/// Distributes study slots from `today` through the latest exam among the courses.
///
/// Every slot goes to the course with the largest accumulated need. Each slot
/// first adds every course's weight (`priority / days until exam`) to its need,
/// then the winner gives back one unit. Ties go to the course listed first.
pub fn generate_schedule(
    courses: &[Course],
    availability: &AvailabilityProfile,
    today: NaiveDate,
) -> Result<Vec<StudySession>, ScheduleError> {
    let latest_exam = courses
        .iter()
        .map(|c| c.exam_date)
        .max()
        .ok_or(ScheduleError::NoCourses)?;

    if availability.days.is_empty() {
        return Err(ScheduleError::NoStudyDays);
    }

    let start = availability.start_minutes();
    let end = availability.end_minutes();
    if end <= start {
        return Err(ScheduleError::InvalidTimeWindow);
    }

    let session = availability.session_minutes;
    if session < MIN_SESSION_MINUTES {
        return Err(ScheduleError::SessionTooShort);
    }

    let slots_per_day = (end - start) / session;
    if slots_per_day < 1 {
        return Err(ScheduleError::WindowTooSmall);
    }

    let horizon = days_between(today, latest_exam);
    if horizon < 1 {
        return Err(ScheduleError::NoFutureExam);
    }

    let slots = build_slots(availability, today, horizon, slots_per_day);
    debug!(
        "scheduling {} slots across {} courses (horizon {} days)",
        slots.len(),
        courses.len(),
        horizon
    );

    let mut stats: Vec<CourseStat> = courses
        .iter()
        .map(|course| {
            let days_until_exam = days_between(today, course.exam_date).max(1);
            let weight = f64::from(course.priority) / days_until_exam as f64;
            CourseStat { course, weight, need: weight }
        })
        .collect();

    let sessions = slots
        .iter()
        .map(|slot| {
            for stat in stats.iter_mut() {
                stat.need += stat.weight;
            }

            let chosen = pick_neediest(&stats);
            let stat = &mut stats[chosen];
            stat.need = (stat.need - NEED_PER_SLOT).max(0.0);

            let days_to_exam = days_between(slot.date, stat.course.exam_date).max(1);

            StudySession {
                date: slot.date,
                start_minutes: slot.start_minutes,
                end_minutes: slot.end_minutes,
                course_id: stat.course.id.clone(),
                course_name: stat.course.name.clone(),
                session_type: SessionType::for_days_to_exam(days_to_exam),
            }
        })
        .collect();

    Ok(sessions)
}

/// Enumerates slots chronologically, then by position within the day.
pub fn build_slots(
    availability: &AvailabilityProfile,
    today: NaiveDate,
    horizon_days: i64,
    slots_per_day: u32,
) -> Vec<Slot> {
    let start = availability.start_minutes();
    let session = availability.session_minutes;

    (0..=horizon_days)
        .map(|offset| today + Duration::days(offset))
        .filter(|date| availability.includes(date.weekday()))
        .flat_map(|date| {
            (0..slots_per_day).map(move |i| {
                let start_minutes = start + i * session;
                Slot {
                    date,
                    slot_index: i + 1,
                    start_minutes,
                    end_minutes: start_minutes + session,
                }
            })
        })
        .collect()
}

// First index wins on equal need.
fn pick_neediest(stats: &[CourseStat]) -> usize {
    let mut best = 0;
    for (i, stat) in stats.iter().enumerate().skip(1) {
        if stat.need > stats[best].need {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, Weekday};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn availability(days: Vec<Weekday>, start: (u32, u32), end: (u32, u32), minutes: u32) -> AvailabilityProfile {
        AvailabilityProfile {
            days,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            session_minutes: minutes,
        }
    }

    #[test]
    fn days_between_clamps_at_zero() {
        assert_eq!(days_between(date(2025, 1, 10), date(2025, 1, 13)), 3);
        assert_eq!(days_between(date(2025, 1, 13), date(2025, 1, 10)), 0);
        assert_eq!(days_between(date(2024, 2, 28), date(2024, 3, 1)), 2);
    }

    #[test]
    fn build_slots_keeps_selected_weekdays_only() {
        // 2025-01-06 is a Monday
        let profile = availability(vec![Weekday::Mon, Weekday::Wed], (9, 0), (10, 30), 45);
        let slots = build_slots(&profile, date(2025, 1, 6), 7, 2);

        let dates: Vec<NaiveDate> = slots.iter().map(|s| s.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2025, 1, 6),
                date(2025, 1, 6),
                date(2025, 1, 8),
                date(2025, 1, 8),
                date(2025, 1, 13),
                date(2025, 1, 13),
            ]
        );
        assert_eq!(slots[1].slot_index, 2);
        assert_eq!(slots[1].start_minutes, 9 * 60 + 45);
        assert_eq!(slots[1].end_minutes, 10 * 60 + 30);
    }

    #[test]
    fn pick_neediest_prefers_first_on_ties() {
        let a = Course {
            id: "a".into(),
            name: "A".into(),
            exam_date: date(2025, 1, 10),
            priority: 1,
            created_at: String::new(),
        };
        let b = Course { id: "b".into(), ..a.clone() };
        let stats = vec![
            CourseStat { course: &a, weight: 1.0, need: 2.0 },
            CourseStat { course: &b, weight: 1.0, need: 2.0 },
        ];
        assert_eq!(pick_neediest(&stats), 0);
    }
}
