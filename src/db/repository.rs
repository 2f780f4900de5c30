use chrono::{NaiveDate, Weekday};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::error::AppError;
use crate::models::availability::hhmm;
use crate::models::{AvailabilityProfile, Course, PlannerState, QuizSet, SessionType, StudySession};

#[derive(Debug, FromRow)]
struct CourseRow {
    id: String,
    name: String,
    exam_date: String,
    priority: i64,
    created_at: String,
}

impl TryFrom<CourseRow> for Course {
    type Error = AppError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Course {
            exam_date: parse_date(&row.exam_date)?,
            priority: u8::try_from(row.priority).map_err(|_| {
                AppError::CorruptState(format!("priority {} out of range", row.priority))
            })?,
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AvailabilityRow {
    days: String,
    start_time: String,
    end_time: String,
    session_minutes: i64,
}

impl TryFrom<AvailabilityRow> for AvailabilityProfile {
    type Error = AppError;

    fn try_from(row: AvailabilityRow) -> Result<Self, Self::Error> {
        let days = row
            .days
            .split(',')
            .filter(|d| !d.is_empty())
            .map(|d| {
                d.parse::<Weekday>()
                    .map_err(|_| AppError::CorruptState(format!("unknown weekday '{}'", d)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AvailabilityProfile {
            days,
            start_time: hhmm::parse(&row.start_time).map_err(AppError::CorruptState)?,
            end_time: hhmm::parse(&row.end_time).map_err(AppError::CorruptState)?,
            session_minutes: u32::try_from(row.session_minutes).map_err(|_| {
                AppError::CorruptState(format!("session length {} out of range", row.session_minutes))
            })?,
        })
    }
}

#[derive(Debug, FromRow)]
struct SessionRow {
    date: String,
    start_minutes: i64,
    end_minutes: i64,
    course_id: String,
    course_name: String,
    session_type: String,
}

impl TryFrom<SessionRow> for StudySession {
    type Error = AppError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        Ok(StudySession {
            date: parse_date(&row.date)?,
            start_minutes: parse_minutes(row.start_minutes)?,
            end_minutes: parse_minutes(row.end_minutes)?,
            course_id: row.course_id,
            course_name: row.course_name,
            session_type: row
                .session_type
                .parse::<SessionType>()
                .map_err(AppError::CorruptState)?,
        })
    }
}

#[derive(Debug, FromRow)]
struct QuizSetRow {
    id: String,
    title: String,
    source_text: String,
    course_id: Option<String>,
    questions: String,
    prompt_history: String,
    attempts: String,
    summary: String,
    created_at: String,
}

impl TryFrom<QuizSetRow> for QuizSet {
    type Error = AppError;

    fn try_from(row: QuizSetRow) -> Result<Self, Self::Error> {
        Ok(QuizSet {
            questions: parse_json(&row.id, "questions", &row.questions)?,
            prompt_history: parse_json(&row.id, "prompt history", &row.prompt_history)?,
            attempts: parse_json(&row.id, "attempts", &row.attempts)?,
            id: row.id,
            title: row.title,
            source_text: row.source_text,
            course_id: row.course_id,
            summary: row.summary,
            created_at: row.created_at,
        })
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(id: &str, field: &str, raw: &str) -> Result<T, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::CorruptState(format!("quiz set {} has invalid {}: {}", id, field, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value)
        .map_err(|e| AppError::CorruptState(format!("Failed to encode quiz set: {}", e)))
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| AppError::CorruptState(format!("invalid date '{}': {}", raw, e)))
}

fn parse_minutes(raw: i64) -> Result<u32, AppError> {
    u32::try_from(raw).map_err(|_| AppError::CorruptState(format!("invalid minute offset {}", raw)))
}

pub async fn fetch_courses(db: &SqlitePool) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT id, name, exam_date, priority, created_at
        FROM courses
        ORDER BY rowid ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    rows.into_iter().map(Course::try_from).collect()
}

pub async fn insert_course(db: &SqlitePool, course: &Course) -> Result<(), AppError> {
    let mut conn = db.acquire().await?;
    write_course(&mut conn, course).await
}

async fn write_course(conn: &mut SqliteConnection, course: &Course) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO courses (id, name, exam_date, priority, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&course.id)
    .bind(&course.name)
    .bind(course.exam_date.format("%Y-%m-%d").to_string())
    .bind(i64::from(course.priority))
    .bind(&course.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Returns whether a course was removed. Its sessions stay stored and are
/// filtered out by `fetch_schedule`.
pub async fn delete_course(db: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn fetch_availability(db: &SqlitePool) -> Result<AvailabilityProfile, AppError> {
    let row = sqlx::query_as::<_, AvailabilityRow>(
        "SELECT days, start_time, end_time, session_minutes FROM availability WHERE id = 1",
    )
    .fetch_optional(db)
    .await?;

    match row {
        Some(row) => AvailabilityProfile::try_from(row),
        None => Ok(AvailabilityProfile::default()),
    }
}

pub async fn save_availability(
    db: &SqlitePool,
    availability: &AvailabilityProfile,
) -> Result<(), AppError> {
    let mut conn = db.acquire().await?;
    write_availability(&mut conn, availability).await
}

async fn write_availability(
    conn: &mut SqliteConnection,
    availability: &AvailabilityProfile,
) -> Result<(), AppError> {
    let days = availability
        .days
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",");

    sqlx::query(
        r#"
        INSERT INTO availability (id, days, start_time, end_time, session_minutes)
        VALUES (1, ?1, ?2, ?3, ?4)
        ON CONFLICT(id) DO UPDATE SET
            days = excluded.days,
            start_time = excluded.start_time,
            end_time = excluded.end_time,
            session_minutes = excluded.session_minutes
        "#,
    )
    .bind(days)
    .bind(availability.start_time.format(hhmm::FORMAT).to_string())
    .bind(availability.end_time.format(hhmm::FORMAT).to_string())
    .bind(i64::from(availability.session_minutes))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Stored schedule in slot order, without sessions of deleted courses.
pub async fn fetch_schedule(db: &SqlitePool) -> Result<Vec<StudySession>, AppError> {
    let rows = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT date, start_minutes, end_minutes, course_id, course_name, session_type
        FROM study_sessions
        WHERE course_id IN (SELECT id FROM courses)
        ORDER BY position ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    rows.into_iter().map(StudySession::try_from).collect()
}

/// Every stored session, including ones whose course was deleted.
pub async fn fetch_raw_schedule(db: &SqlitePool) -> Result<Vec<StudySession>, AppError> {
    let rows = sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT date, start_minutes, end_minutes, course_id, course_name, session_type
        FROM study_sessions
        ORDER BY position ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    rows.into_iter().map(StudySession::try_from).collect()
}

/// Swaps the stored schedule for `sessions` in a single transaction.
pub async fn replace_schedule(db: &SqlitePool, sessions: &[StudySession]) -> Result<(), AppError> {
    let mut tx = db.begin().await?;
    write_schedule(&mut tx, sessions).await?;
    tx.commit().await?;
    Ok(())
}

async fn write_schedule(conn: &mut SqliteConnection, sessions: &[StudySession]) -> Result<(), AppError> {
    sqlx::query("DELETE FROM study_sessions")
        .execute(&mut *conn)
        .await?;

    for (position, session) in sessions.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO study_sessions
                (position, date, start_minutes, end_minutes, course_id, course_name, session_type)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(position as i64)
        .bind(session.date.format("%Y-%m-%d").to_string())
        .bind(i64::from(session.start_minutes))
        .bind(i64::from(session.end_minutes))
        .bind(&session.course_id)
        .bind(&session.course_name)
        .bind(session.session_type.as_str())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn clear_schedule(db: &SqlitePool) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM study_sessions").execute(db).await?;
    Ok(result.rows_affected())
}

/// Quiz sets, newest first.
pub async fn fetch_quiz_sets(db: &SqlitePool) -> Result<Vec<QuizSet>, AppError> {
    let rows = sqlx::query_as::<_, QuizSetRow>(
        r#"
        SELECT id, title, source_text, course_id, questions, prompt_history, attempts, summary, created_at
        FROM quiz_sets
        ORDER BY rowid DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    rows.into_iter().map(QuizSet::try_from).collect()
}

pub async fn fetch_quiz_set(db: &SqlitePool, id: &str) -> Result<Option<QuizSet>, AppError> {
    let row = sqlx::query_as::<_, QuizSetRow>(
        r#"
        SELECT id, title, source_text, course_id, questions, prompt_history, attempts, summary, created_at
        FROM quiz_sets
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    row.map(QuizSet::try_from).transpose()
}

pub async fn insert_quiz_set(db: &SqlitePool, set: &QuizSet) -> Result<(), AppError> {
    let mut conn = db.acquire().await?;
    write_quiz_set(&mut conn, set).await
}

async fn write_quiz_set(conn: &mut SqliteConnection, set: &QuizSet) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO quiz_sets
            (id, title, source_text, course_id, questions, prompt_history, attempts, summary, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&set.id)
    .bind(&set.title)
    .bind(&set.source_text)
    .bind(&set.course_id)
    .bind(to_json(&set.questions)?)
    .bind(to_json(&set.prompt_history)?)
    .bind(to_json(&set.attempts)?)
    .bind(&set.summary)
    .bind(&set.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Stores the generated content of `set`: questions, prompt history, attempts and summary.
pub async fn update_quiz_set(db: &SqlitePool, set: &QuizSet) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE quiz_sets
        SET questions = ?2, prompt_history = ?3, attempts = ?4, summary = ?5
        WHERE id = ?1
        "#,
    )
    .bind(&set.id)
    .bind(to_json(&set.questions)?)
    .bind(to_json(&set.prompt_history)?)
    .bind(to_json(&set.attempts)?)
    .bind(&set.summary)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_quiz_set(db: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM quiz_sets WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn load_state(db: &SqlitePool) -> Result<PlannerState, AppError> {
    Ok(PlannerState {
        courses: fetch_courses(db).await?,
        availability: fetch_availability(db).await?,
        schedule: fetch_raw_schedule(db).await?,
        quiz_sets: fetch_quiz_sets(db).await?,
    })
}

/// Overwrites all stored planner state with `state`.
pub async fn save_state(db: &SqlitePool, state: &PlannerState) -> Result<(), AppError> {
    let mut tx = db.begin().await?;

    clear_all(&mut tx).await?;
    for course in &state.courses {
        write_course(&mut tx, course).await?;
    }
    write_availability(&mut tx, &state.availability).await?;
    write_schedule(&mut tx, &state.schedule).await?;
    // oldest first so rowid order matches the newest-first listing
    for set in state.quiz_sets.iter().rev() {
        write_quiz_set(&mut tx, set).await?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn reset_state(db: &SqlitePool) -> Result<(), AppError> {
    let mut tx = db.begin().await?;
    clear_all(&mut tx).await?;
    tx.commit().await?;
    Ok(())
}

async fn clear_all(conn: &mut SqliteConnection) -> Result<(), AppError> {
    sqlx::query("DELETE FROM study_sessions").execute(&mut *conn).await?;
    sqlx::query("DELETE FROM quiz_sets").execute(&mut *conn).await?;
    sqlx::query("DELETE FROM availability").execute(&mut *conn).await?;
    sqlx::query("DELETE FROM courses").execute(&mut *conn).await?;
    Ok(())
}
