//! Widget reshaping logic
//!
//! Turns the raw Satchel One timetable and calendar task documents into the flat
//! widget payload:
//! 1. Pick today's lessons (London date) and find the current and next lesson
//! 2. Keep homework that is not yet due, soonest first, three slots
//! 3. Work out when the widget should next refresh
//!
//! All comparisons happen in Europe/London so the widget follows UK clock changes.
use crate::models::{
    CalendarTasksResponse, HomeworkSummary, Lesson, LessonSummary, TimetableResponse,
    WidgetPayload, HOMEWORK_SLOTS,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{Europe::London, Tz};

/// Refresh hint bounds, in seconds.
pub const MIN_REFRESH_SECS: i64 = 5;
pub const MAX_REFRESH_SECS: i64 = 3600;
/// Refresh hint when nothing is scheduled for the rest of the day.
pub const IDLE_REFRESH_SECS: i64 = 300;

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Current wall-clock time in London.
pub fn london_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&London)
}

/// `YYYY-MM-DD` shaped string.
pub fn is_date_only(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-'
}

/// Parses a Satchel One timestamp into London time.
///
/// Date-only values mean the end of that day (23:59:59 London), so homework due
/// "today" stays visible all day. Timestamps without an offset are taken as UTC.
pub fn parse_to_london(raw: &str) -> Option<DateTime<Tz>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if is_date_only(s) {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            let end_of_day = date.and_hms_opt(23, 59, 59)?;
            return London.from_local_datetime(&end_of_day).earliest();
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&London));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&London));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive).with_timezone(&London));
        }
    }

    None
}

/// `HH:MM` in London time.
pub fn fmt_hm(dt: &DateTime<Tz>) -> String {
    dt.format("%H:%M").to_string()
}

/// A lesson with both ends parsed.
#[derive(Debug)]
struct TimedLesson<'a> {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    lesson: &'a Lesson,
}

impl TimedLesson<'_> {
    fn summarize(&self) -> LessonSummary {
        LessonSummary {
            subject: self.lesson.subject_name(),
            start_hm: fmt_hm(&self.start),
            end_hm: fmt_hm(&self.end),
            room: self.lesson.room_label(),
            teacher: self.lesson.teacher_name(),
        }
    }
}

/// Today's lessons from the first timetable week, sorted by start.
fn todays_lessons<'a>(
    now: &DateTime<Tz>,
    timetable: &'a TimetableResponse,
) -> Vec<TimedLesson<'a>> {
    let today = now.date_naive().format("%Y-%m-%d").to_string();

    let Some(day) = timetable.weeks.first().and_then(|week| {
        week.days
            .iter()
            .find(|d| d.date.as_deref().map(str::trim) == Some(today.as_str()))
    }) else {
        return Vec::new();
    };

    let mut lessons: Vec<TimedLesson<'a>> = day
        .lessons
        .iter()
        .filter_map(|lesson| {
            let start = parse_to_london(&lesson.start_raw()?)?;
            let end = parse_to_london(&lesson.end_raw()?)?;
            Some(TimedLesson { start, end, lesson })
        })
        .collect();

    lessons.sort_by_key(|l| l.start);
    lessons
}

/// A homework item that is not yet due.
#[derive(Debug)]
struct DueTask {
    due: DateTime<Tz>,
    date_only: bool,
    title: String,
    subject: String,
}

/// Homework due now or later, soonest first.
fn upcoming_homework(now: &DateTime<Tz>, tasks: &CalendarTasksResponse) -> Vec<DueTask> {
    let mut due: Vec<DueTask> = tasks
        .personal_calendar_tasks
        .iter()
        .filter_map(|task| {
            let raw = task.due_raw()?;
            let at = parse_to_london(&raw)?;
            (at >= *now).then(|| DueTask {
                due: at,
                date_only: is_date_only(raw.trim()),
                title: task.title_text(),
                subject: task.subject_text(),
            })
        })
        .collect();

    due.sort_by_key(|t| t.due);
    due
}

/// Time of the next change on screen and the seconds until it, clamped to
/// [`MIN_REFRESH_SECS`, `MAX_REFRESH_SECS`].
pub fn refresh_hint(now: &DateTime<Tz>, candidates: &[DateTime<Tz>]) -> (String, i64) {
    match candidates.iter().min() {
        Some(next_change) => {
            let secs = (*next_change - *now)
                .num_seconds()
                .clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS);
            (fmt_hm(next_change), secs)
        }
        None => (String::new(), IDLE_REFRESH_SECS),
    }
}

/// Builds the widget payload from the two upstream documents.
pub fn build_payload(
    now: DateTime<Tz>,
    timetable: &TimetableResponse,
    tasks: &CalendarTasksResponse,
) -> WidgetPayload {
    let lessons = todays_lessons(&now, timetable);

    let current_lesson = lessons
        .iter()
        .find(|l| l.start <= now && now <= l.end)
        .map(|l| l.summarize());
    let next_lesson = lessons
        .iter()
        .find(|l| l.start > now)
        .map(|l| l.summarize());

    let mut candidates: Vec<DateTime<Tz>> = lessons
        .iter()
        .flat_map(|l| [l.start, l.end])
        .filter(|at| *at > now)
        .collect();

    let due = upcoming_homework(&now, tasks);
    // Homework beyond the visible slots still counts as a change point
    candidates.extend(due.iter().map(|t| t.due));

    let homework = due
        .into_iter()
        .take(HOMEWORK_SLOTS)
        .map(|t| HomeworkSummary {
            due_date: t.due.date_naive().format("%Y-%m-%d").to_string(),
            due_time_hm: if t.date_only {
                String::new()
            } else {
                fmt_hm(&t.due)
            },
            title: t.title,
            subject: t.subject,
        })
        .collect();

    let (next_change_hm, refresh_seconds) = refresh_hint(&now, &candidates);

    WidgetPayload {
        now_hm: fmt_hm(&now),
        current_lesson,
        next_lesson,
        homework,
        next_change_hm,
        refresh_seconds,
    }
}
