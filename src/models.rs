use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Number of homework slots the widget renders.
pub const HOMEWORK_SLOTS: usize = 3;

// ============ Satchel One Models ============

/// Response of `GET /timetable/school/{school_id}/student/{user_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimetableResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub weeks: Vec<TimetableWeek>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimetableWeek {
    #[serde(default, deserialize_with = "null_as_default")]
    pub days: Vec<TimetableDay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimetableDay {
    /// ISO date (`YYYY-MM-DD`) of the day.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lessons: Vec<Lesson>,
}

/// A single timetabled lesson.
///
/// Every field is kept as a raw JSON value: Satchel One is not consistent about
/// strings vs numbers (rooms in particular), and one odd lesson must not fail
/// the whole timetable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lesson {
    /// Object with `startDateTime` and `endDateTime`.
    #[serde(default)]
    pub period: Option<Value>,
    /// Object with `subject`.
    #[serde(default, rename = "classGroup")]
    pub class_group: Option<Value>,
    #[serde(default)]
    pub subject: Option<Value>,
    #[serde(default)]
    pub room: Option<Value>,
    #[serde(default)]
    pub teacher: Option<Value>,
}

impl Lesson {
    pub fn start_raw(&self) -> Option<String> {
        nested_text(&self.period, "startDateTime")
    }

    pub fn end_raw(&self) -> Option<String> {
        nested_text(&self.period, "endDateTime")
    }

    /// Class group subject, then the lesson's own subject, then "No Lesson".
    pub fn subject_name(&self) -> String {
        nested_text(&self.class_group, "subject")
            .or_else(|| self.subject.as_ref().and_then(text))
            .unwrap_or_else(|| "No Lesson".to_string())
    }

    pub fn room_label(&self) -> String {
        self.room
            .as_ref()
            .and_then(text)
            .unwrap_or_else(|| "0".to_string())
    }

    /// "Title Forename Surname", skipping blank parts. Empty when no teacher object.
    pub fn teacher_name(&self) -> String {
        let Some(Value::Object(teacher)) = &self.teacher else {
            return String::new();
        };

        ["title", "forename", "surname"]
            .iter()
            .filter_map(|key| teacher.get(*key).and_then(text))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Response of `GET /personal_calendar_tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarTasksResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub personal_calendar_tasks: Vec<CalendarTask>,
}

/// A homework item from the student's personal calendar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarTask {
    #[serde(default)]
    pub due_on: Option<Value>,
    #[serde(default)]
    pub due: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default, rename = "dueDate")]
    pub due_date: Option<Value>,
    #[serde(default)]
    pub class_task_title: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub subject: Option<Value>,
}

impl CalendarTask {
    /// First non-empty of `due_on`, `due`, `date`, `dueDate`.
    pub fn due_raw(&self) -> Option<String> {
        [&self.due_on, &self.due, &self.date, &self.due_date]
            .into_iter()
            .find_map(|v| v.as_ref().and_then(text))
    }

    pub fn title_text(&self) -> String {
        self.class_task_title
            .as_ref()
            .and_then(text)
            .or_else(|| self.title.as_ref().and_then(text))
            .unwrap_or_default()
    }

    pub fn subject_text(&self) -> String {
        self.subject.as_ref().and_then(text).unwrap_or_default()
    }
}

/// Non-empty string (or number rendered as a string) from a loose JSON field.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `text` of `object[key]`; `None` when the value is not an object.
fn nested_text(object: &Option<Value>, key: &str) -> Option<String> {
    match object {
        Some(Value::Object(map)) => map.get(key).and_then(text),
        _ => None,
    }
}

/// Treats an explicit `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============ Widget Models ============

/// A lesson as shown on the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonSummary {
    pub subject: String,
    pub start_hm: String,
    pub end_hm: String,
    pub room: String,
    pub teacher: String,
}

/// A homework slot as shown on the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeworkSummary {
    pub title: String,
    pub subject: String,
    /// `YYYY-MM-DD` in Europe/London.
    pub due_date: String,
    /// `HH:MM`, or empty when Satchel One only gave a date.
    pub due_time_hm: String,
}

/// Flat document returned to the widget.
///
/// Serialized by hand so that every key is always present: the widget binds to
/// fixed key names (`current_lesson_subject`, `hw_2_due_date`, ...) and breaks on
/// missing ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetPayload {
    pub now_hm: String,
    pub current_lesson: Option<LessonSummary>,
    pub next_lesson: Option<LessonSummary>,
    /// At most [`HOMEWORK_SLOTS`] items, soonest first.
    pub homework: Vec<HomeworkSummary>,
    pub next_change_hm: String,
    pub refresh_seconds: i64,
}

impl Serialize for WidgetPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", "ok")?;
        map.serialize_entry("now_hm", &self.now_hm)?;

        for (prefix, lesson) in [
            ("current_lesson", &self.current_lesson),
            ("next_lesson", &self.next_lesson),
        ] {
            let lesson = lesson.clone().unwrap_or_default();
            map.serialize_entry(&format!("{}_subject", prefix), &lesson.subject)?;
            map.serialize_entry(&format!("{}_start_hm", prefix), &lesson.start_hm)?;
            map.serialize_entry(&format!("{}_end_hm", prefix), &lesson.end_hm)?;
            map.serialize_entry(&format!("{}_room", prefix), &lesson.room)?;
            map.serialize_entry(&format!("{}_teacher", prefix), &lesson.teacher)?;
        }

        for slot in 0..HOMEWORK_SLOTS {
            let hw = self.homework.get(slot).cloned().unwrap_or_default();
            let base = format!("hw_{}", slot + 1);
            map.serialize_entry(&format!("{}_title", base), &hw.title)?;
            map.serialize_entry(&format!("{}_subject", base), &hw.subject)?;
            map.serialize_entry(&format!("{}_due_date", base), &hw.due_date)?;
            map.serialize_entry(&format!("{}_due_time_hm", base), &hw.due_time_hm)?;
        }

        map.serialize_entry("homework_count", &self.homework.len().min(HOMEWORK_SLOTS))?;
        map.serialize_entry("next_change_hm", &self.next_change_hm)?;
        map.serialize_entry("refresh_seconds", &self.refresh_seconds)?;
        map.end()
    }
}
