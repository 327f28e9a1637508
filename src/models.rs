// Data models for TaskQuery

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use eyre::{Result, eyre};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// A user-owned unit of work
///
/// Field names follow the camelCase JSON payloads served by the task API.
/// Only `id`, `title` and `completed` are required; a malformed optional
/// field reads as absent rather than failing the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_label", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_label", skip_serializing_if = "Option::is_none")]
    pub recurrence_type: Option<RecurrenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_metadata: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Enumerated label; unknown or non-string values read as absent
fn lenient_label<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => match s.parse() {
            Ok(label) => Some(label),
            Err(_) => {
                warn!(value = %s, "Unrecognized label, treating as absent");
                None
            }
        },
        Some(other) => {
            warn!(value = %other, "Non-string label, treating as absent");
            None
        }
    })
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken as UTC; anything else reads as absent
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        None | Some(Value::Null) => return Ok(None),
        Some(other) => {
            warn!(value = %other, "Non-string timestamp, treating as absent");
            return Ok(None);
        }
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&s) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(naive.and_utc()));
    }
    if !s.is_empty() {
        warn!(value = %s, "Unparseable timestamp, treating as absent");
    }
    Ok(None)
}

/// `null` or a malformed list reads as no tags; malformed entries are skipped
fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<Tag>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(other) => {
            warn!(value = %other, "Tags are not a list, treating as empty");
            return Ok(Vec::new());
        }
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Tag>(item) {
            Ok(tag) => Some(tag),
            Err(e) => {
                warn!(error = %e, "Skipping malformed tag");
                None
            }
        })
        .collect())
}

impl Task {
    /// Create a pending task with a fresh id, stamped with the current time
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            title: title.into(),
            description: None,
            completed: false,
            user_id: None,
            priority: None,
            due_date: None,
            reminder_time: None,
            recurrence_type: None,
            recurrence_metadata: None,
            tags: Vec::new(),
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// True if any tag carries exactly this name
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    /// Pending and due strictly before `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }
}

/// Task label; uniqueness is by id, not by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }

    /// Reuse the id of an existing tag with this name, or take the next free id
    pub fn resolve_in(tasks: &[Task], name: &str) -> Result<Tag> {
        let existing = tasks.iter().flat_map(|t| t.tags.iter());
        if let Some(tag) = existing.clone().find(|tag| tag.name == name) {
            return Ok(tag.clone());
        }
        let next_id = existing
            .map(|tag| tag.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| eyre!("No free tag id left for: {}", name))?;
        Ok(Tag::new(next_id, name))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Low, Priority::Medium, Priority::High, Priority::Critical];

    /// The raw label, as stored and as compared when sorting
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| eyre::eyre!("Unknown priority: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekly => "weekly",
            RecurrenceType::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrenceType {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(RecurrenceType::Daily),
            "weekly" => Ok(RecurrenceType::Weekly),
            "monthly" => Ok(RecurrenceType::Monthly),
            other => Err(eyre::eyre!("Unknown recurrence type: {}", other)),
        }
    }
}

/// Parse a due date: an RFC 3339 timestamp, or `YYYY-MM-DD` meaning the end
/// (23:59:59) of that day in local time
pub fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| eyre!("Invalid due date: {}", raw))?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).ok_or_else(|| eyre!("Invalid time"))?;
    date.and_time(end_of_day)
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| eyre!("Due date does not exist in local time: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_task_new_defaults() {
        let task = Task::new("Buy milk");
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);
        assert!(task.created_at.is_some());
        assert!(uuid::Uuid::parse_str(&task.id).is_ok());
    }

    #[test]
    fn test_task_deserialize_minimal() {
        let json = r#"{"id":"t1","title":"Pay rent","completed":true}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "t1");
        assert!(task.completed);
        assert!(task.priority.is_none());
        assert!(task.due_date.is_none());
        assert!(task.tags.is_empty());
        assert!(task.created_at.is_none());
    }

    #[test]
    fn test_task_deserialize_camel_case() {
        let json = r#"{
            "id": "t2",
            "title": "Ship release",
            "completed": false,
            "priority": "Critical",
            "dueDate": "2026-03-01T09:00:00Z",
            "recurrenceType": "weekly",
            "tags": [{"id": 7, "name": "work"}],
            "createdAt": "2026-02-01T08:00:00Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.priority, Some(Priority::Critical));
        assert_eq!(task.recurrence_type, Some(RecurrenceType::Weekly));
        assert_eq!(task.due_date, Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()));
        assert!(task.has_tag("work"));
        assert!(!task.has_tag("Work"));
    }

    #[test]
    fn test_task_serialization_skips_absent_fields() {
        let mut task = Task::new("Write docs");
        task.priority = Some(Priority::High);
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"priority\":\"High\""));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("dueDate"));
    }

    #[test]
    fn test_is_overdue() {
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
        let mut task = Task::new("Renew passport");
        assert!(!task.is_overdue(now));

        task.due_date = Some(Utc.with_ymd_and_hms(2026, 5, 9, 12, 0, 0).unwrap());
        assert!(task.is_overdue(now));

        task.completed = true;
        assert!(!task.is_overdue(now));
    }

    #[test]
    fn test_tag_resolve_in() {
        let mut a = Task::new("A");
        a.tags.push(Tag::new(3, "home"));
        let mut b = Task::new("B");
        b.tags.push(Tag::new(7, "work"));
        let tasks = vec![a, b];

        assert_eq!(Tag::resolve_in(&tasks, "work").unwrap(), Tag::new(7, "work"));
        assert_eq!(Tag::resolve_in(&tasks, "garden").unwrap(), Tag::new(8, "garden"));
        assert_eq!(Tag::resolve_in(&[], "first").unwrap(), Tag::new(1, "first"));
    }

    #[test]
    fn test_tag_resolve_in_exhausted_ids() {
        let mut task = Task::new("A");
        task.tags.push(Tag::new(i64::MAX, "last"));
        let tasks = vec![task];

        assert_eq!(Tag::resolve_in(&tasks, "last").unwrap().id, i64::MAX);
        assert!(Tag::resolve_in(&tasks, "one-more").is_err());
    }

    #[test]
    fn test_task_deserialize_tolerates_malformed_optional_fields() {
        let json = r#"{
            "id": "t3",
            "title": "Legacy row",
            "completed": false,
            "priority": "urgent",
            "recurrenceType": "yearly",
            "tags": null,
            "dueDate": "next tuesday",
            "reminderTime": 42
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, "t3");
        assert!(task.priority.is_none());
        assert!(task.recurrence_type.is_none());
        assert!(task.tags.is_empty());
        assert!(task.due_date.is_none());
        assert!(task.reminder_time.is_none());
    }

    #[test]
    fn test_task_deserialize_label_case_is_exact() {
        let json = r#"{"id":"t4","title":"x","completed":false,"priority":"medium","recurrenceType":"Daily"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.priority.is_none());
        assert!(task.recurrence_type.is_none());
    }

    #[test]
    fn test_task_deserialize_naive_timestamp_as_utc() {
        let json = r#"{"id":"t5","title":"x","completed":false,"createdAt":"2026-02-01T08:00:00.123456"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        let created = task.created_at.unwrap();
        assert_eq!(created.timestamp(), Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap().timestamp());
    }

    #[test]
    fn test_task_deserialize_skips_malformed_tags() {
        let json = r#"{"id":"t6","title":"x","completed":false,"tags":[{"id":1,"name":"ok"},{"name":"no id"},"bare"]}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.tags, vec![Tag::new(1, "ok")]);
    }

    #[test]
    fn test_task_still_requires_core_fields() {
        assert!(serde_json::from_str::<Task>(r#"{"id":"t7","completed":false}"#).is_err());
        assert!(serde_json::from_str::<Task>(r#"{"id":"t7","title":"x"}"#).is_err());
    }

    #[test]
    fn test_parse_due_rfc3339() {
        let due = parse_due("2026-04-15T10:00:00+02:00").unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2026, 4, 15, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_due_bare_date_is_end_of_local_day() {
        let due = parse_due("2026-04-15").unwrap();
        let expected = Local
            .with_ymd_and_hms(2026, 4, 15, 23, 59, 59)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(due, expected);
    }

    #[test]
    fn test_parse_due_rejects_garbage() {
        assert!(parse_due("tomorrow").is_err());
        assert!(parse_due("2026-02-30").is_err());
        assert!(parse_due("").is_err());
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("Low".parse::<Priority>().unwrap(), Priority::Low);
        assert_eq!("Critical".parse::<Priority>().unwrap(), Priority::Critical);
        assert!("low".parse::<Priority>().is_err());
        assert!("".parse::<Priority>().is_err());
    }

    #[test]
    fn test_recurrence_serialization() {
        let json = serde_json::to_string(&RecurrenceType::Monthly).unwrap();
        assert_eq!(json, "\"monthly\"");
        assert_eq!("daily".parse::<RecurrenceType>().unwrap(), RecurrenceType::Daily);
    }
}
