//! Task model shared with the server.
//!
//! Tasks are owned by the server: the client only ever reads them from list
//! responses and sends write payloads (`NewTask`, `TaskPatch`, `IdsPayload`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Server-assigned task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        let trimmed = value.trim().trim_start_matches('#');
        trimmed
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .map(TaskId)
            .ok_or_else(|| Error::InvalidArgument(format!("invalid task id '{value}'")))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Normal, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Normal => "Normal",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            _ => Err(Error::InvalidArgument(format!(
                "invalid priority '{value}' (expected Low|Normal|High)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_date: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Rows with a priority outside Low/Normal/High still list, as Normal.
fn lenient_priority<'de, D>(deserializer: D) -> std::result::Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::parse::<Priority>) {
        Some(Ok(priority)) => priority,
        Some(Err(_)) => {
            tracing::debug!(priority = ?raw, "unknown priority, showing as Normal");
            Priority::default()
        }
        None => Priority::default(),
    })
}

/// Body of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
}

/// Body of a partial update. Unset fields are left out of the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `Some(None)` clears the due date.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "explicit_null"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
}

fn explicit_null<'de, D>(deserializer: D) -> std::result::Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(Option::<NaiveDate>::deserialize(deserializer)?))
}

impl TaskPatch {
    pub fn done(is_done: bool) -> Self {
        Self {
            is_done: Some(is_done),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.priority.is_none()
            && self.is_done.is_none()
    }

    /// Apply the patch to a task the way the server would.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = self.title.as_ref() {
            task.title = title.clone();
        }
        if let Some(description) = self.description.as_ref() {
            task.description = description.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(is_done) = self.is_done {
            task.is_done = is_done;
        }
    }
}

/// Body of both bulk endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdsPayload {
    pub ids: Vec<TaskId>,
}

/// One page of a list response.
///
/// The server answers either with a bare array (pagination disabled) or with
/// the `{results, count, next, previous}` envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPage {
    pub results: Vec<Task>,
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
}

#[derive(Deserialize)]
struct PaginatedWire {
    results: Vec<Task>,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    previous: Option<String>,
}

impl<'de> Deserialize<'de> for TaskPage {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as _;

        let value = serde_json::Value::deserialize(deserializer)?;
        if value.is_array() {
            let results: Vec<Task> = serde_json::from_value(value).map_err(D::Error::custom)?;
            return Ok(TaskPage {
                count: results.len() as u64,
                results,
                next: None,
                previous: None,
            });
        }
        let wire: PaginatedWire = serde_json::from_value(value).map_err(D::Error::custom)?;
        Ok(TaskPage {
            count: wire.count.unwrap_or(wire.results.len() as u64),
            results: wire.results,
            next: wire.next,
            previous: wire.previous,
        })
    }
}

/// Parse a `YYYY-MM-DD` date; empty input means "no due date".
pub fn parse_due_date(value: &str) -> Result<Option<NaiveDate>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(Some)
        .map_err(|_| Error::Validation(format!("invalid due date '{trimmed}' (expected YYYY-MM-DD)")))
}

pub fn format_due_date(date: Option<NaiveDate>) -> String {
    date.map(|value| value.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_tolerates_missing_and_null_fields() {
        let task: Task = serde_json::from_str(
            r#"{"id": 3, "title": "Buy milk", "description": null, "due_date": null}"#,
        )
        .expect("parse task");
        assert_eq!(task.id, TaskId(3));
        assert_eq!(task.description, "");
        assert_eq!(task.due_date, None);
        assert_eq!(task.priority, Priority::Normal);
        assert!(!task.is_done);
        assert!(task.active);
    }

    #[test]
    fn unknown_priority_lists_as_normal() {
        let task: Task =
            serde_json::from_str(r#"{"id": 1, "title": "x", "priority": "TODO"}"#).expect("task");
        assert_eq!(task.priority, Priority::Normal);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!("HIGH".parse::<Priority>().expect("priority"), Priority::High);
    }

    #[test]
    fn bad_row_reports_its_own_error() {
        let err = serde_json::from_str::<TaskPage>(
            r#"{"count": 2, "next": null, "previous": null,
                "results": [{"id": 1, "title": "a"}, {"id": 2}]}"#,
        )
        .expect_err("row without title");
        let message = err.to_string();
        assert!(message.contains("missing field `title`"), "{message}");
        assert!(!message.contains("untagged"), "{message}");

        let err = serde_json::from_str::<TaskPage>(r#"[{"id": 1, "title": "a", "due_date": "soon"}]"#)
            .expect_err("bad date");
        assert!(!err.to_string().contains("untagged"));
    }

    #[test]
    fn page_accepts_bare_array() {
        let page: TaskPage =
            serde_json::from_str(r#"[{"id": 1, "title": "a"}, {"id": 2, "title": "b"}]"#)
                .expect("bare page");
        assert_eq!(page.count, 2);
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }

    #[test]
    fn page_accepts_envelope() {
        let page: TaskPage = serde_json::from_str(
            r#"{"count": 12, "next": "http://x/api/tasks/?page=2", "previous": null,
                "results": [{"id": 1, "title": "a", "due_date": "2025-01-10", "priority": "High"}]}"#,
        )
        .expect("paginated page");
        assert_eq!(page.count, 12);
        assert_eq!(page.results.len(), 1);
        assert_eq!(
            page.results[0].due_date,
            NaiveDate::from_ymd_opt(2025, 1, 10)
        );
        assert!(page.next.is_some());
    }

    #[test]
    fn patch_omits_unset_fields() {
        let patch = TaskPatch::done(true);
        let json = serde_json::to_value(&patch).expect("serialize");
        assert_eq!(json, serde_json::json!({ "is_done": true }));

        let clear_due = TaskPatch {
            due_date: Some(None),
            ..TaskPatch::default()
        };
        let json = serde_json::to_value(&clear_due).expect("serialize");
        assert_eq!(json, serde_json::json!({ "due_date": null }));
    }

    #[test]
    fn task_id_parses_with_hash_prefix() {
        assert_eq!("#12".parse::<TaskId>().expect("id"), TaskId(12));
        assert!("0".parse::<TaskId>().is_err());
        assert!("abc".parse::<TaskId>().is_err());
    }

    #[test]
    fn due_date_parsing() {
        assert_eq!(parse_due_date("").expect("empty"), None);
        assert_eq!(
            parse_due_date("2025-01-10").expect("date"),
            NaiveDate::from_ymd_opt(2025, 1, 10)
        );
        assert!(matches!(
            parse_due_date("10/01/2025"),
            Err(Error::Validation(_))
        ));
    }
}
