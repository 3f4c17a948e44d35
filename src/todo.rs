//! Task entity, validation, ordering, and deadline display.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Task status. The only transition ever taken is `active -> completed`;
/// nothing in the crate moves a task back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    Active,
    Completed,
}

impl TodoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TodoStatus::Active => "active",
            TodoStatus::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(TodoStatus::Active),
            "completed" => Ok(TodoStatus::Completed),
            other => Err(Error::InvalidArgument(format!(
                "invalid status '{other}' (expected active|completed)"
            ))),
        }
    }
}

impl fmt::Display for TodoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The task document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    /// HTML-formatted body, may be empty
    #[serde(default)]
    pub content: String,
    /// Owning user id, set at creation and never user-editable
    pub author: String,
    pub status: TodoStatus,
    /// Display/filter flag for the weather dashboard
    #[serde(default)]
    pub is_outdoor: bool,
    pub deadline: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,
}

/// Validated input for create and edit
#[derive(Debug, Clone)]
pub struct TodoDraft {
    pub title: String,
    pub content: String,
    pub is_outdoor: bool,
    pub deadline: DateTime<Utc>,
}

impl TodoDraft {
    /// Validate form input. `content` defaults to empty, `is_outdoor` to
    /// false, `deadline` to now. A validation failure never reaches the
    /// store.
    pub fn new(
        title: &str,
        content: Option<String>,
        is_outdoor: bool,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation {
                field: "title",
                message: "title cannot be empty".to_string(),
            });
        }
        Ok(Self {
            title: title.to_string(),
            content: content.unwrap_or_default(),
            is_outdoor,
            deadline: deadline.unwrap_or_else(Utc::now),
        })
    }
}

/// Parse a deadline given as RFC 3339 or as a relative duration from `now`
/// (`2h`, `30m`, `3d`).
pub fn parse_deadline(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::Validation {
            field: "deadline",
            message: "deadline cannot be empty".to_string(),
        });
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let duration = parse_duration(raw).map_err(|_| Error::Validation {
        field: "deadline",
        message: format!("'{raw}' is neither RFC 3339 nor a duration like 2h"),
    })?;
    Ok(now + duration)
}

/// Parse a duration string like "2h", "30m", "3d"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    if s.is_empty() {
        return Err(Error::InvalidArgument("Duration cannot be empty".to_string()));
    }

    // Find where the number ends and unit begins
    let (num_str, unit) = if let Some(pos) = s.find(|c: char| !c.is_ascii_digit()) {
        (&s[..pos], &s[pos..])
    } else {
        // Assume minutes if no unit
        (s, "m")
    };

    let num: i64 = num_str
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("Invalid duration number: {num_str}")))?;

    let duration = match unit.to_lowercase().as_str() {
        "s" | "sec" | "second" | "seconds" => Duration::seconds(num),
        "m" | "min" | "minute" | "minutes" => Duration::minutes(num),
        "h" | "hr" | "hour" | "hours" => Duration::hours(num),
        "d" | "day" | "days" => Duration::days(num),
        "w" | "week" | "weeks" => Duration::weeks(num),
        _ => {
            return Err(Error::InvalidArgument(format!(
                "Invalid duration unit '{unit}'. Expected: s, m, h, d, w"
            )));
        }
    };

    Ok(duration)
}

/// Ordering applied to live query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(Error::InvalidArgument(format!(
                "invalid sort direction '{other}' (expected asc|desc)"
            ))),
        }
    }
}

/// Sort by deadline; ties break by document id, the store's native
/// secondary order.
pub fn sort_todos(todos: &mut [Todo], direction: SortDirection) {
    todos.sort_by(|left, right| {
        let ordering = left
            .deadline
            .cmp(&right.deadline)
            .then_with(|| left.id.cmp(&right.id));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Humanized time-remaining string: "due in 3 hours", "overdue by 2 days".
pub fn deadline_countdown(now: DateTime<Utc>, deadline: DateTime<Utc>) -> String {
    let seconds = (deadline - now).num_seconds();
    if seconds == 0 {
        return "due now".to_string();
    }
    if seconds > 0 {
        format!("due in {}", humanize_span(seconds))
    } else {
        format!("overdue by {}", humanize_span(-seconds))
    }
}

fn humanize_span(seconds: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    if seconds < MINUTE {
        return "less than a minute".to_string();
    }
    let (amount, unit) = if seconds < HOUR {
        (seconds / MINUTE, "minute")
    } else if seconds < DAY {
        (seconds / HOUR, "hour")
    } else if seconds < MONTH {
        (seconds / DAY, "day")
    } else if seconds < YEAR {
        (seconds / MONTH, "month")
    } else {
        (seconds / YEAR, "year")
    };
    if amount == 1 {
        format!("1 {unit}")
    } else {
        format!("{amount} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn todo(id: &str, deadline: DateTime<Utc>) -> Todo {
        Todo {
            id: id.to_string(),
            title: format!("todo {id}"),
            content: String::new(),
            author: "user".to_string(),
            status: TodoStatus::Active,
            is_outdoor: false,
            deadline,
            completed: None,
        }
    }

    #[test]
    fn draft_requires_title() {
        let err = TodoDraft::new("   ", None, false, None).expect_err("empty title");
        match err {
            Error::Validation { field, .. } => assert_eq!(field, "title"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn draft_defaults() {
        let draft = TodoDraft::new("water plants", None, false, None).expect("valid draft");
        assert_eq!(draft.title, "water plants");
        assert_eq!(draft.content, "");
        assert!(!draft.is_outdoor);
    }

    #[test]
    fn deadline_accepts_rfc3339() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let parsed = parse_deadline("2024-03-05T08:30:00Z", now).expect("rfc3339");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap());
    }

    #[test]
    fn deadline_accepts_relative_duration() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let parsed = parse_deadline("2h", now).expect("relative");
        assert_eq!(parsed, now + Duration::hours(2));
    }

    #[test]
    fn deadline_rejects_garbage() {
        let err = parse_deadline("whenever", Utc::now()).expect_err("garbage");
        match err {
            Error::Validation { field, .. } => assert_eq!(field, "deadline"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sort_ascending_and_descending_share_membership() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut todos = vec![
            todo("b", base + Duration::hours(2)),
            todo("a", base + Duration::hours(1)),
            todo("c", base + Duration::hours(3)),
        ];

        sort_todos(&mut todos, SortDirection::Ascending);
        let ascending: Vec<_> = todos.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ascending, vec!["a", "b", "c"]);

        sort_todos(&mut todos, SortDirection::Descending);
        let descending: Vec<_> = todos.iter().map(|t| t.id.clone()).collect();
        assert_eq!(descending, vec!["c", "b", "a"]);
    }

    #[test]
    fn sort_ties_break_by_id() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut todos = vec![todo("z", base), todo("a", base)];
        sort_todos(&mut todos, SortDirection::Ascending);
        assert_eq!(todos[0].id, "a");
    }

    #[test]
    fn countdown_phrasing() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            deadline_countdown(now, now + Duration::hours(3)),
            "due in 3 hours"
        );
        assert_eq!(
            deadline_countdown(now, now + Duration::minutes(1)),
            "due in 1 minute"
        );
        assert_eq!(
            deadline_countdown(now, now - Duration::days(2)),
            "overdue by 2 days"
        );
        assert_eq!(
            deadline_countdown(now, now + Duration::seconds(30)),
            "due in less than a minute"
        );
        assert_eq!(deadline_countdown(now, now), "due now");
    }

    #[test]
    fn status_serde_is_lowercase() {
        let json = serde_json::to_string(&TodoStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
        let parsed: TodoStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, TodoStatus::Completed);
    }
}
