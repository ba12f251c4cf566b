//! Core types for task retrieval.

use chrono::{DateTime, Utc};
use heck::ToUpperCamelCase;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TaskError;

pub type TaskId = i64;
pub type CompanyId = i64;
pub type AccountId = i64;
pub type ProjectId = i64;

/// A task owned by exactly one company.
///
/// `archived` and `deleted` are independent flags: a task can be archived,
/// soft-deleted, both, or neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub rate: Option<f64>,
    pub company_id: CompanyId,
    /// `None` for unassigned tasks.
    pub project_id: Option<ProjectId>,
    pub archived: bool,
    pub archived_at: Option<i64>,
    pub deleted: bool,
    pub deleted_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// First character of the name, camel-cased for avatar rendering.
    pub fn image_name(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_string().to_upper_camel_case())
            .unwrap_or_default()
    }

    /// Creation month for grouped listings, e.g. `January 2024`.
    pub fn group_date(&self) -> String {
        ms_to_utc(self.created_at)
            .map(|dt| dt.format("%B %Y").to_string())
            .unwrap_or_default()
    }

    /// Visible and not archived.
    pub fn is_active(&self) -> bool {
        !self.deleted && !self.archived
    }
}

/// Task attributes supplied at creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub rate: Option<f64>,
    pub company_id: CompanyId,
    pub project_id: Option<ProjectId>,
    /// Explicit creation time in milliseconds; defaults to now.
    pub created_at: Option<i64>,
}

impl NewTask {
    pub fn new(name: impl Into<String>, company_id: CompanyId) -> Self {
        Self {
            name: name.into(),
            company_id,
            ..Default::default()
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at.timestamp_millis());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub account_id: Option<AccountId>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub created_at: i64,
}

/// A log record that lives and dies with its task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLog {
    pub id: i64,
    pub task_id: TaskId,
    pub message: String,
    pub created_at: i64,
}

/// One of the two sets a request can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Scope {
    Company(CompanyId),
    /// Every task of every company the account owns.
    Account(AccountId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Company(id) => write!(f, "company:{}", id),
            Scope::Account(id) => write!(f, "account:{}", id),
        }
    }
}

/// Which records an id lookup may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Records that are not soft-deleted (default scope).
    #[default]
    Visible,
    /// Soft-deleted records only.
    Deleted,
    All,
}

impl Visibility {
    pub fn admits(self, task: &Task) -> bool {
        match self {
            Visibility::Visible => !task.deleted,
            Visibility::Deleted => task.deleted,
            Visibility::All => true,
        }
    }
}

/// Lifecycle status a caller can filter by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not archived.
    Active,
    Archived,
    /// Soft-deleted, regardless of the archive flag.
    Deleted,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Archived => "archived",
            Status::Deleted => "deleted",
        }
    }

    /// Whether the task satisfies this status.
    ///
    /// Soft-deleted tasks only ever match `Deleted`.
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Status::Active => task.is_active(),
            Status::Archived => !task.deleted && task.archived,
            Status::Deleted => task.deleted,
        }
    }
}

impl FromStr for Status {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(Status::Active),
            "archived" => Ok(Status::Archived),
            "deleted" => Ok(Status::Deleted),
            other => Err(TaskError::unknown_status(other)),
        }
    }
}

/// Status parameter as sent by callers: a single value or a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusParam {
    One(String),
    Many(Vec<String>),
}

impl StatusParam {
    /// Parse every present value; blank entries are skipped.
    pub fn parse(&self) -> Result<Vec<Status>, TaskError> {
        let raw: Vec<&str> = match self {
            StatusParam::One(s) => vec![s.as_str()],
            StatusParam::Many(list) => list.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse)
            .collect()
    }
}

impl From<&str> for StatusParam {
    fn from(s: &str) -> Self {
        StatusParam::One(s.to_string())
    }
}

impl From<Vec<&str>> for StatusParam {
    fn from(list: Vec<&str>) -> Self {
        StatusParam::Many(list.into_iter().map(String::from).collect())
    }
}

/// Parameter bag for retrieval requests.
///
/// Numeric fields arrive as strings and are coerced with [`coerce_int`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRequest {
    pub status: Option<StatusParam>,
    pub min_rate: Option<String>,
    pub max_rate: Option<String>,
    pub create_at_start_date: Option<String>,
    pub create_at_end_date: Option<String>,
    pub search: Option<String>,
    pub sort_column: Option<String>,
    pub sort_direction: Option<String>,
    pub page: Option<String>,
    pub per: Option<String>,
    /// Overrides the context's current company.
    pub current_company: Option<CompanyId>,
}

/// Who is asking. Replaces any ambient current-user lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub current_company: Option<CompanyId>,
    pub current_account: Option<AccountId>,
    /// The user's preferred date format (strftime syntax).
    pub date_format: Option<String>,
}

impl RequestContext {
    pub fn for_company(company_id: CompanyId) -> Self {
        Self {
            current_company: Some(company_id),
            ..Default::default()
        }
    }

    pub fn for_account(account_id: AccountId) -> Self {
        Self {
            current_account: Some(account_id),
            ..Default::default()
        }
    }

    pub fn with_company(mut self, company_id: CompanyId) -> Self {
        self.current_company = Some(company_id);
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }
}

/// Ids for the multi-record operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdSelection {
    /// A literal comma-joined string such as `"1,2,3"`.
    Joined(String),
    List(Vec<TaskId>),
}

impl IdSelection {
    /// Split into numeric ids and the raw tokens that are not ids.
    pub fn resolve(&self) -> (Vec<TaskId>, Vec<String>) {
        match self {
            IdSelection::List(ids) => (dedup(ids.iter().copied()), Vec::new()),
            IdSelection::Joined(joined) => {
                let mut ids = Vec::new();
                let mut invalid = Vec::new();
                for token in joined.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                    match token.parse::<TaskId>() {
                        Ok(id) => ids.push(id),
                        Err(_) => invalid.push(token.to_string()),
                    }
                }
                (dedup(ids), invalid)
            }
        }
    }
}

impl From<&str> for IdSelection {
    fn from(s: &str) -> Self {
        IdSelection::Joined(s.to_string())
    }
}

impl From<Vec<TaskId>> for IdSelection {
    fn from(ids: Vec<TaskId>) -> Self {
        IdSelection::List(ids)
    }
}

fn dedup(ids: impl IntoIterator<Item = TaskId>) -> Vec<TaskId> {
    let mut out: Vec<TaskId> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Coerce a request string to an integer the lenient way: optional sign,
/// then leading digits. Anything unparseable becomes 0, so `"9.7"` is 9
/// and `"abc"` is 0.
pub fn coerce_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative { -value } else { value }
}

/// Returns the value when it is present and not blank.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

pub fn ms_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(name: &str) -> Task {
        Task {
            id: 1,
            name: name.to_string(),
            rate: None,
            company_id: 1,
            project_id: None,
            archived: false,
            archived_at: None,
            deleted: false,
            deleted_at: None,
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 15, 10, 0, 0)
                .unwrap()
                .timestamp_millis(),
            updated_at: 0,
        }
    }

    #[test]
    fn coerce_int_takes_leading_integer() {
        assert_eq!(coerce_int("9.7"), 9);
        assert_eq!(coerce_int("  42abc"), 42);
        assert_eq!(coerce_int("-3"), -3);
        assert_eq!(coerce_int("abc"), 0);
        assert_eq!(coerce_int(""), 0);
    }

    #[test]
    fn image_name_is_capitalized_first_char() {
        assert_eq!(task("design review").image_name(), "D");
        assert_eq!(task("").image_name(), "");
    }

    #[test]
    fn group_date_renders_month_and_year() {
        assert_eq!(task("x").group_date(), "January 2024");
    }

    #[test]
    fn status_parse_rejects_unknown() {
        assert_eq!("archived".parse::<Status>().unwrap(), Status::Archived);
        assert!("paused".parse::<Status>().is_err());
    }

    #[test]
    fn status_param_skips_blank_entries() {
        let param = StatusParam::from(vec!["active", "", "deleted"]);
        assert_eq!(param.parse().unwrap(), vec![Status::Active, Status::Deleted]);
    }

    #[test]
    fn id_selection_splits_joined_string() {
        let (ids, invalid) = IdSelection::from("3, 1,x,3").resolve();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(invalid, vec!["x".to_string()]);
    }

    #[test]
    fn deleted_tasks_only_match_deleted_status() {
        let mut t = task("x");
        t.deleted = true;
        t.archived = true;
        assert!(!Status::Archived.matches(&t));
        assert!(!Status::Active.matches(&t));
        assert!(Status::Deleted.matches(&t));
    }
}
