//! Status, rate and creation-date predicates.
//!
//! A [`FilterPlan`] is compiled once from a [`FilterRequest`] and can then be
//! evaluated in memory ([`FilterPlan::apply`]) or translated to SQL by the
//! store for offset/limit listings.

use chrono::{Days, NaiveDate, NaiveTime};
use tracing::debug;

use crate::error::{TaskError, TaskResult};
use crate::types::{FilterRequest, Status, Task, coerce_int, present};

/// Date format used when the caller has no preference.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Compiled predicates of a request.
///
/// Every field narrows the result (AND); statuses among themselves widen it
/// (a task matches when any listed status matches). With no statuses,
/// soft-deleted tasks are hidden.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPlan {
    pub statuses: Vec<Status>,
    /// Inclusive bounds on the integer-truncated rate.
    pub rate: Option<(i64, i64)>,
    /// Creation window in milliseconds, start inclusive, end exclusive.
    pub created: Option<(i64, i64)>,
}

impl FilterPlan {
    /// Compile the request's filters.
    ///
    /// The rate filter is only active when `min_rate` is present; a missing
    /// `max_rate` coerces to 0. The date filter is only active when the start
    /// date is present, and then both dates must parse with `date_format`.
    pub fn from_request(request: &FilterRequest, date_format: &str) -> TaskResult<Self> {
        let statuses = match &request.status {
            Some(param) => param.parse()?,
            None => Vec::new(),
        };

        let rate = present(&request.min_rate).map(|min| {
            let max = request.max_rate.as_deref().map(coerce_int).unwrap_or(0);
            (coerce_int(min), max)
        });

        let created = match present(&request.create_at_start_date) {
            Some(start) => {
                let end = request.create_at_end_date.as_deref().unwrap_or("");
                let start = parse_date("create_at_start_date", start, date_format)?;
                let end = parse_date("create_at_end_date", end, date_format)?;
                Some(day_window(start, end))
            }
            None => None,
        };

        let plan = Self {
            statuses,
            rate,
            created,
        };
        debug!(?plan, "compiled task filter");
        Ok(plan)
    }

    /// Plan that selects a single lifecycle status.
    pub fn status(status: Status) -> Self {
        Self {
            statuses: vec![status],
            ..Default::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        let status_ok = if self.statuses.is_empty() {
            !task.deleted
        } else {
            self.statuses.iter().any(|s| s.matches(task))
        };
        if !status_ok {
            return false;
        }

        if let Some((min, max)) = self.rate {
            match task.rate {
                Some(rate) => {
                    let truncated = rate.trunc() as i64;
                    if truncated < min || truncated > max {
                        return false;
                    }
                }
                None => return false,
            }
        }

        if let Some((start, end)) = self.created
            && (task.created_at < start || task.created_at >= end)
        {
            return false;
        }

        true
    }

    /// Keep the candidates that match, preserving order.
    pub fn apply(&self, candidates: Vec<Task>) -> Vec<Task> {
        candidates.into_iter().filter(|t| self.matches(t)).collect()
    }
}

/// Filter candidates by the request's predicates.
pub fn filter(
    candidates: Vec<Task>,
    request: &FilterRequest,
    date_format: &str,
) -> TaskResult<Vec<Task>> {
    Ok(FilterPlan::from_request(request, date_format)?.apply(candidates))
}

/// Visible tasks that have no project.
pub fn unassigned(candidates: Vec<Task>) -> Vec<Task> {
    candidates
        .into_iter()
        .filter(|t| !t.deleted && t.project_id.is_none())
        .collect()
}

fn parse_date(field: &str, value: &str, format: &str) -> TaskResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), format)
        .map_err(|e| TaskError::invalid_date(field, value, format).with_details(e.to_string()))
}

/// Millisecond window covering whole calendar days `start..=end` in UTC.
fn day_window(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
    let from = start.and_time(NaiveTime::MIN).and_utc().timestamp_millis();
    let until = end
        .checked_add_days(Days::new(1))
        .unwrap_or(end)
        .and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp_millis();
    (from, until)
}
