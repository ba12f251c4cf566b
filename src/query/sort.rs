//! Merge two candidate sets and order them by a named column.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::str::FromStr;

use crate::error::{TaskError, TaskResult};
use crate::types::{FilterRequest, Task, ms_to_utc, present};

/// A column value as seen by the comparator.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Numeric(f64),
    Text(String),
}

impl SortValue {
    /// String form used when the two sides are not both numeric.
    pub fn render(&self) -> String {
        match self {
            SortValue::Numeric(n) => n.to_string(),
            SortValue::Text(s) => s.clone(),
        }
    }
}

/// Two numerics compare by their truncated integer value; any other pair
/// compares by string form. Never fails, whatever the mix of variants.
pub fn compare(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Numeric(x), SortValue::Numeric(y)) => {
            (x.trunc() as i64).cmp(&(y.trunc() as i64))
        }
        _ => a.render().cmp(&b.render()),
    }
}

/// Columns a caller may sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Id,
    Name,
    Rate,
    CreatedAt,
    UpdatedAt,
    CompanyId,
    ProjectId,
    Archived,
    ArchivedAt,
    Deleted,
    DeletedAt,
}

impl FromStr for SortColumn {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(SortColumn::Id),
            "name" => Ok(SortColumn::Name),
            "rate" => Ok(SortColumn::Rate),
            "created_at" => Ok(SortColumn::CreatedAt),
            "updated_at" => Ok(SortColumn::UpdatedAt),
            "company_id" => Ok(SortColumn::CompanyId),
            "project_id" => Ok(SortColumn::ProjectId),
            "archived" => Ok(SortColumn::Archived),
            "archived_at" => Ok(SortColumn::ArchivedAt),
            "deleted" => Ok(SortColumn::Deleted),
            "deleted_at" => Ok(SortColumn::DeletedAt),
            other => Err(TaskError::invalid_value(
                "sort_column",
                &format!("Cannot sort tasks by '{}'", other),
            )),
        }
    }
}

/// Extract the typed value of `column`. Only the rate is numeric; absent
/// values become empty text.
pub fn sort_value(task: &Task, column: SortColumn) -> SortValue {
    match column {
        SortColumn::Id => SortValue::Text(task.id.to_string()),
        SortColumn::Name => SortValue::Text(task.name.clone()),
        SortColumn::Rate => match task.rate {
            Some(rate) => SortValue::Numeric(rate),
            None => SortValue::Text(String::new()),
        },
        SortColumn::CreatedAt => SortValue::Text(render_time(Some(task.created_at))),
        SortColumn::UpdatedAt => SortValue::Text(render_time(Some(task.updated_at))),
        SortColumn::CompanyId => SortValue::Text(task.company_id.to_string()),
        SortColumn::ProjectId => {
            SortValue::Text(task.project_id.map(|p| p.to_string()).unwrap_or_default())
        }
        SortColumn::Archived => SortValue::Text(task.archived.to_string()),
        SortColumn::ArchivedAt => SortValue::Text(render_time(task.archived_at)),
        SortColumn::Deleted => SortValue::Text(task.deleted.to_string()),
        SortColumn::DeletedAt => SortValue::Text(render_time(task.deleted_at)),
    }
}

fn render_time(ms: Option<i64>) -> String {
    ms.and_then(ms_to_utc)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Only `desc` reverses; any other value sorts ascending.
    pub fn from_param(s: &str) -> Self {
        if s.trim() == "desc" {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    /// A sort is requested only when both column and direction are present.
    pub fn from_request(request: &FilterRequest) -> TaskResult<Option<Self>> {
        match (present(&request.sort_column), present(&request.sort_direction)) {
            (Some(column), Some(direction)) => Ok(Some(Self {
                column: column.parse()?,
                direction: SortDirection::from_param(direction),
            })),
            _ => Ok(None),
        }
    }

    /// Sort in place. `Desc` swaps the operands rather than reversing the
    /// result, and the sort is stable, so ties keep their incoming order in
    /// both directions.
    pub fn sort(&self, tasks: &mut [Task]) {
        let column = self.column;
        let desc = self.direction == SortDirection::Desc;
        tasks.sort_by(|a, b| {
            let (a, b) = if desc { (b, a) } else { (a, b) };
            compare(&sort_value(a, column), &sort_value(b, column))
        });
    }
}

/// Concatenate `first` then `second`, dropping repeated task ids while
/// keeping the first occurrence.
pub fn merge(first: Vec<Task>, second: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    first
        .into_iter()
        .chain(second)
        .filter(|t| seen.insert(t.id))
        .collect()
}

pub fn merge_and_sort(first: Vec<Task>, second: Vec<Task>, sort: Option<&SortSpec>) -> Vec<Task> {
    let mut merged = merge(first, second);
    if let Some(spec) = sort {
        spec.sort(&mut merged);
    }
    merged
}
