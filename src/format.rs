//! Output formatting utilities for markdown and JSON.

use crate::lifecycle::LifecycleReport;
use crate::query::Page;
use crate::types::Task;
use serde::Serialize;
use serde_json::{Value, json};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

/// A task with its derived display fields.
pub fn task_json(task: &Task) -> Value {
    let mut value = serde_json::to_value(task).unwrap_or(Value::Null);
    if let Value::Object(ref mut map) = value {
        map.insert("image_name".into(), json!(task.image_name()));
        map.insert("group_date".into(), json!(task.group_date()));
    }
    value
}

pub fn page_json(page: &Page<Task>) -> Value {
    json!({
        "items": page.items.iter().map(task_json).collect::<Vec<_>>(),
        "page": page.page,
        "per_page": page.per_page,
        "total_count": page.total_count,
        "total_pages": page.total_pages,
    })
}

pub fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn lifecycle_label(task: &Task) -> &'static str {
    match (task.archived, task.deleted) {
        (false, false) => "active",
        (true, false) => "archived",
        (false, true) => "deleted",
        (true, true) => "archived, deleted",
    }
}

/// Format a single task as markdown.
pub fn format_task_markdown(task: &Task) -> String {
    let mut md = String::new();

    md.push_str(&format!("## [{}] {}\n", task.image_name(), task.name));
    md.push_str(&format!("- **id**: `{}`\n", task.id));
    md.push_str(&format!("- **status**: {}\n", lifecycle_label(task)));
    md.push_str(&format!("- **company**: `{}`\n", task.company_id));

    match task.project_id {
        Some(project) => md.push_str(&format!("- **project**: `{}`\n", project)),
        None => md.push_str("- **project**: unassigned\n"),
    }

    if let Some(rate) = task.rate {
        md.push_str(&format!("- **rate**: {}\n", rate));
    }

    md.push_str(&format!("- **created**: {}\n", task.group_date()));
    md
}

/// Format a page of tasks as markdown.
pub fn format_page_markdown(page: &Page<Task>) -> String {
    let mut md = format!(
        "# Tasks (page {} of {}, {} total)\n\n",
        page.page, page.total_pages, page.total_count
    );

    if page.is_empty() {
        md.push_str("_No tasks on this page._\n");
        return md;
    }

    for task in &page.items {
        md.push_str(&format_task_markdown(task));
        md.push('\n');
    }
    md
}

pub fn format_tasks_markdown(tasks: &[Task]) -> String {
    let mut md = format!("# Tasks ({})\n\n", tasks.len());
    for task in tasks {
        md.push_str(&format_task_markdown(task));
        md.push('\n');
    }
    md
}

pub fn format_report_markdown(report: &LifecycleReport) -> String {
    let mut md = format!("# {}\n\n", report.transition.as_str());

    if report.applied.is_empty() {
        md.push_str("- **applied**: none\n");
    } else {
        let ids: Vec<String> = report.applied.iter().map(|id| format!("`{}`", id)).collect();
        md.push_str(&format!("- **applied**: {}\n", ids.join(", ")));
    }

    for failure in &report.failures {
        md.push_str(&format!("- **failed** `{}`: {}\n", failure.id, failure.error));
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{PageRequest, paginate};

    fn task() -> Task {
        Task {
            id: 3,
            name: "write report".to_string(),
            rate: Some(12.5),
            company_id: 1,
            project_id: None,
            archived: true,
            archived_at: Some(0),
            deleted: false,
            deleted_at: None,
            created_at: 1_704_067_200_000, // 2024-01-01
            updated_at: 0,
        }
    }

    #[test]
    fn task_json_carries_derived_fields() {
        let value = task_json(&task());
        assert_eq!(value["image_name"], "W");
        assert_eq!(value["group_date"], "January 2024");
        assert_eq!(value["rate"], 12.5);
    }

    #[test]
    fn markdown_marks_unassigned_and_status() {
        let md = format_task_markdown(&task());
        assert!(md.contains("unassigned"));
        assert!(md.contains("- **status**: archived\n"));
    }

    #[test]
    fn empty_page_says_so() {
        let page = paginate(Vec::<Task>::new(), PageRequest::default());
        assert!(format_page_markdown(&page).contains("No tasks"));
    }
}
