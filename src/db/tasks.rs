//! Task CRUD, lifecycle flags and scoped listings.

use super::{Database, now_ms};
use crate::error::TaskError;
use crate::query::filter::FilterPlan;
use crate::query::paginate::{Page, PageRequest};
use crate::types::{CompanyId, NewTask, Scope, Status, Task, TaskId, Visibility};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row, ToSql, params};
use tracing::{debug, info};

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        name: row.get("name")?,
        rate: row.get("rate")?,
        company_id: row.get("company_id")?,
        project_id: row.get("project_id")?,
        archived: row.get("archived")?,
        archived_at: row.get("archived_at")?,
        deleted: row.get("deleted")?,
        deleted_at: row.get("deleted_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// WHERE fragment restricting `t` to a scope.
pub(crate) fn scope_condition(scope: Scope) -> (&'static str, Box<dyn ToSql>) {
    match scope {
        Scope::Company(id) => ("t.company_id = ?", Box::new(id)),
        Scope::Account(id) => (
            "t.company_id IN (SELECT id FROM companies WHERE account_id = ?)",
            Box::new(id),
        ),
    }
}

/// Translate a filter plan into WHERE fragments over `t`, mirroring
/// [`FilterPlan::matches`].
pub(crate) fn plan_conditions(plan: &FilterPlan) -> (Vec<String>, Vec<Box<dyn ToSql>>) {
    let mut clauses = Vec::new();
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if plan.statuses.is_empty() {
        clauses.push("t.deleted = 0".to_string());
    } else {
        let any: Vec<&str> = plan
            .statuses
            .iter()
            .map(|status| match status {
                Status::Active => "(t.deleted = 0 AND t.archived = 0)",
                Status::Archived => "(t.deleted = 0 AND t.archived = 1)",
                Status::Deleted => "(t.deleted = 1)",
            })
            .collect();
        clauses.push(format!("({})", any.join(" OR ")));
    }

    if let Some((min, max)) = plan.rate {
        clauses.push("t.rate IS NOT NULL AND CAST(t.rate AS INTEGER) BETWEEN ? AND ?".to_string());
        params_vec.push(Box::new(min));
        params_vec.push(Box::new(max));
    }

    if let Some((start, end)) = plan.created {
        clauses.push("t.created_at >= ? AND t.created_at < ?".to_string());
        params_vec.push(Box::new(start));
        params_vec.push(Box::new(end));
    }

    (clauses, params_vec)
}

fn query_tasks(conn: &Connection, sql: &str, params_vec: &[Box<dyn ToSql>]) -> Result<Vec<Task>> {
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();
    let mut stmt = conn.prepare(sql)?;
    let tasks = stmt
        .query_map(params_refs.as_slice(), parse_task_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

/// Internal helper to get a task using an existing connection.
fn get_task_internal(conn: &Connection, task_id: TaskId) -> Result<Option<Task>> {
    let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;

    match stmt.query_row(params![task_id], parse_task_row) {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn ensure_updated(rows: usize, task_id: TaskId) -> Result<()> {
    if rows == 0 {
        return Err(TaskError::record_not_found("Task", task_id).into());
    }
    Ok(())
}

impl Database {
    /// Create a task under its company.
    pub fn create_task(&self, new: NewTask) -> Result<Task> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(TaskError::invalid_value("name", "Task name must not be empty").into());
        }

        self.with_conn(|conn| {
            let company_known: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM companies WHERE id = ?1)",
                params![new.company_id],
                |row| row.get(0),
            )?;
            if !company_known {
                return Err(TaskError::record_not_found("Company", new.company_id).into());
            }

            let now = now_ms();
            let created_at = new.created_at.unwrap_or(now);
            conn.execute(
                "INSERT INTO tasks (name, rate, company_id, project_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![name, new.rate, new.company_id, new.project_id, created_at, now],
            )?;
            let id = conn.last_insert_rowid();
            info!(task_id = id, company_id = new.company_id, "task created");

            get_task_internal(conn, id)?.ok_or_else(|| anyhow!("task {} vanished after insert", id))
        })
    }

    /// Get a task by id, soft-deleted or not.
    pub fn get_task(&self, task_id: TaskId) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// Every task in the scope, soft-deleted ones included.
    pub fn list_scope_tasks(&self, scope: Scope) -> Result<Vec<Task>> {
        let (condition, param) = scope_condition(scope);
        let sql = format!("SELECT t.* FROM tasks t WHERE {} ORDER BY t.id", condition);
        self.with_conn(|conn| query_tasks(conn, &sql, &[param]))
    }

    pub fn get_tasks_by_ids(&self, ids: &[TaskId], visibility: Visibility) -> Result<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut sql = format!("SELECT t.* FROM tasks t WHERE t.id IN ({})", placeholders);
        match visibility {
            Visibility::Visible => sql.push_str(" AND t.deleted = 0"),
            Visibility::Deleted => sql.push_str(" AND t.deleted = 1"),
            Visibility::All => {}
        }
        sql.push_str(" ORDER BY t.id");

        let params_vec: Vec<Box<dyn ToSql>> =
            ids.iter().map(|id| Box::new(*id) as Box<dyn ToSql>).collect();
        self.with_conn(|conn| query_tasks(conn, &sql, &params_vec))
    }

    /// Write back name, rate and project of an existing task.
    pub fn update_task(&self, task: &Task) -> Result<()> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                "UPDATE tasks SET name = ?1, rate = ?2, project_id = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![task.name, task.rate, task.project_id, now_ms(), task.id],
            )?;
            ensure_updated(rows, task.id)
        })
    }

    /// Flag the task deleted and remove its dependent logs.
    pub fn soft_delete_task(&self, task_id: TaskId) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let now = now_ms();
            let rows = tx.execute(
                "UPDATE tasks SET deleted = 1, deleted_at = ?1, updated_at = ?1 WHERE id = ?2",
                params![now, task_id],
            )?;
            ensure_updated(rows, task_id)?;
            let logs = tx.execute("DELETE FROM task_logs WHERE task_id = ?1", params![task_id])?;
            tx.commit()?;
            debug!(task_id, logs_removed = logs, "task soft-deleted");
            Ok(())
        })
    }

    pub fn restore_task(&self, task_id: TaskId) -> Result<()> {
        self.with_conn(|conn| {
            let rows = conn.execute(
                "UPDATE tasks SET deleted = 0, deleted_at = NULL, updated_at = ?1 WHERE id = ?2",
                params![now_ms(), task_id],
            )?;
            ensure_updated(rows, task_id)?;
            debug!(task_id, "task restored");
            Ok(())
        })
    }

    /// Set or clear the archive flag. Archiving an archived task keeps its
    /// original `archived_at`.
    pub fn set_task_archived(&self, task_id: TaskId, archived: bool) -> Result<()> {
        self.with_conn(|conn| {
            let now = now_ms();
            let rows = if archived {
                conn.execute(
                    "UPDATE tasks SET archived = 1, archived_at = COALESCE(archived_at, ?1),
                     updated_at = ?1 WHERE id = ?2",
                    params![now, task_id],
                )?
            } else {
                conn.execute(
                    "UPDATE tasks SET archived = 0, archived_at = NULL, updated_at = ?1
                     WHERE id = ?2",
                    params![now, task_id],
                )?
            };
            ensure_updated(rows, task_id)?;
            debug!(task_id, archived, "task archive flag set");
            Ok(())
        })
    }

    /// Hard-delete a task; its logs go with it through the foreign key.
    pub fn purge_task(&self, task_id: TaskId) -> Result<()> {
        self.with_conn(|conn| {
            let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            ensure_updated(rows, task_id)?;
            info!(task_id, "task purged");
            Ok(())
        })
    }

    /// Filter a single scope and paginate in SQL.
    pub fn filter_tasks(&self, scope: Scope, plan: &FilterPlan, page: PageRequest) -> Result<Page<Task>> {
        let (scope_clause, scope_param) = scope_condition(scope);
        let (mut clauses, mut params_vec) = plan_conditions(plan);
        clauses.insert(0, scope_clause.to_string());
        params_vec.insert(0, scope_param);
        let where_clause = clauses.join(" AND ");

        self.with_conn(|conn| {
            let count_sql = format!("SELECT COUNT(*) FROM tasks t WHERE {}", where_clause);
            let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();
            let total: i64 = conn.query_row(&count_sql, params_refs.as_slice(), |row| row.get(0))?;
            let total = usize::try_from(total).unwrap_or(0);

            // SQLite reads a negative OFFSET as 0, so an offset past i64 must
            // not reach the query.
            let Ok(offset) = i64::try_from(page.offset()) else {
                debug!(%scope, page = page.page, "page offset out of range");
                return Ok(Page::new(Vec::new(), page, total));
            };
            let limit = i64::try_from(page.per_page).unwrap_or(i64::MAX);

            let select_sql = format!(
                "SELECT t.* FROM tasks t WHERE {} ORDER BY t.id LIMIT ? OFFSET ?",
                where_clause
            );
            params_vec.push(Box::new(limit));
            params_vec.push(Box::new(offset));
            let items = query_tasks(conn, &select_sql, &params_vec)?;

            Ok(Page::new(items, page, total))
        })
    }

    /// Whether a visible task named `name` exists, optionally within a company.
    pub fn task_name_exists(&self, name: &str, company_id: Option<CompanyId>) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool = match company_id {
                Some(company_id) => conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM tasks
                     WHERE name = ?1 AND company_id = ?2 AND deleted = 0)",
                    params![name, company_id],
                    |row| row.get(0),
                )?,
                None => conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM tasks WHERE name = ?1 AND deleted = 0)",
                    params![name],
                    |row| row.get(0),
                )?,
            };
            Ok(exists)
        })
    }
}
