//! Log records attached to tasks.

use super::{Database, now_ms};
use crate::error::TaskError;
use crate::types::{TaskId, TaskLog};
use anyhow::Result;
use rusqlite::params;

impl Database {
    /// Attach a log record to a visible task.
    pub fn add_task_log(&self, task_id: TaskId, message: &str) -> Result<TaskLog> {
        self.with_conn(|conn| {
            let visible: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1 AND deleted = 0)",
                params![task_id],
                |row| row.get(0),
            )?;
            if !visible {
                return Err(TaskError::record_not_found("Task", task_id).into());
            }

            let now = now_ms();
            conn.execute(
                "INSERT INTO task_logs (task_id, message, created_at) VALUES (?1, ?2, ?3)",
                params![task_id, message, now],
            )?;
            Ok(TaskLog {
                id: conn.last_insert_rowid(),
                task_id,
                message: message.to_string(),
                created_at: now,
            })
        })
    }

    pub fn list_task_logs(&self, task_id: TaskId) -> Result<Vec<TaskLog>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, task_id, message, created_at FROM task_logs
                 WHERE task_id = ?1 ORDER BY id",
            )?;
            let logs = stmt
                .query_map(params![task_id], |row| {
                    Ok(TaskLog {
                        id: row.get(0)?,
                        task_id: row.get(1)?,
                        message: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(logs)
        })
    }
}
