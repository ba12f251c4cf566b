//! Keyword search over task names using FTS5.

use super::Database;
use super::tasks::{parse_task_row, scope_condition};
use crate::types::{Scope, Task};
use anyhow::Result;
use rusqlite::ToSql;
use tracing::debug;

/// Turn free text into an FTS5 MATCH expression.
///
/// Every word becomes a quoted prefix term, so user input can never be
/// read as FTS5 syntax. Terms are ANDed. Returns `None` when nothing
/// searchable is left.
pub fn fts_query(term: &str) -> Option<String> {
    let terms: Vec<String> = term
        .split_whitespace()
        .map(|word| word.replace('"', ""))
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{}\"*", word))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

impl Database {
    /// Tasks in the scope whose name matches every word of `term`.
    ///
    /// Soft-deleted tasks are included; visibility is the filter's job.
    pub fn search_tasks(&self, term: &str, scope: Scope) -> Result<Vec<Task>> {
        let Some(query) = fts_query(term) else {
            return Ok(Vec::new());
        };

        let (scope_clause, scope_param) = scope_condition(scope);
        let sql = format!(
            "SELECT t.* FROM tasks_fts fts
             INNER JOIN tasks t ON fts.rowid = t.id
             WHERE tasks_fts MATCH ? AND {}
             ORDER BY t.id",
            scope_clause
        );

        self.with_conn(|conn| {
            let params_vec: Vec<Box<dyn ToSql>> = vec![Box::new(query.clone()), scope_param];
            let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();

            let mut stmt = conn.prepare(&sql)?;
            let tasks = stmt
                .query_map(params_refs.as_slice(), parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            debug!(%scope, query = %query, hits = tasks.len(), "task search");
            Ok(tasks)
        })
    }
}
