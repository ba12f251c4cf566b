//! Multi-record lifecycle transitions.
//!
//! Each operation resolves an [`IdSelection`] to records and applies its
//! transition to every record on its own. A failing record is reported and
//! the rest still run; there is no surrounding transaction.

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{TaskError, TaskResult};
use crate::store::TaskStore;
use crate::types::{IdSelection, TaskId, Visibility};

/// A lifecycle transition applied per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Archive,
    /// Soft delete; dependent logs are dropped and stay gone on recovery.
    Delete,
    RecoverArchived,
    /// Restore, then unarchive.
    RecoverDeleted,
    /// Hard delete of an already soft-deleted record.
    Purge,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Archive => "archive",
            Transition::Delete => "delete",
            Transition::RecoverArchived => "recover_archived",
            Transition::RecoverDeleted => "recover_deleted",
            Transition::Purge => "purge",
        }
    }

    /// Records the transition may resolve to.
    fn visibility(&self) -> Visibility {
        match self {
            Transition::Archive | Transition::Delete | Transition::RecoverArchived => {
                Visibility::Visible
            }
            Transition::RecoverDeleted | Transition::Purge => Visibility::Deleted,
        }
    }

    fn apply<S: TaskStore>(&self, store: &S, id: TaskId) -> anyhow::Result<()> {
        match self {
            Transition::Archive => store.set_archived(id, true),
            Transition::Delete => store.soft_delete(id),
            Transition::RecoverArchived => store.set_archived(id, false),
            Transition::RecoverDeleted => {
                store.restore(id)?;
                store.set_archived(id, false)
            }
            Transition::Purge => store.purge(id),
        }
    }
}

/// An id the transition could not be applied to.
#[derive(Debug, Serialize)]
pub struct Failure {
    /// The id as the caller sent it.
    pub id: String,
    pub error: TaskError,
}

/// Outcome of a multi-record operation.
#[derive(Debug, Serialize)]
pub struct LifecycleReport {
    pub transition: Transition,
    pub applied: Vec<TaskId>,
    pub failures: Vec<Failure>,
}

impl LifecycleReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Apply `transition` to every record `ids` resolves to.
///
/// Only a failure to look the records up aborts the call; everything after
/// that is reported per id.
pub fn apply_multiple<S: TaskStore>(
    store: &S,
    ids: impl Into<IdSelection>,
    transition: Transition,
) -> TaskResult<LifecycleReport> {
    let (ids, invalid) = ids.into().resolve();
    let records = store.find_by_ids(&ids, transition.visibility())?;

    let mut report = LifecycleReport {
        transition,
        applied: Vec::new(),
        failures: invalid
            .into_iter()
            .map(|raw| Failure {
                error: TaskError::record_not_found("Task", &raw),
                id: raw,
            })
            .collect(),
    };

    for id in &ids {
        if !records.iter().any(|task| task.id == *id) {
            report.failures.push(Failure {
                id: id.to_string(),
                error: TaskError::record_not_found("Task", id),
            });
        }
    }

    for task in &records {
        match transition.apply(store, task.id) {
            Ok(()) => report.applied.push(task.id),
            Err(e) => {
                let error = TaskError::from(e);
                warn!(task_id = task.id, transition = transition.as_str(), "transition failed: {}", error);
                report.failures.push(Failure {
                    id: task.id.to_string(),
                    error,
                });
            }
        }
    }

    info!(
        transition = transition.as_str(),
        applied = report.applied.len(),
        failed = report.failures.len(),
        "lifecycle transition finished"
    );
    Ok(report)
}

pub fn archive_multiple<S: TaskStore>(store: &S, ids: impl Into<IdSelection>) -> TaskResult<LifecycleReport> {
    apply_multiple(store, ids, Transition::Archive)
}

pub fn delete_multiple<S: TaskStore>(store: &S, ids: impl Into<IdSelection>) -> TaskResult<LifecycleReport> {
    apply_multiple(store, ids, Transition::Delete)
}

pub fn recover_archived<S: TaskStore>(store: &S, ids: impl Into<IdSelection>) -> TaskResult<LifecycleReport> {
    apply_multiple(store, ids, Transition::RecoverArchived)
}

pub fn recover_deleted<S: TaskStore>(store: &S, ids: impl Into<IdSelection>) -> TaskResult<LifecycleReport> {
    apply_multiple(store, ids, Transition::RecoverDeleted)
}

pub fn purge_multiple<S: TaskStore>(store: &S, ids: impl Into<IdSelection>) -> TaskResult<LifecycleReport> {
    apply_multiple(store, ids, Transition::Purge)
}
