//! Storage and search seams used by the query and lifecycle layers.
//!
//! [`crate::db::Database`] implements both traits on SQLite.

use anyhow::Result;

use crate::query::filter::FilterPlan;
use crate::query::paginate::{Page, PageRequest, paginate};
use crate::types::{AccountId, CompanyId, Scope, Task, TaskId, Visibility};

/// Durable task records with soft-delete and archive flags.
pub trait TaskStore {
    /// Every task in the scope, soft-deleted ones included, in id order.
    fn find_by_scope(&self, scope: Scope) -> Result<Vec<Task>>;

    /// Tasks with the given ids that the visibility admits. Unknown ids are
    /// simply absent from the result.
    fn find_by_ids(&self, ids: &[TaskId], visibility: Visibility) -> Result<Vec<Task>>;

    /// Persist the mutable attributes of an existing task.
    fn save(&self, task: &Task) -> Result<()>;

    /// Mark deleted and drop dependent log records. [`TaskStore::restore`]
    /// does not bring the logs back.
    fn soft_delete(&self, id: TaskId) -> Result<()>;

    /// Clear the soft-delete flag.
    fn restore(&self, id: TaskId) -> Result<()>;

    fn set_archived(&self, id: TaskId, archived: bool) -> Result<()>;

    /// Remove the row for good, with its logs.
    fn purge(&self, id: TaskId) -> Result<()>;

    fn company_exists(&self, id: CompanyId) -> Result<bool>;

    fn first_company_of_account(&self, account_id: AccountId) -> Result<Option<CompanyId>>;

    /// Whether a visible task with this exact name exists, in the company if
    /// given, otherwise anywhere.
    fn name_exists(&self, name: &str, company_id: Option<CompanyId>) -> Result<bool>;

    /// One page of a single scope after filtering.
    ///
    /// The default works in memory; stores that can push the predicates and
    /// the offset/limit down should override it.
    fn find_page(&self, scope: Scope, plan: &FilterPlan, page: PageRequest) -> Result<Page<Task>> {
        let matching = plan.apply(self.find_by_scope(scope)?);
        Ok(paginate(matching, page))
    }
}

/// Keyword search over task attributes.
pub trait TaskSearch {
    /// Tasks in the scope matching every word of `term`, soft-deleted ones
    /// included, in id order.
    fn search(&self, term: &str, scope: Scope) -> Result<Vec<Task>>;
}
