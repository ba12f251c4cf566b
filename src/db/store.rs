//! `TaskStore` and `TaskSearch` on top of the SQLite handle.

use super::Database;
use crate::query::filter::FilterPlan;
use crate::query::paginate::{Page, PageRequest};
use crate::store::{TaskSearch, TaskStore};
use crate::types::{AccountId, CompanyId, Scope, Task, TaskId, Visibility};
use anyhow::Result;

impl TaskStore for Database {
    fn find_by_scope(&self, scope: Scope) -> Result<Vec<Task>> {
        self.list_scope_tasks(scope)
    }

    fn find_by_ids(&self, ids: &[TaskId], visibility: Visibility) -> Result<Vec<Task>> {
        self.get_tasks_by_ids(ids, visibility)
    }

    fn save(&self, task: &Task) -> Result<()> {
        self.update_task(task)
    }

    fn soft_delete(&self, id: TaskId) -> Result<()> {
        self.soft_delete_task(id)
    }

    fn restore(&self, id: TaskId) -> Result<()> {
        self.restore_task(id)
    }

    fn set_archived(&self, id: TaskId, archived: bool) -> Result<()> {
        self.set_task_archived(id, archived)
    }

    fn purge(&self, id: TaskId) -> Result<()> {
        self.purge_task(id)
    }

    fn company_exists(&self, id: CompanyId) -> Result<bool> {
        Ok(self.get_company(id)?.is_some())
    }

    fn first_company_of_account(&self, account_id: AccountId) -> Result<Option<CompanyId>> {
        Ok(self
            .list_account_companies(account_id)?
            .first()
            .map(|company| company.id))
    }

    fn name_exists(&self, name: &str, company_id: Option<CompanyId>) -> Result<bool> {
        self.task_name_exists(name, company_id)
    }

    fn find_page(&self, scope: Scope, plan: &FilterPlan, page: PageRequest) -> Result<Page<Task>> {
        self.filter_tasks(scope, plan, page)
    }
}

impl TaskSearch for Database {
    fn search(&self, term: &str, scope: Scope) -> Result<Vec<Task>> {
        self.search_tasks(term, scope)
    }
}
