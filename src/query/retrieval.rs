//! Scoped task retrieval: search, filter, merge, sort, paginate.
//!
//! [`TaskQuery::get_tasks`] builds the union of the tasks visible through the
//! caller's account and company in memory before paginating. That is fine for
//! the scope sizes this serves; very large scopes would want the sort pushed
//! into the store.

use tracing::{debug, warn};

use super::filter::{FilterPlan, unassigned};
use super::paginate::{Page, PageRequest, paginate};
use super::sort::{SortSpec, merge_and_sort};
use crate::config::QueryConfig;
use crate::error::{TaskError, TaskResult};
use crate::store::{TaskSearch, TaskStore};
use crate::types::{CompanyId, FilterRequest, RequestContext, Scope, Task, present};

/// The scopes a request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedScopes {
    pub account: Option<Scope>,
    pub company: Option<Scope>,
}

impl ResolvedScopes {
    /// Account first: its tasks lead the merged order.
    pub fn iter(&self) -> impl Iterator<Item = Scope> + '_ {
        self.account.into_iter().chain(self.company)
    }
}

/// Read-side operations over a task store.
pub struct TaskQuery<'a, S> {
    store: &'a S,
    settings: QueryConfig,
}

impl<'a, S: TaskStore> TaskQuery<'a, S> {
    pub fn new(store: &'a S, settings: QueryConfig) -> Self {
        Self { store, settings }
    }

    /// The caller's date format, else the configured default.
    pub fn date_format<'c>(&'c self, ctx: &'c RequestContext) -> &'c str {
        present(&ctx.date_format).unwrap_or(self.settings.date_format.as_str())
    }

    pub fn page_request(&self, request: &FilterRequest) -> PageRequest {
        PageRequest::from_request(request, self.settings.per_page, self.settings.max_per_page)
    }

    /// Work out which company and account the request may see.
    ///
    /// The company comes from the request override, then the context, then
    /// the first company of the context's account. A company id that does
    /// not exist counts as unresolved. With neither scope resolved the
    /// request fails with `MissingScopeContext`.
    pub fn resolve_scopes(
        &self,
        ctx: &RequestContext,
        request: &FilterRequest,
    ) -> TaskResult<ResolvedScopes> {
        let mut company_id: Option<CompanyId> = request.current_company.or(ctx.current_company);
        if company_id.is_none()
            && let Some(account_id) = ctx.current_account
        {
            company_id = self.store.first_company_of_account(account_id)?;
        }

        let company = match company_id {
            Some(id) if self.store.company_exists(id)? => Some(Scope::Company(id)),
            Some(id) => {
                warn!(company_id = id, "current company does not exist");
                None
            }
            None => None,
        };
        let account = ctx.current_account.map(Scope::Account);

        if company.is_none() && account.is_none() {
            return Err(TaskError::missing_scope());
        }
        Ok(ResolvedScopes { account, company })
    }

    /// Filter a single scope and paginate in the store.
    pub fn filter(
        &self,
        scope: Scope,
        ctx: &RequestContext,
        request: &FilterRequest,
    ) -> TaskResult<Page<Task>> {
        let plan = FilterPlan::from_request(request, self.date_format(ctx))?;
        let page = self.store.find_page(scope, &plan, self.page_request(request))?;
        debug!(%scope, total = page.total_count, page = page.page, "filtered scope");
        Ok(page)
    }

    /// Visible tasks of the scope with no project.
    pub fn unassigned(&self, scope: Scope) -> TaskResult<Vec<Task>> {
        Ok(unassigned(self.store.find_by_scope(scope)?))
    }

    /// Whether a visible task with this name exists, in the company when
    /// given (which must exist), otherwise anywhere.
    pub fn task_exists(&self, name: &str, company_id: Option<CompanyId>) -> TaskResult<bool> {
        if let Some(id) = company_id
            && !self.store.company_exists(id)?
        {
            return Err(TaskError::record_not_found("Company", id));
        }
        Ok(self.store.name_exists(name, company_id)?)
    }
}

impl<'a, S: TaskStore + TaskSearch> TaskQuery<'a, S> {
    /// One page of the tasks the caller can see through their account and
    /// company, searched, filtered, deduplicated and sorted.
    pub fn get_tasks(&self, ctx: &RequestContext, request: &FilterRequest) -> TaskResult<Page<Task>> {
        let scopes = self.resolve_scopes(ctx, request)?;
        let plan = FilterPlan::from_request(request, self.date_format(ctx))?;
        let sort = SortSpec::from_request(request)?;
        let term = present(&request.search);

        let mut account_tasks = Vec::new();
        let mut company_tasks = Vec::new();
        for scope in scopes.iter() {
            let candidates = match term {
                Some(term) => self.store.search(term, scope)?,
                None => self.store.find_by_scope(scope)?,
            };
            let kept = plan.apply(candidates);
            debug!(%scope, kept = kept.len(), "scope candidates filtered");
            match scope {
                Scope::Account(_) => account_tasks = kept,
                Scope::Company(_) => company_tasks = kept,
            }
        }

        let merged = merge_and_sort(account_tasks, company_tasks, sort.as_ref());
        let page = paginate(merged, self.page_request(request));
        debug!(
            total = page.total_count,
            page = page.page,
            returned = page.len(),
            "tasks retrieved"
        );
        Ok(page)
    }
}
