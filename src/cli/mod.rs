//! CLI command definitions for taskscope
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Args, Parser, Subcommand};

use crate::types::{
    AccountId, CompanyId, FilterRequest, ProjectId, RequestContext, Scope, StatusParam, TaskId,
};

/// Company and account scoped task queries
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Output format: json or markdown
    #[arg(short, long, default_value = "json", global = true)]
    pub format: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage accounts
    #[command(subcommand)]
    Account(AccountCommand),

    /// Manage companies
    #[command(subcommand)]
    Company(CompanyCommand),

    /// Create a task
    Add(AddArgs),

    /// List tasks across the current account and company
    List(ListArgs),

    /// List one company's tasks, paginated in the database
    Filter(FilterCommandArgs),

    /// List visible tasks without a project
    Unassigned(ScopeArgs),

    /// Check whether a task name is taken
    Exists(ExistsArgs),

    /// Archive tasks
    Archive(IdsArgs),

    /// Soft-delete tasks
    Delete(IdsArgs),

    /// Unarchive tasks
    RecoverArchived(IdsArgs),

    /// Restore and unarchive soft-deleted tasks
    RecoverDeleted(IdsArgs),

    /// Permanently remove soft-deleted tasks and their logs
    Purge(IdsArgs),

    /// Attach a log record to a task
    Log(LogArgs),
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Create an account
    Add {
        /// Account name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommand {
    /// Create a company
    Add {
        /// Company name
        name: String,

        /// Owning account
        #[arg(long)]
        account: Option<AccountId>,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task name
    pub name: String,

    /// Owning company
    #[arg(long)]
    pub company: CompanyId,

    /// Rate
    #[arg(long)]
    pub rate: Option<f64>,

    /// Project the task is assigned to
    #[arg(long)]
    pub project: Option<ProjectId>,
}

/// Filters shared by `list` and `filter`.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Lifecycle status: active, archived or deleted (repeatable)
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// Minimum rate (enables the rate filter)
    #[arg(long)]
    pub min_rate: Option<String>,

    /// Maximum rate
    #[arg(long)]
    pub max_rate: Option<String>,

    /// First creation day (enables the date filter)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Last creation day
    #[arg(long)]
    pub end_date: Option<String>,

    /// Date format for --start-date/--end-date (strftime)
    #[arg(long)]
    pub date_format: Option<String>,

    /// Page number, 1-based
    #[arg(long)]
    pub page: Option<String>,

    /// Page size
    #[arg(long)]
    pub per: Option<String>,
}

impl FilterArgs {
    pub fn to_request(&self) -> FilterRequest {
        let status = match self.statuses.as_slice() {
            [] => None,
            [one] => Some(StatusParam::One(one.clone())),
            many => Some(StatusParam::Many(many.to_vec())),
        };
        FilterRequest {
            status,
            min_rate: self.min_rate.clone(),
            max_rate: self.max_rate.clone(),
            create_at_start_date: self.start_date.clone(),
            create_at_end_date: self.end_date.clone(),
            page: self.page.clone(),
            per: self.per.clone(),
            ..Default::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Current company
    #[arg(long)]
    pub company: Option<CompanyId>,

    /// Current account
    #[arg(long)]
    pub account: Option<AccountId>,

    /// Keyword search over task names
    #[arg(long)]
    pub search: Option<String>,

    /// Column to sort by
    #[arg(long)]
    pub sort_column: Option<String>,

    /// asc or desc
    #[arg(long)]
    pub sort_direction: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,
}

impl ListArgs {
    pub fn context(&self) -> RequestContext {
        RequestContext {
            current_company: self.company,
            current_account: self.account,
            date_format: self.filters.date_format.clone(),
        }
    }

    pub fn to_request(&self) -> FilterRequest {
        FilterRequest {
            search: self.search.clone(),
            sort_column: self.sort_column.clone(),
            sort_direction: self.sort_direction.clone(),
            ..self.filters.to_request()
        }
    }
}

#[derive(Args, Debug)]
pub struct FilterCommandArgs {
    /// Company to list
    #[arg(long)]
    pub company: CompanyId,

    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Args, Debug)]
pub struct ScopeArgs {
    /// Company scope
    #[arg(long, conflicts_with = "account", required_unless_present = "account")]
    pub company: Option<CompanyId>,

    /// Account scope
    #[arg(long)]
    pub account: Option<AccountId>,
}

impl ScopeArgs {
    pub fn scope(&self) -> Option<Scope> {
        self.company
            .map(Scope::Company)
            .or(self.account.map(Scope::Account))
    }
}

#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Task name
    pub name: String,

    /// Restrict to this company
    #[arg(long)]
    pub company: Option<CompanyId>,
}

#[derive(Args, Debug)]
pub struct IdsArgs {
    /// Comma-separated task ids, e.g. 1,2,3
    pub ids: String,
}

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Task id
    pub task_id: TaskId,

    /// Log message
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_args_build_request() {
        let cli = Cli::parse_from([
            "taskscope",
            "list",
            "--account",
            "4",
            "--status",
            "active",
            "--status",
            "archived",
            "--sort-column",
            "rate",
            "--sort-direction",
            "desc",
            "--per",
            "5",
        ]);
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };

        let request = args.to_request();
        assert_eq!(
            request.status,
            Some(StatusParam::Many(vec!["active".into(), "archived".into()]))
        );
        assert_eq!(request.sort_direction.as_deref(), Some("desc"));
        assert_eq!(request.per.as_deref(), Some("5"));
        assert_eq!(args.context().current_account, Some(4));
    }

    #[test]
    fn single_status_stays_single() {
        let args = FilterArgs {
            statuses: vec!["deleted".into()],
            ..Default::default()
        };
        assert_eq!(args.to_request().status, Some(StatusParam::One("deleted".into())));
    }

    #[test]
    fn scope_args_prefer_company() {
        let cli = Cli::parse_from(["taskscope", "unassigned", "--company", "2"]);
        let Command::Unassigned(args) = cli.command else {
            panic!("expected unassigned");
        };
        assert_eq!(args.scope(), Some(Scope::Company(2)));
    }
}
