//! taskscope CLI
//!
//! Company and account scoped task retrieval with archive and
//! soft-delete lifecycles, backed by SQLite.

use anyhow::{Result, anyhow};
use clap::Parser;
use serde_json::{Value, json};
use taskscope::cli::{AccountCommand, Cli, Command, CompanyCommand};
use taskscope::config::{Config, ConfigLoader, ConfigPaths};
use taskscope::db::Database;
use taskscope::error::TaskError;
use taskscope::format::{self, OutputFormat};
use taskscope::lifecycle::{self, LifecycleReport};
use taskscope::logging::{self, LogTarget};
use taskscope::query::TaskQuery;
use taskscope::types::{NewTask, RequestContext, Scope};
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let output = OutputFormat::from_str(&cli.format)
        .ok_or_else(|| anyhow!("Unknown output format: {}", cli.format))?;

    let mut paths = ConfigPaths::discover();
    if let Some(ref config_path) = cli.config {
        paths = paths.with_explicit(config_path);
    }
    let loader = ConfigLoader::load_with_paths(paths)?;
    debug!(sources = ?loader.sources(), "configuration loaded");
    let mut config: Config = loader.into_config();
    if let Some(ref database) = cli.database {
        config.database.path = database.into();
    }

    info!("Database: {}", config.database.path.display());
    let db = Database::open(&config.database.path)?;

    match run(&db, &config, cli.command, output) {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err)?);
            std::process::exit(1);
        }
    }
}

fn run(db: &Database, config: &Config, command: Command, output: OutputFormat) -> Result<String, TaskError> {
    let query = TaskQuery::new(db, config.query.clone());

    let rendered = match command {
        Command::Account(AccountCommand::Add { name }) => {
            render_json(format::to_json(&db.create_account(&name)?))
        }
        Command::Company(CompanyCommand::Add { name, account }) => {
            render_json(format::to_json(&db.create_company(&name, account)?))
        }
        Command::Add(args) => {
            let mut new = NewTask::new(args.name, args.company);
            new.rate = args.rate;
            new.project_id = args.project;
            let task = db.create_task(new)?;
            match output {
                OutputFormat::Json => render_json(format::task_json(&task)),
                OutputFormat::Markdown => format::format_task_markdown(&task),
            }
        }
        Command::List(args) => {
            let page = query.get_tasks(&args.context(), &args.to_request())?;
            match output {
                OutputFormat::Json => render_json(format::page_json(&page)),
                OutputFormat::Markdown => format::format_page_markdown(&page),
            }
        }
        Command::Filter(args) => {
            let ctx = RequestContext {
                date_format: args.filters.date_format.clone(),
                ..RequestContext::for_company(args.company)
            };
            let page = query.filter(Scope::Company(args.company), &ctx, &args.filters.to_request())?;
            match output {
                OutputFormat::Json => render_json(format::page_json(&page)),
                OutputFormat::Markdown => format::format_page_markdown(&page),
            }
        }
        Command::Unassigned(args) => {
            let scope = args
                .scope()
                .ok_or_else(TaskError::missing_scope)?;
            let tasks = query.unassigned(scope)?;
            match output {
                OutputFormat::Json => {
                    render_json(Value::Array(tasks.iter().map(format::task_json).collect()))
                }
                OutputFormat::Markdown => format::format_tasks_markdown(&tasks),
            }
        }
        Command::Exists(args) => {
            let exists = query.task_exists(&args.name, args.company)?;
            match output {
                OutputFormat::Json => render_json(json!({ "name": args.name, "exists": exists })),
                OutputFormat::Markdown => format!("`{}` exists: {}", args.name, exists),
            }
        }
        Command::Archive(args) => render_report(
            lifecycle::archive_multiple(db, args.ids.as_str())?,
            output,
        ),
        Command::Delete(args) => render_report(
            lifecycle::delete_multiple(db, args.ids.as_str())?,
            output,
        ),
        Command::RecoverArchived(args) => render_report(
            lifecycle::recover_archived(db, args.ids.as_str())?,
            output,
        ),
        Command::RecoverDeleted(args) => render_report(
            lifecycle::recover_deleted(db, args.ids.as_str())?,
            output,
        ),
        Command::Purge(args) => render_report(
            lifecycle::purge_multiple(db, args.ids.as_str())?,
            output,
        ),
        Command::Log(args) => render_json(format::to_json(&db.add_task_log(args.task_id, &args.message)?)),
    };

    Ok(rendered)
}

fn render_json(value: Value) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

fn render_report(report: LifecycleReport, output: OutputFormat) -> String {
    match output {
        OutputFormat::Json => render_json(format::to_json(&report)),
        OutputFormat::Markdown => format::format_report_markdown(&report),
    }
}
