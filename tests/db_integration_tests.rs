//! Integration tests for the database layer.
//!
//! These run against an in-memory SQLite database with the embedded
//! migrations applied.

use chrono::{TimeZone, Utc};
use taskscope::db::Database;
use taskscope::error::{ErrorCode, TaskError};
use taskscope::query::{FilterPlan, PageRequest};
use taskscope::store::TaskStore;
use taskscope::types::{NewTask, Scope, Status, Visibility};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn code_of(err: anyhow::Error) -> ErrorCode {
    TaskError::from(err).code
}

mod company_tests {
    use super::*;

    #[test]
    fn company_under_unknown_account_is_rejected() {
        let db = setup_db();
        let err = db.create_company("Acme", Some(42)).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::RecordNotFound);
    }

    #[test]
    fn account_companies_are_listed_in_creation_order() {
        let db = setup_db();
        let account = db.create_account("Holding").unwrap();
        let first = db.create_company("First", Some(account.id)).unwrap();
        let second = db.create_company("Second", Some(account.id)).unwrap();
        db.create_company("Elsewhere", None).unwrap();

        let ids: Vec<_> = db
            .list_account_companies(account.id)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}

mod task_tests {
    use super::*;

    #[test]
    fn create_task_fills_defaults() {
        let db = setup_db();
        let company = db.create_company("Acme", None).unwrap();

        let task = db
            .create_task(NewTask::new("  Write invoice ", company.id).with_rate(7.5))
            .unwrap();

        assert_eq!(task.name, "Write invoice");
        assert_eq!(task.rate, Some(7.5));
        assert_eq!(task.company_id, company.id);
        assert!(task.project_id.is_none());
        assert!(!task.archived);
        assert!(!task.deleted);
        assert!(task.created_at > 0);
    }

    #[test]
    fn create_task_requires_known_company_and_name() {
        let db = setup_db();
        let err = db.create_task(NewTask::new("orphan", 9)).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::RecordNotFound);

        let company = db.create_company("Acme", None).unwrap();
        let err = db.create_task(NewTask::new("   ", company.id)).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::InvalidFieldValue);
    }

    #[test]
    fn account_scope_spans_all_owned_companies() {
        let db = setup_db();
        let account = db.create_account("Holding").unwrap();
        let a = db.create_company("A", Some(account.id)).unwrap();
        let b = db.create_company("B", Some(account.id)).unwrap();
        let other = db.create_company("Other", None).unwrap();

        let t1 = db.create_task(NewTask::new("one", a.id)).unwrap();
        let t2 = db.create_task(NewTask::new("two", b.id)).unwrap();
        db.create_task(NewTask::new("three", other.id)).unwrap();

        let ids: Vec<_> = db
            .list_scope_tasks(Scope::Account(account.id))
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![t1.id, t2.id]);
    }

    #[test]
    fn archive_keeps_first_timestamp_and_unarchive_clears_it() {
        let db = setup_db();
        let company = db.create_company("Acme", None).unwrap();
        let task = db.create_task(NewTask::new("report", company.id)).unwrap();

        db.set_task_archived(task.id, true).unwrap();
        let first = db.get_task(task.id).unwrap().unwrap().archived_at;
        assert!(first.is_some());

        db.set_task_archived(task.id, true).unwrap();
        assert_eq!(db.get_task(task.id).unwrap().unwrap().archived_at, first);

        db.set_task_archived(task.id, false).unwrap();
        let task = db.get_task(task.id).unwrap().unwrap();
        assert!(!task.archived);
        assert!(task.archived_at.is_none());
    }

    #[test]
    fn soft_delete_and_restore_round_trip() {
        let db = setup_db();
        let company = db.create_company("Acme", None).unwrap();
        let task = db.create_task(NewTask::new("report", company.id)).unwrap();

        db.soft_delete_task(task.id).unwrap();
        let deleted = db.get_task(task.id).unwrap().unwrap();
        assert!(deleted.deleted);
        assert!(deleted.deleted_at.is_some());
        assert!(db
            .get_tasks_by_ids(&[task.id], Visibility::Visible)
            .unwrap()
            .is_empty());
        assert_eq!(
            db.get_tasks_by_ids(&[task.id], Visibility::Deleted).unwrap().len(),
            1
        );

        db.restore_task(task.id).unwrap();
        let restored = db.get_task(task.id).unwrap().unwrap();
        assert!(!restored.deleted);
        assert!(restored.deleted_at.is_none());
    }

    #[test]
    fn save_through_the_store_writes_back_attributes() {
        let db = setup_db();
        let company = db.create_company("Acme", None).unwrap();
        let mut task = db.create_task(NewTask::new("draft", company.id)).unwrap();

        task.name = "final".to_string();
        task.rate = Some(12.0);
        task.project_id = Some(4);
        TaskStore::save(&db, &task).unwrap();

        let stored = db.get_task(task.id).unwrap().unwrap();
        assert_eq!(stored.name, "final");
        assert_eq!(stored.rate, Some(12.0));
        assert_eq!(stored.project_id, Some(4));

        task.id = 404;
        let err = TaskStore::save(&db, &task).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::RecordNotFound);
    }

    #[test]
    fn updating_a_missing_task_is_not_found() {
        let db = setup_db();
        let err = db.set_task_archived(404, true).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::RecordNotFound);
        let err = db.purge_task(404).unwrap_err();
        assert_eq!(code_of(err), ErrorCode::RecordNotFound);
    }

    #[test]
    fn name_exists_ignores_deleted_tasks() {
        let db = setup_db();
        let a = db.create_company("A", None).unwrap();
        let b = db.create_company("B", None).unwrap();
        let task = db.create_task(NewTask::new("audit", a.id)).unwrap();

        assert!(db.task_name_exists("audit", None).unwrap());
        assert!(db.task_name_exists("audit", Some(a.id)).unwrap());
        assert!(!db.task_name_exists("audit", Some(b.id)).unwrap());

        db.soft_delete_task(task.id).unwrap();
        assert!(!db.task_name_exists("audit", None).unwrap());
    }
}

mod filter_tests {
    use super::*;

    #[test]
    fn filter_tasks_pages_in_sql() {
        let db = setup_db();
        let company = db.create_company("Acme", None).unwrap();
        for i in 0..12 {
            db.create_task(NewTask::new(format!("task {}", i), company.id))
                .unwrap();
        }

        let page = db
            .filter_tasks(
                Scope::Company(company.id),
                &FilterPlan::default(),
                PageRequest { page: 2, per_page: 5 },
            )
            .unwrap();

        assert_eq!(page.total_count, 12);
        assert_eq!(page.total_pages, 3);
        let names: Vec<_> = page.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["task 5", "task 6", "task 7", "task 8", "task 9"]);
    }

    #[test]
    fn filter_tasks_far_past_the_end_is_empty() {
        let db = setup_db();
        let company = db.create_company("Acme", None).unwrap();
        for i in 0..3 {
            db.create_task(NewTask::new(format!("task {}", i), company.id))
                .unwrap();
        }

        // offset = page * per_page overflows i64
        let page = db
            .filter_tasks(
                Scope::Company(company.id),
                &FilterPlan::default(),
                PageRequest {
                    page: 1_000_000_000_000_000_000,
                    per_page: 10,
                },
            )
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn filter_tasks_applies_status_and_date_window() {
        let db = setup_db();
        let company = db.create_company("Acme", None).unwrap();
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        let in_window = db
            .create_task(NewTask::new("january", company.id).with_created_at(jan))
            .unwrap();
        let archived = db
            .create_task(NewTask::new("archived", company.id).with_created_at(jan))
            .unwrap();
        db.create_task(NewTask::new("february", company.id).with_created_at(feb))
            .unwrap();
        db.set_task_archived(archived.id, true).unwrap();

        let plan = FilterPlan {
            created: Some((
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp_millis(),
                feb.timestamp_millis(),
            )),
            ..FilterPlan::status(Status::Active)
        };
        let page = db
            .filter_tasks(Scope::Company(company.id), &plan, PageRequest::default())
            .unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].id, in_window.id);
    }
}

mod log_tests {
    use super::*;

    #[test]
    fn logs_cannot_attach_to_deleted_tasks() {
        let db = setup_db();
        let company = db.create_company("Acme", None).unwrap();
        let task = db.create_task(NewTask::new("report", company.id)).unwrap();

        db.add_task_log(task.id, "started").unwrap();
        assert_eq!(db.list_task_logs(task.id).unwrap().len(), 1);

        db.soft_delete_task(task.id).unwrap();
        assert!(db.list_task_logs(task.id).unwrap().is_empty());
        assert!(db.add_task_log(task.id, "too late").is_err());
    }
}

mod search_tests {
    use super::*;

    #[test]
    fn search_matches_word_prefixes_within_scope() {
        let db = setup_db();
        let a = db.create_company("A", None).unwrap();
        let b = db.create_company("B", None).unwrap();
        let hit = db.create_task(NewTask::new("Quarterly invoice", a.id)).unwrap();
        db.create_task(NewTask::new("Annual review", a.id)).unwrap();
        db.create_task(NewTask::new("Quarterly invoice", b.id)).unwrap();

        let found = db.search_tasks("quart inv", Scope::Company(a.id)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, hit.id);
    }

    #[test]
    fn renamed_tasks_are_reindexed() {
        let db = setup_db();
        let company = db.create_company("Acme", None).unwrap();
        let mut task = db.create_task(NewTask::new("draft", company.id)).unwrap();

        task.name = "final copy".to_string();
        db.update_task(&task).unwrap();

        let scope = Scope::Company(company.id);
        assert!(db.search_tasks("draft", scope).unwrap().is_empty());
        assert_eq!(db.search_tasks("final", scope).unwrap().len(), 1);
    }
}
