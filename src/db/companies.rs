//! Accounts and the companies they own.

use super::{Database, now_ms};
use crate::error::TaskError;
use crate::types::{Account, AccountId, Company, CompanyId};
use anyhow::Result;
use rusqlite::{Row, params};
use tracing::info;

fn parse_company_row(row: &Row) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get("id")?,
        name: row.get("name")?,
        account_id: row.get("account_id")?,
        created_at: row.get("created_at")?,
    })
}

impl Database {
    pub fn create_account(&self, name: &str) -> Result<Account> {
        self.with_conn(|conn| {
            let now = now_ms();
            conn.execute(
                "INSERT INTO accounts (name, created_at) VALUES (?1, ?2)",
                params![name, now],
            )?;
            let id = conn.last_insert_rowid();
            info!(account_id = id, "account created");
            Ok(Account {
                id,
                name: name.to_string(),
                created_at: now,
            })
        })
    }

    /// Create a company, optionally owned by an account.
    pub fn create_company(&self, name: &str, account_id: Option<AccountId>) -> Result<Company> {
        self.with_conn(|conn| {
            if let Some(account_id) = account_id {
                let known: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1)",
                    params![account_id],
                    |row| row.get(0),
                )?;
                if !known {
                    return Err(TaskError::record_not_found("Account", account_id).into());
                }
            }

            let now = now_ms();
            conn.execute(
                "INSERT INTO companies (name, account_id, created_at) VALUES (?1, ?2, ?3)",
                params![name, account_id, now],
            )?;
            let id = conn.last_insert_rowid();
            info!(company_id = id, ?account_id, "company created");
            Ok(Company {
                id,
                name: name.to_string(),
                account_id,
                created_at: now,
            })
        })
    }

    pub fn get_company(&self, company_id: CompanyId) -> Result<Option<Company>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM companies WHERE id = ?1")?;
            match stmt.query_row(params![company_id], parse_company_row) {
                Ok(company) => Ok(Some(company)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Companies owned by the account, oldest first.
    pub fn list_account_companies(&self, account_id: AccountId) -> Result<Vec<Company>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM companies WHERE account_id = ?1 ORDER BY id")?;
            let companies = stmt
                .query_map(params![account_id], parse_company_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(companies)
        })
    }
}
