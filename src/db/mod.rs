//! This module is responsible for reading, writing and managing the SQLite database.

mod migrations;

use crate::error::{ErrorType, IntoResult};
use crate::model::{Expense, Row, Selector, DATE_FORMAT};
use crate::store::{RecordStore, Removal, Update};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use tracing::debug;

/// Columns of `fin_expenses` in the order `ExpenseRow` expects them. The amount is read back as
/// text so that it is parsed into an exact decimal.
const SELECT_COLUMNS: &str =
    "SELECT id, date, category, CAST(amount AS TEXT), description FROM fin_expenses";

type ExpenseRow = (i64, String, String, String, String);

/// A ledger kept in the `fin_expenses` table of a SQLite database.
#[derive(Debug, Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub async fn init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at {}", path.display());
        }
        Self::connect(path, true).await
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Creates a connection pool
    /// - Updates the database schema with migrations if it is out-of-date
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(anyhow!("No database found at {}", path.display()))
                .pub_result(ErrorType::NotFound);
        }
        Self::connect(path, false).await
    }

    async fn connect(path: &Path, create: bool) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(create);

        // A single connection: operations run one at a time anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open the database at {}", path.display()))
            .pub_result(ErrorType::Connection)?;

        migrations::migrate(&pool)
            .await
            .context("Unable to bring the database schema up to date")?;
        debug!("Opened database {}", path.display());
        Ok(Self { pool })
    }

    /// Returns the number of rows in the `fin_expenses` table.
    pub async fn count(&self) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM fin_expenses")
            .fetch_one(&self.pool)
            .await
            .context("Unable to count expenses")?;
        Ok(row.0.max(0) as u64)
    }

    /// Finds the row a selector refers to within an open transaction.
    async fn select(
        tx: &mut Transaction<'_, Sqlite>,
        selector: &Selector,
    ) -> Result<Option<Row<Expense>>> {
        let row: Option<ExpenseRow> = match selector {
            Selector::Id(id) => {
                sqlx::query_as::<_, ExpenseRow>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
                    .bind(*id)
                    .fetch_optional(&mut **tx)
                    .await
            }
            Selector::Exact(expense) => {
                sqlx::query_as::<_, ExpenseRow>(&format!(
                    "{SELECT_COLUMNS} WHERE date = ? AND category = ? AND amount = ? \
                    AND description = ? ORDER BY id LIMIT 1"
                ))
                .bind(expense.date().format(DATE_FORMAT).to_string())
                .bind(expense.category().name())
                .bind(expense.amount().to_string())
                .bind(expense.description())
                .fetch_optional(&mut **tx)
                .await
            }
        }
        .context("Unable to look up the expense")?;
        row.map(to_row).transpose()
    }
}

#[async_trait]
impl RecordStore for Db {
    async fn append(&self, expense: &Expense) -> Result<Row<Expense>> {
        let result = sqlx::query(
            "INSERT INTO fin_expenses (date, category, amount, description) VALUES (?, ?, ?, ?)",
        )
        .bind(expense.date().format(DATE_FORMAT).to_string())
        .bind(expense.category().name())
        .bind(expense.amount().to_string())
        .bind(expense.description())
        .execute(&self.pool)
        .await
        .map_err(constraint_error)?;
        let id = result.last_insert_rowid();
        debug!("Inserted expense {id}");
        Ok(Row::new(Some(id), expense.clone()))
    }

    async fn all(&self) -> Result<Vec<Row<Expense>>> {
        let rows: Vec<ExpenseRow> =
            sqlx::query_as::<_, ExpenseRow>(&format!("{SELECT_COLUMNS} ORDER BY id"))
                .fetch_all(&self.pool)
                .await
                .context("Unable to read expenses")
                .pub_result(ErrorType::Persistence)?;
        rows.into_iter().map(to_row).collect()
    }

    async fn remove(&self, selector: &Selector) -> Result<Removal> {
        let mut tx = self.pool.begin().await.context("Unable to begin transaction")?;
        let Some(row) = Self::select(&mut tx, selector).await? else {
            return Ok(Removal::NotFound);
        };
        sqlx::query("DELETE FROM fin_expenses WHERE id = ?")
            .bind(row.id())
            .execute(&mut *tx)
            .await
            .context("Unable to delete the expense")
            .pub_result(ErrorType::Persistence)?;
        tx.commit()
            .await
            .context("Unable to commit the deletion")
            .pub_result(ErrorType::Persistence)?;
        debug!("Deleted expense {:?}", row.id());
        Ok(Removal::Removed(row))
    }

    async fn update(&self, selector: &Selector, expense: &Expense) -> Result<Update> {
        let mut tx = self.pool.begin().await.context("Unable to begin transaction")?;
        let Some(before) = Self::select(&mut tx, selector).await? else {
            return Ok(Update::NotFound);
        };
        sqlx::query(
            "UPDATE fin_expenses SET date = ?, category = ?, amount = ?, description = ? \
            WHERE id = ?",
        )
        .bind(expense.date().format(DATE_FORMAT).to_string())
        .bind(expense.category().name())
        .bind(expense.amount().to_string())
        .bind(expense.description())
        .bind(before.id())
        .execute(&mut *tx)
        .await
        .map_err(constraint_error)?;
        tx.commit()
            .await
            .context("Unable to commit the update")
            .pub_result(ErrorType::Persistence)?;
        debug!("Updated expense {:?}", before.id());
        let after = Row::new(before.id(), expense.clone());
        Ok(Update::Updated { before, after })
    }
}

fn to_row((id, date, category, amount, description): ExpenseRow) -> Result<Row<Expense>> {
    let expense = Expense::parse(&date, &category, &amount, &description)
        .with_context(|| format!("Expense {id} holds invalid data"))
        .pub_result(ErrorType::Validation)?;
    Ok(Row::new(Some(id), expense))
}

/// Turns a failed write into a validation error when the schema's CHECK constraints rejected
/// it, and into a persistence error otherwise.
fn constraint_error(e: sqlx::Error) -> anyhow::Error {
    let message = e.to_string();
    if message.contains("CHECK constraint failed") {
        anyhow!("The expense was rejected by the database: {message}")
            .context(ErrorType::Validation)
    } else {
        anyhow::Error::from(e)
            .context("Unable to write the expense")
            .context(ErrorType::Persistence)
    }
}
