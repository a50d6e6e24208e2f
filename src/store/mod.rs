//! The record store: persistence of the ledger as an ordered sequence of expenses.
//!
//! Two interchangeable backends implement `RecordStore`:
//! - `CsvStore`, a flat `Date,Category,Amount,Description` file. Every mutation reads, scans and
//!   rewrites the whole file, so `remove` and `update` are O(n) in the number of records.
//! - `Db`, a SQLite table `fin_expenses` with an auto-increment primary key. Lookups by id are
//!   indexed; lookups by value scan the table.

mod csv_file;

pub(crate) use csv_file::serialize as serialize_csv;
pub use csv_file::CsvStore;
pub use crate::db::Db;

use crate::model::{Expense, Row, Selector};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

/// Which kind of store backs the ledger.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// A CSV file with a header row.
    #[default]
    Csv,
    /// A SQLite database.
    Sqlite,
}

serde_plain::derive_display_from_serialize!(Backend);
serde_plain::derive_fromstr_from_deserialize!(Backend);

impl Backend {
    /// The name of the backing file inside the ledger home directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Backend::Csv => "expenses.csv",
            Backend::Sqlite => "ledger.sqlite",
        }
    }
}

/// The outcome of `RecordStore::remove`. Not finding a record is an expected outcome, not an
/// error.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "record")]
pub enum Removal {
    Removed(Row<Expense>),
    NotFound,
}

/// The outcome of `RecordStore::update`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Update {
    Updated {
        before: Row<Expense>,
        after: Row<Expense>,
    },
    NotFound,
}

/// Persistence of expense records.
///
/// Every method acquires the backing file or connection, does its work and releases it. Nothing
/// coordinates concurrent writers.
#[async_trait]
pub trait RecordStore: Debug + Send + Sync {
    /// Writes one record at the end of the ledger.
    async fn append(&self, expense: &Expense) -> Result<Row<Expense>>;

    /// Returns every stored record in storage order. A store that was never written to yields an
    /// empty vector.
    async fn all(&self) -> Result<Vec<Row<Expense>>>;

    /// Deletes the first record matched by `selector`.
    async fn remove(&self, selector: &Selector) -> Result<Removal>;

    /// Replaces the first record matched by `selector` with `expense` in a single step. The record
    /// keeps its position and, where there is one, its id.
    async fn update(&self, selector: &Selector, expense: &Expense) -> Result<Update>;

    /// Returns the records whose category contains `fragment`, ignoring case.
    async fn search(&self, fragment: &str) -> Result<Vec<Row<Expense>>> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .filter(|row| row.data().category().contains(fragment))
            .collect())
    }

    /// Returns every stored expense without ids.
    async fn expenses(&self) -> Result<Vec<Expense>> {
        Ok(self.all().await?.into_iter().map(Row::into_data).collect())
    }
}

/// Creates a new, empty store of the given kind at `path`.
pub async fn create(backend: Backend, path: &Path) -> Result<Arc<dyn RecordStore>> {
    Ok(match backend {
        Backend::Csv => Arc::new(CsvStore::init(path).await?),
        Backend::Sqlite => Arc::new(Db::init(path).await?),
    })
}

/// Opens an existing store of the given kind at `path`.
pub async fn open(backend: Backend, path: &Path) -> Result<Arc<dyn RecordStore>> {
    Ok(match backend {
        Backend::Csv => Arc::new(CsvStore::load(path)),
        Backend::Sqlite => Arc::new(Db::load(path).await?),
    })
}
