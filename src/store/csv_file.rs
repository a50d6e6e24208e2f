//! The CSV-backed record store.

use crate::error::{ErrorType, IntoResult};
use crate::model::{CsvRecord, Expense, Row, Selector};
use crate::store::{RecordStore, Removal, Update};
use crate::{utils, Result};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The header row every ledger file starts with.
pub(crate) const HEADER: [&str; 4] = ["Date", "Category", "Amount", "Description"];

/// A ledger kept in a comma-delimited file with a `Date,Category,Amount,Description` header.
///
/// Records have no identifiers; `remove` and `update` locate a record by the value of all four
/// fields, so a `Selector::Id` never matches anything here.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    /// Creates the file with only the header row, unless it already exists.
    pub async fn init(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::load(path);
        if !store.path.exists() {
            debug!("Creating ledger file {}", store.path.display());
            utils::write(&store.path, serialize(Vec::<&Expense>::new())?).await?;
        }
        Ok(store)
    }

    /// Points at `path` without touching the file system. A missing file reads as an empty
    /// ledger and is created on the first `append`.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What has to precede the next record: the header for a missing or empty file, a line break
    /// when the last line is unterminated.
    async fn lead(&self) -> Result<Lead> {
        Ok(match utils::last_byte(&self.path).await? {
            None => Lead::Header,
            Some(b'\n') => Lead::Nothing,
            Some(_) => Lead::LineBreak,
        })
    }

    async fn rewrite(&self, rows: &[Row<Expense>]) -> Result<()> {
        utils::write_replace(&self.path, serialize(rows.iter().map(Row::data))?).await
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Lead {
    Header,
    LineBreak,
    Nothing,
}

#[async_trait]
impl RecordStore for CsvStore {
    async fn append(&self, expense: &Expense) -> Result<Row<Expense>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        let lead = self.lead().await.pub_result(ErrorType::Persistence)?;
        if lead == Lead::Header {
            writer.write_record(HEADER)?;
        }
        writer.serialize(CsvRecord::from(expense))?;
        let mut bytes = finish(writer)?;
        if lead == Lead::LineBreak {
            bytes.insert(0, b'\n');
        }
        utils::append(&self.path, bytes)
            .await
            .pub_result(ErrorType::Persistence)?;
        debug!("Appended {expense:?} to {}", self.path.display());
        Ok(Row::new(None, expense.clone()))
    }

    async fn all(&self) -> Result<Vec<Row<Expense>>> {
        let content = match utils::read_if_exists(&self.path)
            .await
            .pub_result(ErrorType::Persistence)?
        {
            Some(content) => content,
            None => {
                warn!("No ledger file at {}, treating it as empty", self.path.display());
                return Ok(Vec::new());
            }
        };
        parse(&content)
            .with_context(|| format!("Unable to read the ledger at {}", self.path.display()))
    }

    async fn remove(&self, selector: &Selector) -> Result<Removal> {
        let mut rows = self.all().await?;
        let Some(ix) = rows.iter().position(|row| selector.matches(row)) else {
            return Ok(Removal::NotFound);
        };
        let removed = rows.remove(ix);
        self.rewrite(&rows)
            .await
            .pub_result(ErrorType::Persistence)?;
        debug!("Removed record {} from {}", ix + 1, self.path.display());
        Ok(Removal::Removed(removed))
    }

    async fn update(&self, selector: &Selector, expense: &Expense) -> Result<Update> {
        let mut rows = self.all().await?;
        let Some(ix) = rows.iter().position(|row| selector.matches(row)) else {
            return Ok(Update::NotFound);
        };
        let after = Row::new(None, expense.clone());
        let before = std::mem::replace(&mut rows[ix], after.clone());
        self.rewrite(&rows)
            .await
            .pub_result(ErrorType::Persistence)?;
        debug!("Updated record {} in {}", ix + 1, self.path.display());
        Ok(Update::Updated { before, after })
    }
}

/// Parses ledger file content. Line numbers in errors count the header as line 1.
fn parse(content: &str) -> Result<Vec<Row<Expense>>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut rows = Vec::new();
    for (ix, result) in reader.deserialize::<CsvRecord>().enumerate() {
        let line = ix + 2;
        let record = result
            .with_context(|| format!("Malformed record on line {line}"))
            .pub_result(ErrorType::Validation)?;
        let expense = Expense::try_from(record)
            .with_context(|| format!("Invalid record on line {line}"))
            .pub_result(ErrorType::Validation)?;
        rows.push(Row::new(None, expense));
    }
    Ok(rows)
}

/// Serializes a header row followed by `expenses`.
pub(crate) fn serialize<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for expense in expenses {
        writer.serialize(CsvRecord::from(expense))?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to finish writing CSV data: {}", e.error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> CsvStore {
        CsvStore::load(dir.path().join("expenses.csv"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        contract::empty_store_is_empty(&store(&dir)).await;
    }

    #[tokio::test]
    async fn test_header_only_is_empty() {
        let dir = TempDir::new().unwrap();
        let s = CsvStore::init(dir.path().join("expenses.csv")).await.unwrap();
        let content = utils::read(s.path()).await.unwrap();
        assert_eq!(content, "Date,Category,Amount,Description\n");
        contract::empty_store_is_empty(&s).await;
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        contract::round_trip(&store(&dir)).await;
    }

    #[tokio::test]
    async fn test_keeps_order() {
        let dir = TempDir::new().unwrap();
        contract::keeps_order(&store(&dir)).await;
    }

    #[tokio::test]
    async fn test_remove_exact() {
        let dir = TempDir::new().unwrap();
        contract::remove_exact(&store(&dir)).await;
    }

    #[tokio::test]
    async fn test_remove_first_duplicate_only() {
        let dir = TempDir::new().unwrap();
        contract::remove_first_duplicate_only(&store(&dir)).await;
    }

    #[tokio::test]
    async fn test_update_in_place() {
        let dir = TempDir::new().unwrap();
        contract::update_in_place(&store(&dir)).await;
    }

    #[tokio::test]
    async fn test_search_ignores_case() {
        let dir = TempDir::new().unwrap();
        contract::search_ignores_case(&store(&dir)).await;
    }

    #[tokio::test]
    async fn test_file_format() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.append(&contract::expense("2025-10-14", "food", "250.0", "Lunch with friends"))
            .await
            .unwrap();
        let content = utils::read(s.path()).await.unwrap();
        assert_eq!(
            content,
            "Date,Category,Amount,Description\n2025-10-14,Food,250.0,Lunch with friends\n"
        );
    }

    #[tokio::test]
    async fn test_description_with_comma_is_quoted() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        let e = contract::expense("2025-10-14", "Food", "12", "Tea, biscuits");
        s.append(&e).await.unwrap();
        let content = utils::read(s.path()).await.unwrap();
        assert!(content.contains("\"Tea, biscuits\""));
        assert_eq!(s.expenses().await.unwrap(), vec![e]);
    }

    #[tokio::test]
    async fn test_reads_hand_written_file() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        utils::write(
            s.path(),
            "Date,Category,Amount,Description\n2025-10-14,Food,250.0,Lunch\n2025-10-13,travel,120.5,\n",
        )
        .await
        .unwrap();
        let all = s.expenses().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].category().name(), "Travel");
        assert_eq!(all[1].description(), "");
    }

    #[tokio::test]
    async fn test_append_after_unterminated_line() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        utils::write(s.path(), "Date,Category,Amount,Description\n2025-10-14,Food,250.0,Lunch")
            .await
            .unwrap();
        s.append(&contract::expense("2025-10-13", "Travel", "120.5", "Cab"))
            .await
            .unwrap();
        let content = utils::read(s.path()).await.unwrap();
        assert_eq!(
            content,
            "Date,Category,Amount,Description\n2025-10-14,Food,250.0,Lunch\n2025-10-13,Travel,120.5,Cab\n"
        );
        let all = s.expenses().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].description(), "Cab");
    }

    #[tokio::test]
    async fn test_widest_amounts_round_trip() {
        let dir = TempDir::new().unwrap();
        contract::widest_amounts_round_trip(&store(&dir)).await;
    }

    #[tokio::test]
    async fn test_malformed_amount_names_the_line() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        utils::write(
            s.path(),
            "Date,Category,Amount,Description\n2025-10-14,Food,250.0,Lunch\n2025-10-13,Travel,lots,Cab\n",
        )
        .await
        .unwrap();
        let err = s.all().await.unwrap_err();
        assert!(format!("{err:#}").contains("line 3"));
        assert_eq!(
            crate::error::error_type_of(&err),
            Some(ErrorType::Validation)
        );
    }

    #[tokio::test]
    async fn test_id_selector_never_matches() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        s.append(&contract::expense("2025-10-14", "Food", "1", ""))
            .await
            .unwrap();
        assert_eq!(s.remove(&Selector::Id(1)).await.unwrap(), Removal::NotFound);
        assert_eq!(s.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_position() {
        let dir = TempDir::new().unwrap();
        let s = store(&dir);
        for e in contract::scenario_b() {
            s.append(&e).await.unwrap();
        }
        let middle = contract::scenario_b().remove(1);
        let new = contract::expense("2025-10-13", "Travel", "99", "Bus");
        s.update(&Selector::Exact(middle), &new).await.unwrap();
        let all = s.expenses().await.unwrap();
        assert_eq!(all[1], new);
    }
}
